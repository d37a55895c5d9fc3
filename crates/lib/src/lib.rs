//!
//! Dramatis: the headless core of a shared character-book client.
//! This library owns the session and library-ownership state machine and
//! exposes it to an external renderer through an event subscription.
//!
//! ## Core Concepts
//!
//! Dramatis is built around several key concepts:
//!
//! * **Session (`session::Session`)**: Proof of the current user's authenticated identity, held only while the auth service vouches for it.
//! * **ViewTarget (`session::ViewTarget`)**: The identity whose character collection is currently displayed, independent of who is logged in.
//! * **Permission (`session::Permission`)**: The derived edit flag (`can_edit`), recomputed from Session and ViewTarget on every change and re-checked before every mutating store call.
//! * **Controller (`session::SessionController`)**: Single source of truth for the above. Collaborators are injected at construction; state changes reach the renderer through [`UiEvent`]s.
//! * **Contracts (`auth::AuthService`, `directory::ProfileDirectory`, `store::CharacterStore`)**: The external services the controller consumes, as async traits.
//! * **Backends (`backend`)**: First-party implementations of the contracts: an in-process store with JSON persistence, and a client for a Supabase-style hosted backend (feature `remote`).

pub mod auth;
pub mod backend;
pub mod directory;
pub mod identity;
pub mod session;
pub mod store;

// Re-export the main types for easier access.
pub use identity::{CharacterId, UserId};
pub use session::{
    ControllerOptions, NoticeKind, Permission, Session, SessionController, StateSnapshot, UiEvent,
    ViewTarget,
};
pub use store::{Character, CharacterDraft};

/// Result type used throughout the Dramatis library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the Dramatis library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Structured authentication errors from the auth module
    #[error(transparent)]
    Auth(auth::AuthError),

    /// Structured profile-directory errors from the directory module
    #[error(transparent)]
    Directory(directory::DirectoryError),

    /// Structured character-store errors from the store module
    #[error(transparent)]
    Store(store::StoreError),

    /// Structured controller errors from the session module
    #[error(transparent)]
    Session(session::SessionError),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Auth(_) => "auth",
            Error::Directory(_) => "directory",
            Error::Store(_) => "store",
            Error::Session(_) => "session",
            Error::Io(_) => "io",
            Error::Serialize(_) => "serialize",
        }
    }

    /// Check if this error indicates a resource was not found.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::Directory(dir_err) => dir_err.is_not_found(),
            Error::Store(store_err) => store_err.is_not_found(),
            _ => false,
        }
    }

    /// Check if this error indicates permission was denied.
    pub fn is_permission_denied(&self) -> bool {
        match self {
            Error::Session(session_err) => session_err.is_permission_denied(),
            _ => false,
        }
    }

    /// Check if this error is authentication-related.
    pub fn is_authentication_error(&self) -> bool {
        matches!(self, Error::Auth(_))
    }

    /// Check if this error was caused by an unreachable or failing service.
    pub fn is_network_error(&self) -> bool {
        match self {
            Error::Auth(auth_err) => auth_err.is_network(),
            Error::Directory(dir_err) => dir_err.is_unavailable(),
            Error::Store(store_err) => store_err.is_unavailable(),
            _ => false,
        }
    }
}
