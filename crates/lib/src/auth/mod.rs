//! Authentication contract for Dramatis
//!
//! The auth service is an external collaborator (a hosted auth backend, or
//! the in-process account store from [`crate::backend::memory`]). The
//! controller only consumes this trait; it never persists credentials or
//! tokens itself.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::identity::UserId;

pub mod errors;

pub use errors::AuthError;

/// Identity vouched for by the auth service after a successful credential
/// check or session restoration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    /// Stable account identifier
    pub user_id: UserId,

    /// Login email address
    pub email: String,
}

/// Sign-in credentials.
///
/// The password is wiped from memory when the value is dropped.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Credentials {
    #[zeroize(skip)]
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Payload for creating a new account.
///
/// Like [`Credentials`], the password is zeroized on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct NewAccount {
    #[zeroize(skip)]
    pub username: String,
    #[zeroize(skip)]
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for NewAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewAccount")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Contract for the external authentication service.
///
/// All methods are fallible with the [`AuthError`] taxonomy; callers decide
/// what is user-visible (the controller turns them into notices).
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Return the currently valid session, if the service holds one.
    ///
    /// Used once at startup for session restoration. A missing session is
    /// `Ok(None)`, not an error.
    async fn current_session(&self) -> Result<Option<AuthUser>, AuthError>;

    /// Check credentials and establish a session.
    async fn sign_in(&self, credentials: Credentials) -> Result<AuthUser, AuthError>;

    /// Create a new account and establish a session for it.
    async fn sign_up(&self, account: NewAccount) -> Result<AuthUser, AuthError>;

    /// Tear down the current session.
    async fn sign_out(&self) -> Result<(), AuthError>;
}
