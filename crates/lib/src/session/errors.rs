//! Error types for the session controller
use thiserror::Error;

use crate::Error;

/// Errors raised by [`super::SessionController`] operations themselves
/// (collaborator failures keep their own taxonomies).
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum SessionError {
    /// The operation requires an authenticated session.
    #[error("Operation requires an authenticated session")]
    NotAuthenticated,

    /// A mutating action was attempted without edit permission on the
    /// displayed library. Reaching this defensively (past the hidden UI
    /// controls) is a logic error in the embedder.
    #[error("No edit permission for the displayed library")]
    PermissionDenied,

    /// Login or registration was submitted with an empty field.
    #[error("Email and password must not be empty")]
    MissingCredentials,

    /// A login or registration is already in flight; the duplicate
    /// submission was ignored.
    #[error("A sign-in attempt is already in progress")]
    LoginInFlight,
}

impl SessionError {
    /// Check if this error indicates permission was denied.
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, SessionError::PermissionDenied)
    }
}

impl From<SessionError> for Error {
    fn from(err: SessionError) -> Self {
        Error::Session(err)
    }
}
