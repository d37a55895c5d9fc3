//! Error types for the authentication contract
use thiserror::Error;

use crate::Error;

/// Errors reported by an [`super::AuthService`] implementation.
///
/// The variants mirror what the user can actually be told: bad credentials,
/// an unconfirmed address, a duplicate registration, or a service problem.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum AuthError {
    /// The email/password pair did not match an account.
    #[error("Invalid login credentials")]
    InvalidCredentials,

    /// The account exists but its email address was never confirmed.
    #[error("Email not confirmed: {email}")]
    EmailUnconfirmed { email: String },

    /// Registration was attempted for an email that already has an account.
    #[error("Already registered: {email}")]
    AlreadyRegistered { email: String },

    /// The auth service could not be reached.
    #[error("Auth service unreachable: {reason}")]
    Network { reason: String },

    /// Anything the service reported that does not fit the taxonomy.
    #[error("Auth service error: {reason}")]
    Unknown { reason: String },
}

impl AuthError {
    /// Check if this error means the submitted credentials were rejected.
    pub fn is_invalid_credentials(&self) -> bool {
        matches!(self, AuthError::InvalidCredentials)
    }

    /// Check if this error indicates a transport/service failure rather than
    /// a decision about the credentials.
    pub fn is_network(&self) -> bool {
        matches!(self, AuthError::Network { .. })
    }
}

impl From<AuthError> for Error {
    fn from(err: AuthError) -> Self {
        Error::Auth(err)
    }
}
