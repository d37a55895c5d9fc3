//! Error types for the profile directory contract
use thiserror::Error;

use crate::{Error, identity::UserId};

/// Errors reported by a [`super::ProfileDirectory`] implementation.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// No profile exists for the requested account.
    #[error("Profile not found: {user_id}")]
    ProfileNotFound { user_id: UserId },

    /// The directory could not be reached or answered with a service error.
    #[error("Profile directory unavailable: {reason}")]
    Unavailable { reason: String },
}

impl DirectoryError {
    /// Check if this error indicates a resource was not found.
    pub fn is_not_found(&self) -> bool {
        matches!(self, DirectoryError::ProfileNotFound { .. })
    }

    /// Check if this error indicates the directory service failed.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, DirectoryError::Unavailable { .. })
    }
}

impl From<DirectoryError> for Error {
    fn from(err: DirectoryError) -> Self {
        Error::Directory(err)
    }
}
