//! Error types for the character store contract
use thiserror::Error;

use crate::{Error, identity::CharacterId};

/// Errors reported by a [`super::CharacterStore`] implementation.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum StoreError {
    /// No record matched the id/owner pair.
    #[error("Character not found: {id}")]
    CharacterNotFound { id: CharacterId },

    /// The store could not be reached or answered with a service error.
    #[error("Character store unavailable: {reason}")]
    Unavailable { reason: String },
}

impl StoreError {
    /// Check if this error indicates a resource was not found.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::CharacterNotFound { .. })
    }

    /// Check if this error indicates the store service failed.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, StoreError::Unavailable { .. })
    }
}

impl From<StoreError> for Error {
    fn from(err: StoreError) -> Self {
        Error::Store(err)
    }
}
