//! Profile directory contract
//!
//! A read-only projection of the user base, used to resolve display names
//! after authentication and to populate the public-library picker. The
//! directory is a single well-defined contract; a missing profile table is a
//! configuration error surfaced by the backend, never papered over.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::identity::UserId;

pub mod errors;

pub use errors::DirectoryError;

/// A user's public profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Account identifier this profile belongs to
    #[serde(rename = "id")]
    pub user_id: UserId,

    /// Public display name
    pub username: String,
}

/// Lightweight directory row for the public-library picker.
///
/// Has no lifecycle beyond the picker that displays it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    #[serde(rename = "id")]
    pub user_id: UserId,
    pub username: String,
}

/// Contract for the external profile directory.
#[async_trait]
pub trait ProfileDirectory: Send + Sync {
    /// Look up a single profile by account id.
    ///
    /// Returns `Ok(None)` when the account has no profile row.
    async fn lookup_profile(&self, user_id: &UserId) -> Result<Option<Profile>, DirectoryError>;

    /// List all public profiles.
    ///
    /// Produces a finite, non-restartable snapshot taken at call time.
    async fn list_profiles(&self) -> Result<Vec<DirectoryEntry>, DirectoryError>;
}
