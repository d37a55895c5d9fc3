//! Character store contract
//!
//! The store is the keyed character-collection service: reads are scoped to
//! an owner id, and every write carries the owner id again so the backend
//! can double-scope the mutation. Collections are finite lists reloaded on
//! every view change, not live subscriptions.

use async_trait::async_trait;

use crate::identity::{CharacterId, UserId};

pub mod character;
pub mod errors;

pub use character::{Character, CharacterDraft, Relation, RelationKind};
pub use errors::StoreError;

/// Contract for the external character store.
#[async_trait]
pub trait CharacterStore: Send + Sync {
    /// Fetch the full character collection owned by `owner`.
    async fn list_characters(&self, owner: &UserId) -> Result<Vec<Character>, StoreError>;

    /// Create a new character owned by `owner`.
    ///
    /// The store assigns the record id and creation timestamp.
    async fn insert_character(
        &self,
        owner: &UserId,
        draft: CharacterDraft,
    ) -> Result<Character, StoreError>;

    /// Replace a character record. The write is scoped by both the record id
    /// and `owner`; a record owned by someone else is reported as not found.
    async fn update_character(
        &self,
        owner: &UserId,
        character: &Character,
    ) -> Result<(), StoreError>;

    /// Delete a character record, scoped by `owner` like
    /// [`update_character`](CharacterStore::update_character).
    async fn delete_character(&self, owner: &UserId, id: &CharacterId) -> Result<(), StoreError>;
}
