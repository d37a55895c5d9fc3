//! Persistence operations for the in-memory backend
//!
//! Serializes the account and character state to a JSON file and back,
//! with a version field to catch incompatible files early.

use std::{collections::HashMap, path::Path, sync::RwLock};

use serde::{Deserialize, Deserializer, Serialize};

use super::{Account, InMemory, MemoryState};
use crate::{Result, identity::UserId, store::Character};

/// The current persistence file format version.
/// v0 indicates this is an unstable format subject to breaking changes.
const PERSISTENCE_VERSION: u8 = 0;

/// Helper to check if version is default (0) for serde skip_serializing_if
fn is_v0(v: &u8) -> bool {
    *v == 0
}

/// Validates the persistence version during deserialization.
fn validate_persistence_version<'de, D>(deserializer: D) -> std::result::Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let version = u8::deserialize(deserializer)?;
    if version != PERSISTENCE_VERSION {
        return Err(serde::de::Error::custom(format!(
            "unsupported persistence version {version}; only version {PERSISTENCE_VERSION} is supported"
        )));
    }
    Ok(version)
}

/// Serializable envelope around the backend state.
#[derive(Serialize, Deserialize)]
struct PersistedState {
    /// File format version for compatibility checking
    #[serde(
        rename = "_v",
        default,
        skip_serializing_if = "is_v0",
        deserialize_with = "validate_persistence_version"
    )]
    version: u8,
    accounts: HashMap<UserId, Account>,
    characters: HashMap<UserId, Vec<Character>>,
    #[serde(default)]
    active_user: Option<UserId>,
}

pub(super) fn save_to_file(backend: &InMemory, path: impl AsRef<Path>) -> Result<()> {
    let state = backend.state.read().unwrap().clone();
    let persisted = PersistedState {
        version: PERSISTENCE_VERSION,
        accounts: state.accounts,
        characters: state.characters,
        active_user: state.active_user,
    };
    let json = serde_json::to_string_pretty(&persisted)?;
    std::fs::write(path, json)?;
    Ok(())
}

pub(super) fn load_from_file(path: impl AsRef<Path>) -> Result<InMemory> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(InMemory::new());
    }
    let json = std::fs::read_to_string(path)?;
    let persisted: PersistedState = serde_json::from_str(&json)?;
    Ok(InMemory {
        state: RwLock::new(MemoryState {
            accounts: persisted.accounts,
            characters: persisted.characters,
            active_user: persisted.active_user,
        }),
        require_email_confirmation: false,
    })
}

#[cfg(test)]
mod tests {
    use crate::{
        backend::memory::InMemory,
        store::{CharacterDraft, CharacterStore},
    };

    #[tokio::test]
    async fn test_save_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dramatis.json");

        let backend = InMemory::new();
        let ana = backend.add_account("ana", "ana@example.com", "pw").unwrap();
        backend
            .insert_character(&ana, CharacterDraft::new("Iris"))
            .await
            .unwrap();
        backend.save_to_file(&path).unwrap();

        let restored = InMemory::load_from_file(&path).unwrap();
        let characters = restored.list_characters(&ana).await.unwrap();
        assert_eq!(characters.len(), 1);
        assert_eq!(characters[0].name, "Iris");
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let backend = InMemory::load_from_file(dir.path().join("nope.json")).unwrap();
        drop(backend);
    }

    #[test]
    fn test_unsupported_version_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dramatis.json");
        std::fs::write(
            &path,
            r#"{"_v": 9, "accounts": {}, "characters": {}, "active_user": null}"#,
        )
        .unwrap();
        assert!(InMemory::load_from_file(&path).is_err());
    }
}
