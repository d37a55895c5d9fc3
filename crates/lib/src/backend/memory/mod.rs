//! In-memory backend implementation
//!
//! Implements all three collaborator contracts against process-local state,
//! suitable for the offline/local mode, development, and tests. Basic
//! persistence is available via `save_to_file` and `load_from_file`, which
//! serialize the whole state to JSON.
//!
//! Passwords are stored as Argon2id hashes (PHC string format), never in
//! plaintext.

mod persistence;

use std::{collections::HashMap, path::Path, sync::RwLock};

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core},
};
use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    Result,
    auth::{AuthError, AuthService, AuthUser, Credentials, NewAccount},
    directory::{DirectoryEntry, DirectoryError, Profile, ProfileDirectory},
    identity::{CharacterId, UserId},
    store::{Character, CharacterDraft, CharacterStore, StoreError},
};

/// A registered account.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Account {
    user_id: UserId,
    username: String,
    email: String,
    /// Argon2id hash in PHC string format
    password_hash: String,
    email_confirmed: bool,
    /// Unix timestamp
    created_at: i64,
}

impl Account {
    fn auth_user(&self) -> AuthUser {
        AuthUser {
            user_id: self.user_id.clone(),
            email: self.email.clone(),
        }
    }
}

/// Serializable backend state: accounts, per-owner character collections,
/// and the remembered active session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct MemoryState {
    accounts: HashMap<UserId, Account>,
    characters: HashMap<UserId, Vec<Character>>,
    active_user: Option<UserId>,
}

/// In-memory implementation of the auth, directory, and store contracts.
///
/// The active session is part of the state, so a persisted file restores the
/// signed-in user the way browser local storage would.
#[derive(Debug)]
pub struct InMemory {
    state: RwLock<MemoryState>,
    require_email_confirmation: bool,
}

impl InMemory {
    /// Creates a new, empty `InMemory` backend.
    pub fn new() -> Self {
        Self {
            state: RwLock::new(MemoryState::default()),
            require_email_confirmation: false,
        }
    }

    /// Require email confirmation before sign-in, the way hosted auth
    /// services do. New registrations start unconfirmed; use
    /// [`confirm_email`](Self::confirm_email) to flip them.
    pub fn require_email_confirmation(mut self) -> Self {
        self.require_email_confirmation = true;
        self
    }

    /// Register a confirmed account directly, bypassing the sign-up flow.
    /// Intended for seeding fixtures and local bootstrapping.
    ///
    /// # Returns
    /// The id assigned to the new account.
    pub fn add_account(
        &self,
        username: impl Into<String>,
        email: impl Into<String>,
        password: impl AsRef<str>,
    ) -> Result<UserId> {
        let username = username.into();
        let email = email.into();
        let password_hash = hash_password(password.as_ref())?;

        let mut state = self.state.write().unwrap();
        if state.accounts.values().any(|a| a.email == email) {
            return Err(AuthError::AlreadyRegistered { email }.into());
        }
        let account = Account {
            user_id: UserId::new(Uuid::new_v4().to_string()),
            username,
            email,
            password_hash,
            email_confirmed: true,
            created_at: Utc::now().timestamp(),
        };
        let user_id = account.user_id.clone();
        state.characters.entry(user_id.clone()).or_default();
        state.accounts.insert(user_id.clone(), account);
        Ok(user_id)
    }

    /// Mark an account's email address as confirmed.
    pub fn confirm_email(&self, user_id: &UserId) -> bool {
        let mut state = self.state.write().unwrap();
        match state.accounts.get_mut(user_id) {
            Some(account) => {
                account.email_confirmed = true;
                true
            }
            None => false,
        }
    }

    /// Saves the entire backend state to a JSON file.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        persistence::save_to_file(self, path)
    }

    /// Loads backend state from a JSON file.
    ///
    /// If the file does not exist, a new, empty backend is returned.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        persistence::load_from_file(path)
    }

    fn account_by_email(&self, email: &str) -> Option<Account> {
        let state = self.state.read().unwrap();
        state.accounts.values().find(|a| a.email == email).cloned()
    }
}

impl Default for InMemory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AuthService for InMemory {
    async fn current_session(&self) -> std::result::Result<Option<AuthUser>, AuthError> {
        let state = self.state.read().unwrap();
        Ok(state
            .active_user
            .as_ref()
            .and_then(|id| state.accounts.get(id))
            .map(Account::auth_user))
    }

    async fn sign_in(
        &self,
        credentials: Credentials,
    ) -> std::result::Result<AuthUser, AuthError> {
        // An unknown email and a wrong password are indistinguishable to the
        // caller.
        let Some(account) = self.account_by_email(&credentials.email) else {
            return Err(AuthError::InvalidCredentials);
        };
        if !verify_password(&credentials.password, &account.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }
        if self.require_email_confirmation && !account.email_confirmed {
            return Err(AuthError::EmailUnconfirmed {
                email: account.email,
            });
        }
        self.state.write().unwrap().active_user = Some(account.user_id.clone());
        Ok(account.auth_user())
    }

    async fn sign_up(&self, account: NewAccount) -> std::result::Result<AuthUser, AuthError> {
        let password_hash = hash_password(&account.password)?;
        let email_confirmed = !self.require_email_confirmation;

        let mut state = self.state.write().unwrap();
        if state.accounts.values().any(|a| a.email == account.email) {
            return Err(AuthError::AlreadyRegistered {
                email: account.email.clone(),
            });
        }
        let record = Account {
            user_id: UserId::new(Uuid::new_v4().to_string()),
            username: account.username.clone(),
            email: account.email.clone(),
            password_hash,
            email_confirmed,
            created_at: Utc::now().timestamp(),
        };
        let user = record.auth_user();
        state.characters.entry(record.user_id.clone()).or_default();
        state.accounts.insert(record.user_id.clone(), record);

        if !email_confirmed {
            // The account exists, but no session until the address is
            // confirmed.
            return Err(AuthError::EmailUnconfirmed {
                email: account.email.clone(),
            });
        }
        state.active_user = Some(user.user_id.clone());
        Ok(user)
    }

    async fn sign_out(&self) -> std::result::Result<(), AuthError> {
        self.state.write().unwrap().active_user = None;
        Ok(())
    }
}

#[async_trait]
impl ProfileDirectory for InMemory {
    async fn lookup_profile(
        &self,
        user_id: &UserId,
    ) -> std::result::Result<Option<Profile>, DirectoryError> {
        let state = self.state.read().unwrap();
        Ok(state.accounts.get(user_id).map(|account| Profile {
            user_id: account.user_id.clone(),
            username: account.username.clone(),
        }))
    }

    async fn list_profiles(&self) -> std::result::Result<Vec<DirectoryEntry>, DirectoryError> {
        let state = self.state.read().unwrap();
        let mut entries: Vec<DirectoryEntry> = state
            .accounts
            .values()
            .map(|account| DirectoryEntry {
                user_id: account.user_id.clone(),
                username: account.username.clone(),
            })
            .collect();
        entries.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(entries)
    }
}

#[async_trait]
impl CharacterStore for InMemory {
    async fn list_characters(
        &self,
        owner: &UserId,
    ) -> std::result::Result<Vec<Character>, StoreError> {
        let state = self.state.read().unwrap();
        let mut characters = state.characters.get(owner).cloned().unwrap_or_default();
        characters.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(characters)
    }

    async fn insert_character(
        &self,
        owner: &UserId,
        draft: CharacterDraft,
    ) -> std::result::Result<Character, StoreError> {
        let character = Character {
            id: CharacterId::new(Uuid::new_v4().to_string()),
            owner: owner.clone(),
            name: draft.name,
            image: draft.image,
            age: None,
            birthday: None,
            height: None,
            occupation: None,
            race: None,
            location: None,
            goals: None,
            skills: None,
            extra: None,
            story: None,
            relations: Vec::new(),
            gallery: Vec::new(),
            created_at: Utc::now(),
        };
        let mut state = self.state.write().unwrap();
        state
            .characters
            .entry(owner.clone())
            .or_default()
            .push(character.clone());
        Ok(character)
    }

    async fn update_character(
        &self,
        owner: &UserId,
        character: &Character,
    ) -> std::result::Result<(), StoreError> {
        let mut state = self.state.write().unwrap();
        let not_found = StoreError::CharacterNotFound {
            id: character.id.clone(),
        };
        let Some(collection) = state.characters.get_mut(owner) else {
            return Err(not_found);
        };
        match collection.iter_mut().find(|c| c.id == character.id) {
            Some(slot) => {
                let mut updated = character.clone();
                // The owner column is part of the write scope, not the payload.
                updated.owner = owner.clone();
                *slot = updated;
                Ok(())
            }
            None => Err(not_found),
        }
    }

    async fn delete_character(
        &self,
        owner: &UserId,
        id: &CharacterId,
    ) -> std::result::Result<(), StoreError> {
        let mut state = self.state.write().unwrap();
        let not_found = StoreError::CharacterNotFound { id: id.clone() };
        let Some(collection) = state.characters.get_mut(owner) else {
            return Err(not_found);
        };
        let before = collection.len();
        collection.retain(|c| &c.id != id);
        if collection.len() == before {
            return Err(not_found);
        }
        Ok(())
    }
}

/// Hash a password using Argon2id, returning a PHC format string.
fn hash_password(password: &str) -> std::result::Result<String, AuthError> {
    let salt = SaltString::generate(&mut rand_core::OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Unknown {
            reason: format!("password hashing failed: {e}"),
        })
}

/// Verify a password against a stored PHC hash string.
fn verify_password(password: &str, password_hash: &str) -> std::result::Result<bool, AuthError> {
    let parsed = PasswordHash::new(password_hash).map_err(|e| AuthError::Unknown {
        reason: format!("stored password hash is malformed: {e}"),
    })?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}
