//! REST surface of the hosted backend (`/rest/v1`, PostgREST)

use async_trait::async_trait;

use super::{Remote, response_error_reason};
use crate::{
    directory::{DirectoryEntry, DirectoryError, Profile, ProfileDirectory},
    identity::{CharacterId, UserId},
    store::{Character, CharacterDraft, CharacterStore, StoreError},
};

const PROFILES_TABLE: &str = "profiles";
const CHARACTERS_TABLE: &str = "characters";

fn directory_failure(err: reqwest::Error) -> DirectoryError {
    DirectoryError::Unavailable {
        reason: err.to_string(),
    }
}

fn store_failure(err: reqwest::Error) -> StoreError {
    StoreError::Unavailable {
        reason: err.to_string(),
    }
}

impl Remote {
    fn table(&self, name: &str) -> url::Url {
        self.endpoint(&["rest", "v1", name])
    }

    fn rest_request(&self, method: reqwest::Method, url: url::Url) -> reqwest::RequestBuilder {
        self.http
            .request(method, url)
            .header("apikey", &self.config.api_key)
            .bearer_auth(self.bearer())
    }
}

/// Create the directory row for a freshly registered account.
pub(super) async fn insert_profile(
    remote: &Remote,
    user_id: &UserId,
    username: &str,
) -> Result<(), DirectoryError> {
    let response = remote
        .rest_request(reqwest::Method::POST, remote.table(PROFILES_TABLE))
        .json(&serde_json::json!({ "id": user_id, "username": username }))
        .send()
        .await
        .map_err(directory_failure)?;
    if response.status().is_success() {
        Ok(())
    } else {
        Err(DirectoryError::Unavailable {
            reason: response_error_reason(response).await,
        })
    }
}

#[async_trait]
impl ProfileDirectory for Remote {
    async fn lookup_profile(&self, user_id: &UserId) -> Result<Option<Profile>, DirectoryError> {
        let mut url = self.table(PROFILES_TABLE);
        url.query_pairs_mut()
            .append_pair("id", &format!("eq.{user_id}"))
            .append_pair("select", "id,username");

        let response = self
            .rest_request(reqwest::Method::GET, url)
            .send()
            .await
            .map_err(directory_failure)?;
        if !response.status().is_success() {
            return Err(DirectoryError::Unavailable {
                reason: response_error_reason(response).await,
            });
        }
        let mut rows: Vec<Profile> = response.json().await.map_err(directory_failure)?;
        if rows.is_empty() {
            Ok(None)
        } else {
            Ok(Some(rows.remove(0)))
        }
    }

    async fn list_profiles(&self) -> Result<Vec<DirectoryEntry>, DirectoryError> {
        let mut url = self.table(PROFILES_TABLE);
        url.query_pairs_mut()
            .append_pair("select", "id,username")
            .append_pair("order", "username.asc");

        let response = self
            .rest_request(reqwest::Method::GET, url)
            .send()
            .await
            .map_err(directory_failure)?;
        if !response.status().is_success() {
            return Err(DirectoryError::Unavailable {
                reason: response_error_reason(response).await,
            });
        }
        response.json().await.map_err(directory_failure)
    }
}

#[async_trait]
impl CharacterStore for Remote {
    async fn list_characters(&self, owner: &UserId) -> Result<Vec<Character>, StoreError> {
        let mut url = self.table(CHARACTERS_TABLE);
        url.query_pairs_mut()
            .append_pair("user_id", &format!("eq.{owner}"))
            .append_pair("select", "*")
            .append_pair("order", "created_at.asc");

        let response = self
            .rest_request(reqwest::Method::GET, url)
            .send()
            .await
            .map_err(store_failure)?;
        if !response.status().is_success() {
            return Err(StoreError::Unavailable {
                reason: response_error_reason(response).await,
            });
        }
        response.json().await.map_err(store_failure)
    }

    async fn insert_character(
        &self,
        owner: &UserId,
        draft: CharacterDraft,
    ) -> Result<Character, StoreError> {
        let response = self
            .rest_request(reqwest::Method::POST, self.table(CHARACTERS_TABLE))
            .header("Prefer", "return=representation")
            .json(&serde_json::json!({
                "user_id": owner,
                "name": draft.name,
                "image": draft.image,
                "relations": [],
                "gallery": [],
            }))
            .send()
            .await
            .map_err(store_failure)?;
        if !response.status().is_success() {
            return Err(StoreError::Unavailable {
                reason: response_error_reason(response).await,
            });
        }
        let rows: Vec<Character> = response.json().await.map_err(store_failure)?;
        rows.into_iter().next().ok_or_else(|| StoreError::Unavailable {
            reason: "insert returned no representation".to_string(),
        })
    }

    async fn update_character(
        &self,
        owner: &UserId,
        character: &Character,
    ) -> Result<(), StoreError> {
        let mut url = self.table(CHARACTERS_TABLE);
        // Scope by both the record id and the owner; a row owned by someone
        // else matches nothing.
        url.query_pairs_mut()
            .append_pair("id", &format!("eq.{}", character.id))
            .append_pair("user_id", &format!("eq.{owner}"));

        let response = self
            .rest_request(reqwest::Method::PATCH, url)
            .header("Prefer", "return=representation")
            .json(character)
            .send()
            .await
            .map_err(store_failure)?;
        if !response.status().is_success() {
            return Err(StoreError::Unavailable {
                reason: response_error_reason(response).await,
            });
        }
        let rows: Vec<Character> = response.json().await.map_err(store_failure)?;
        if rows.is_empty() {
            return Err(StoreError::CharacterNotFound {
                id: character.id.clone(),
            });
        }
        Ok(())
    }

    async fn delete_character(&self, owner: &UserId, id: &CharacterId) -> Result<(), StoreError> {
        let mut url = self.table(CHARACTERS_TABLE);
        url.query_pairs_mut()
            .append_pair("id", &format!("eq.{id}"))
            .append_pair("user_id", &format!("eq.{owner}"));

        let response = self
            .rest_request(reqwest::Method::DELETE, url)
            .header("Prefer", "return=representation")
            .send()
            .await
            .map_err(store_failure)?;
        if !response.status().is_success() {
            return Err(StoreError::Unavailable {
                reason: response_error_reason(response).await,
            });
        }
        let rows: Vec<Character> = response.json().await.map_err(store_failure)?;
        if rows.is_empty() {
            return Err(StoreError::CharacterNotFound { id: id.clone() });
        }
        Ok(())
    }
}
