//! Auth surface of the hosted backend (`/auth/v1`)

use async_trait::async_trait;
use serde::Deserialize;

use super::{AccessToken, Remote, response_error_reason};
use crate::{
    auth::{AuthError, AuthService, AuthUser, Credentials, NewAccount},
    identity::UserId,
};

#[derive(Debug, Deserialize)]
struct UserPayload {
    id: String,
    #[serde(default)]
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    user: UserPayload,
}

/// Signup responses differ by deployment: auto-confirm projects return a
/// session (token + user), confirmation-required projects return the bare
/// user object.
#[derive(Debug, Deserialize)]
struct SignupResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    user: Option<UserPayload>,
    #[serde(default)]
    id: Option<String>,
}

fn transport_failure(err: reqwest::Error) -> AuthError {
    AuthError::Network {
        reason: err.to_string(),
    }
}

/// Map a service error message onto the taxonomy.
fn classify_auth_failure(message: &str, email: &str) -> AuthError {
    let lowered = message.to_ascii_lowercase();
    if lowered.contains("invalid login credentials") || lowered.contains("invalid_grant") {
        AuthError::InvalidCredentials
    } else if lowered.contains("email not confirmed") {
        AuthError::EmailUnconfirmed {
            email: email.to_string(),
        }
    } else if lowered.contains("already registered") || lowered.contains("already exists") {
        AuthError::AlreadyRegistered {
            email: email.to_string(),
        }
    } else {
        AuthError::Unknown {
            reason: message.to_string(),
        }
    }
}

#[async_trait]
impl AuthService for Remote {
    async fn current_session(&self) -> Result<Option<AuthUser>, AuthError> {
        let token = self.token.read().unwrap().clone();
        let Some(token) = token else {
            return Ok(None);
        };

        let url = self.endpoint(&["auth", "v1", "user"]);
        let response = self
            .http
            .get(url)
            .header("apikey", &self.config.api_key)
            .bearer_auth(&token.token)
            .send()
            .await
            .map_err(transport_failure)?;

        if response.status().is_success() {
            let user: UserPayload = response.json().await.map_err(transport_failure)?;
            Ok(Some(AuthUser {
                user_id: UserId::new(user.id),
                email: user.email.unwrap_or(token.user.email),
            }))
        } else {
            // The service no longer honors the token; drop it.
            tracing::debug!(status = %response.status(), "held token rejected, clearing it");
            *self.token.write().unwrap() = None;
            Ok(None)
        }
    }

    async fn sign_in(&self, credentials: Credentials) -> Result<AuthUser, AuthError> {
        let mut url = self.endpoint(&["auth", "v1", "token"]);
        url.query_pairs_mut().append_pair("grant_type", "password");

        let response = self
            .http
            .post(url)
            .header("apikey", &self.config.api_key)
            .json(&serde_json::json!({
                "email": &credentials.email,
                "password": &credentials.password,
            }))
            .send()
            .await
            .map_err(transport_failure)?;

        if !response.status().is_success() {
            let reason = response_error_reason(response).await;
            return Err(classify_auth_failure(&reason, &credentials.email));
        }

        let token: TokenResponse = response.json().await.map_err(transport_failure)?;
        let user = AuthUser {
            user_id: UserId::new(token.user.id),
            email: token.user.email.unwrap_or_else(|| credentials.email.clone()),
        };
        *self.token.write().unwrap() = Some(AccessToken {
            token: token.access_token,
            user: user.clone(),
        });
        Ok(user)
    }

    async fn sign_up(&self, account: NewAccount) -> Result<AuthUser, AuthError> {
        let url = self.endpoint(&["auth", "v1", "signup"]);
        let response = self
            .http
            .post(url)
            .header("apikey", &self.config.api_key)
            .json(&serde_json::json!({
                "email": &account.email,
                "password": &account.password,
                "data": { "username": &account.username },
            }))
            .send()
            .await
            .map_err(transport_failure)?;

        if !response.status().is_success() {
            let reason = response_error_reason(response).await;
            return Err(classify_auth_failure(&reason, &account.email));
        }

        let signup: SignupResponse = response.json().await.map_err(transport_failure)?;
        let (token, user_payload) = match (signup.access_token, signup.user, signup.id) {
            (Some(token), Some(user), _) => (Some(token), user),
            (None, Some(user), _) => (None, user),
            (None, None, Some(id)) => (None, UserPayload { id, email: None }),
            _ => {
                return Err(AuthError::Unknown {
                    reason: "signup response carried no user".to_string(),
                });
            }
        };
        let user = AuthUser {
            user_id: UserId::new(user_payload.id),
            email: user_payload.email.unwrap_or_else(|| account.email.clone()),
        };

        if let Some(token) = token {
            *self.token.write().unwrap() = Some(AccessToken {
                token,
                user: user.clone(),
            });
        }

        // The profile row powers the public directory; without it the new
        // account is invisible to the picker.
        if let Err(err) = super::rest::insert_profile(self, &user.user_id, &account.username).await
        {
            tracing::warn!(user_id = %user.user_id, error = %err, "profile row creation failed");
        }

        if self.token.read().unwrap().is_none() {
            // Account created, but the deployment wants the address
            // confirmed before it hands out a session.
            return Err(AuthError::EmailUnconfirmed {
                email: account.email.clone(),
            });
        }
        Ok(user)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        let token = self.token.write().unwrap().take();
        let Some(token) = token else {
            return Ok(());
        };

        let url = self.endpoint(&["auth", "v1", "logout"]);
        let response = self
            .http
            .post(url)
            .header("apikey", &self.config.api_key)
            .bearer_auth(&token.token)
            .send()
            .await
            .map_err(transport_failure)?;

        if !response.status().is_success() {
            return Err(AuthError::Unknown {
                reason: response_error_reason(response).await,
            });
        }
        Ok(())
    }
}
