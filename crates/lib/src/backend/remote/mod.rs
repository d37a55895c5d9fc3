//! Client for a Supabase-style hosted backend
//!
//! Auth endpoints live under `/auth/v1` (password-grant token, signup, user,
//! logout); profile and character rows live under `/rest/v1` with PostgREST
//! filter syntax. The access token is held in memory for the lifetime of the
//! client; persisting sessions across processes is the service's business,
//! not this crate's.
//!
//! The table contract is fixed: profiles in `profiles`, characters in
//! `characters`. A missing table surfaces as an error; there is no fallback
//! probing and no mock data.

mod auth;
mod rest;

use std::sync::RwLock;

use serde::Deserialize;
use url::Url;

use crate::auth::AuthUser;

/// Connection settings for the hosted backend.
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    /// Project base URL, e.g. `https://xyzcompany.supabase.co/`
    pub base_url: Url,

    /// Public (anonymous) API key, sent as the `apikey` header and used as
    /// the bearer token until a user signs in
    pub api_key: String,
}

/// Access token state held between calls.
#[derive(Debug, Clone)]
struct AccessToken {
    token: String,
    user: AuthUser,
}

/// Client for a Supabase-style hosted backend.
///
/// Implements all three collaborator contracts over HTTP. Cheap handle
/// around a connection-pooled [`reqwest::Client`].
pub struct Remote {
    config: RemoteConfig,
    http: reqwest::Client,
    token: RwLock<Option<AccessToken>>,
}

impl Remote {
    /// Create a client for the given project.
    pub fn new(config: RemoteConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
            token: RwLock::new(None),
        }
    }

    /// The user the client currently holds a token for, if any.
    ///
    /// This reflects client-side token state only; whether the service still
    /// honors the token is what
    /// [`current_session`](crate::auth::AuthService::current_session) checks.
    pub fn signed_in_user(&self) -> Option<AuthUser> {
        self.token.read().unwrap().as_ref().map(|t| t.user.clone())
    }

    /// Build an endpoint URL under the configured base, preserving any base
    /// path (self-hosted deployments mount the API under a prefix).
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.config.base_url.clone();
        if let Ok(mut parts) = url.path_segments_mut() {
            parts.pop_if_empty();
            for segment in segments {
                parts.push(segment);
            }
        }
        url
    }

    /// Bearer token for REST calls: the user token when signed in, the
    /// anonymous key otherwise.
    fn bearer(&self) -> String {
        self.token
            .read()
            .unwrap()
            .as_ref()
            .map(|t| t.token.clone())
            .unwrap_or_else(|| self.config.api_key.clone())
    }
}

impl std::fmt::Debug for Remote {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Remote")
            .field("base_url", &self.config.base_url.as_str())
            .field("signed_in", &self.token.read().unwrap().is_some())
            .finish()
    }
}

/// Error body shape used by both the auth and REST surfaces.
#[derive(Debug, Deserialize)]
struct ErrorPayload {
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl ErrorPayload {
    fn into_message(self) -> Option<String> {
        self.error_description
            .or(self.msg)
            .or(self.message)
            .or(self.error)
    }
}

/// Extract a human-readable reason from a non-success response.
async fn response_error_reason(response: reqwest::Response) -> String {
    let status = response.status();
    match response.json::<ErrorPayload>().await {
        Ok(payload) => payload
            .into_message()
            .unwrap_or_else(|| format!("HTTP {status}")),
        Err(_) => format!("HTTP {status}"),
    }
}
