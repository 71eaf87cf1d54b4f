//! Firebase Identity Toolkit REST client

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};

use super::{AuthError, IdentityProvider, Session};
use crate::core::AppConfig;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignInResponse {
    id_token: String,
    // signInWithCustomToken does not return the user id
    local_id: Option<String>,
    refresh_token: Option<String>,
    // Seconds, sent as a string
    expires_in: Option<String>,
}

// The secure token endpoint answers in snake case
#[derive(Debug, Deserialize)]
struct RefreshResponse {
    id_token: String,
    refresh_token: String,
    expires_in: Option<String>,
    user_id: Option<String>,
}

/// Read the `sub` claim out of an id token without verifying it.
fn token_subject(id_token: &str) -> Option<String> {
    let payload = id_token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    let claims: Value = serde_json::from_slice(&bytes).ok()?;
    claims.get("sub")?.as_str().map(String::from)
}

fn expires_at(expires_in: Option<&str>) -> Option<DateTime<Utc>> {
    let secs: i64 = expires_in?.trim().parse().ok()?;
    Some(Utc::now() + Duration::seconds(secs))
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, AuthError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(AuthError::Rejected { status, body })
}

pub struct IdentityToolkit {
    client: Client,
    api_hostname: String,
    securetoken_api_hostname: String,
    api_key: String,
}

impl IdentityToolkit {
    pub fn new(api_hostname: &str, securetoken_api_hostname: &str, api_key: &str) -> Self {
        Self {
            client: Client::new(),
            api_hostname: api_hostname.trim_end_matches('/').to_string(),
            securetoken_api_hostname: securetoken_api_hostname.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            &config.identity_api_hostname,
            &config.securetoken_api_hostname,
            &config.firebase_api_key,
        )
    }

    fn require_key(&self) -> Result<(), AuthError> {
        if self.api_key.is_empty() {
            return Err(AuthError::Config(String::from(
                "DAWRIYA_FIREBASE_API_KEY is not set",
            )));
        }
        Ok(())
    }

    async fn sign_in(
        &self,
        endpoint: &str,
        payload: Value,
        anonymous: bool,
    ) -> Result<Session, AuthError> {
        self.require_key()?;
        let url = format!("{}/v1/accounts:{}", self.api_hostname, endpoint);
        let response = self
            .client
            .post(url)
            .query(&[("key", &self.api_key)])
            .json(&payload)
            .send()
            .await?;

        let SignInResponse {
            id_token,
            local_id,
            refresh_token,
            expires_in,
        } = check_status(response).await?.json().await?;
        let uid = local_id
            .or_else(|| token_subject(&id_token))
            .unwrap_or_default();
        Ok(Session {
            uid,
            expires_at: expires_at(expires_in.as_deref()),
            id_token,
            refresh_token: refresh_token.unwrap_or_default(),
            anonymous,
        })
    }

    /// Exchange the session's refresh token for a new id token. Id
    /// tokens are only valid for an hour.
    pub async fn refresh(&self, session: &Session) -> Result<Session, AuthError> {
        self.require_key()?;
        if session.refresh_token.is_empty() {
            return Err(AuthError::Config(String::from(
                "Session has no refresh token",
            )));
        }
        let url = format!("{}/v1/token", self.securetoken_api_hostname);
        let response = self
            .client
            .post(url)
            .query(&[("key", &self.api_key)])
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", session.refresh_token.as_str()),
            ])
            .send()
            .await?;

        let refreshed: RefreshResponse = check_status(response).await?.json().await?;
        tracing::debug!(uid = %session.uid, "Refreshed id token");
        Ok(Session {
            uid: refreshed.user_id.unwrap_or_else(|| session.uid.clone()),
            expires_at: expires_at(refreshed.expires_in.as_deref()),
            id_token: refreshed.id_token,
            refresh_token: refreshed.refresh_token,
            anonymous: session.anonymous,
        })
    }
}

#[async_trait]
impl IdentityProvider for IdentityToolkit {
    async fn sign_in_anonymously(&self) -> Result<Session, AuthError> {
        self.sign_in("signUp", json!({ "returnSecureToken": true }), true)
            .await
    }

    async fn sign_in_with_custom_token(&self, token: &str) -> Result<Session, AuthError> {
        self.sign_in(
            "signInWithCustomToken",
            json!({ "token": token, "returnSecureToken": true }),
            false,
        )
        .await
    }
}
