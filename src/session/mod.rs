//! Session bootstrap. A process signs in exactly once, either by
//! exchanging a pre-issued token or anonymously, before the booking
//! store may be touched.

mod identity_toolkit;
mod local;

pub use identity_toolkit::IdentityToolkit;
pub use local::LocalIdentity;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use thiserror::Error;
use tokio::sync::watch;

use crate::core::{AppConfig, StoreBackend};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Session {
    pub uid: String,
    // Bearer token for the document store, empty for local sessions
    pub id_token: String,
    // Exchanged for a new id token, empty when the provider issues none
    pub refresh_token: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub anonymous: bool,
}

impl Session {
    /// True when the id token can be refreshed and expires within the
    /// next five minutes.
    pub fn needs_refresh(&self, now: DateTime<Utc>) -> bool {
        !self.refresh_token.is_empty()
            && self
                .expires_at
                .is_some_and(|at| at - Duration::minutes(5) <= now)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    Authenticating,
    Ready(Session),
}

impl SessionState {
    pub fn is_ready(&self) -> bool {
        matches!(self, SessionState::Ready(_))
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Identity request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Identity provider responded with {status}: {body}")]
    Rejected {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("Identity provider is not configured: {0}")]
    Config(String),
    #[error("Authentication is already in progress")]
    InProgress,
    #[error("Authentication failed earlier in this run")]
    Abandoned,
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_in_anonymously(&self) -> Result<Session, AuthError>;
    async fn sign_in_with_custom_token(&self, token: &str) -> Result<Session, AuthError>;
}

/// Pick the identity provider that matches the configured store.
pub fn identity_provider(config: &AppConfig) -> Arc<dyn IdentityProvider> {
    match config.store_backend {
        StoreBackend::Sqlite => Arc::new(LocalIdentity),
        StoreBackend::Firestore => Arc::new(IdentityToolkit::from_config(config)),
    }
}

pub struct SessionBootstrapper {
    provider: Arc<dyn IdentityProvider>,
    state: watch::Sender<SessionState>,
    failed: AtomicBool,
}

impl SessionBootstrapper {
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        let (state, _) = watch::channel(SessionState::Unauthenticated);
        Self {
            provider,
            state,
            failed: AtomicBool::new(false),
        }
    }

    pub fn state(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Sign in once. Calling again after success hands back the same
    /// session; after a failure it errors without contacting the
    /// provider.
    pub async fn bootstrap(&self, token: Option<&str>) -> Result<Session, AuthError> {
        let mut start = false;
        self.state.send_if_modified(|state| {
            if *state == SessionState::Unauthenticated && !self.failed.load(Ordering::SeqCst) {
                *state = SessionState::Authenticating;
                start = true;
            }
            start
        });

        if !start {
            return match &*self.state.borrow() {
                SessionState::Ready(session) => Ok(session.clone()),
                SessionState::Authenticating => Err(AuthError::InProgress),
                SessionState::Unauthenticated => Err(AuthError::Abandoned),
            };
        }

        let result = match token.filter(|t| !t.is_empty()) {
            Some(token) => {
                tracing::debug!("Exchanging bootstrap token for a session");
                self.provider.sign_in_with_custom_token(token).await
            }
            None => {
                tracing::debug!("Signing in anonymously");
                self.provider.sign_in_anonymously().await
            }
        };

        match result {
            Ok(session) => {
                tracing::info!(uid = %session.uid, anonymous = session.anonymous, "Session ready");
                self.state.send_replace(SessionState::Ready(session.clone()));
                Ok(session)
            }
            Err(e) => {
                tracing::error!("Authentication error: {}", e);
                self.failed.store(true, Ordering::SeqCst);
                self.state.send_replace(SessionState::Unauthenticated);
                Err(e)
            }
        }
    }
}
