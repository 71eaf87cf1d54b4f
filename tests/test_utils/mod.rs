//! Test utilities for integration tests
#![allow(dead_code)]

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use axum::{Router, body::Body};
use chrono::Utc;
use futures::StreamExt;
use futures::stream::BoxStream;
use tokio::sync::watch;
use tokio_rusqlite::Connection;

use dawriya::api::{AppState, SharedState, app, app_state};
use dawriya::booking::{Booking, Weekday};
use dawriya::controller::{Controller, ViewStatus, wait_until_settled};
use dawriya::core::{AppConfig, StoreBackend};
use dawriya::session::{
    AuthError, IdentityProvider, LocalIdentity, Session, SessionBootstrapper,
};
use dawriya::store::{BookingStore, StoreError};

pub fn test_config() -> AppConfig {
    AppConfig {
        storage_path: String::from("./"),
        db_path: String::from("./db"),
        store_backend: StoreBackend::Sqlite,
        app_id: String::from("test-app"),
        firebase_project_id: String::new(),
        firebase_api_key: String::new(),
        firestore_api_hostname: String::from("http://localhost:1"),
        identity_api_hostname: String::from("http://localhost:1"),
        securetoken_api_hostname: String::from("http://localhost:1"),
        initial_auth_token: None,
        store_poll_interval_secs: 1,
        year: String::from("1447"),
        hosts: vec![
            String::from("أبو سلطان"),
            String::from("أم فهد"),
            String::from("Abu Sultan"),
        ],
        locations: vec![String::from("Hall A"), String::from("استراحة الملقا")],
        gemini_api_hostname: String::from("http://localhost:1"),
        gemini_api_key: String::from("test-key"),
        gemini_model: String::from("gemini-test"),
    }
}

/// Identity provider that always refuses to sign in
pub struct RefusingIdentity;

#[async_trait]
impl IdentityProvider for RefusingIdentity {
    async fn sign_in_anonymously(&self) -> Result<Session, AuthError> {
        Err(AuthError::Config(String::from("sign in disabled")))
    }

    async fn sign_in_with_custom_token(&self, _token: &str) -> Result<Session, AuthError> {
        Err(AuthError::Config(String::from("sign in disabled")))
    }
}

/// Store whose live feed delivers `snapshots` and then fails
pub struct BrokenFeed {
    pub snapshots: Vec<Vec<Booking>>,
}

#[async_trait]
impl BookingStore for BrokenFeed {
    async fn fetch_all(&self) -> Result<Vec<Booking>, StoreError> {
        Ok(self.snapshots.last().cloned().unwrap_or_default())
    }

    async fn put(&self, _doc_id: &str, _booking: &Booking) -> Result<(), StoreError> {
        Err(StoreError::Config(String::from("read only")))
    }

    fn changes(&self) -> BoxStream<'static, Result<Vec<Booking>, StoreError>> {
        let mut items: Vec<Result<Vec<Booking>, StoreError>> =
            self.snapshots.iter().cloned().map(Ok).collect();
        items.push(Err(StoreError::Status {
            status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
            body: String::from("feed closed"),
        }));
        futures::stream::iter(items).boxed()
    }
}

pub fn booking(month: &str, host: &str) -> Booking {
    Booking {
        month: month.to_string(),
        year: String::from("1447"),
        host: host.to_string(),
        location: String::from("Hall A"),
        day: Weekday::Friday,
        created_at: Utc::now(),
    }
}

/// Creates a test application whose live feed fails after delivering
/// `snapshots`, and waits for the failure to be published.
pub async fn broken_feed_app(snapshots: Vec<Vec<Booking>>) -> (Router, SharedState) {
    let bootstrapper = SessionBootstrapper::new(Arc::new(LocalIdentity));
    let (view_tx, mut view) = watch::channel(ViewStatus::Loading);
    let state = Arc::new(RwLock::new(AppState::new(
        None,
        test_config(),
        bootstrapper.state(),
        view.clone(),
    )));
    let _controller = Controller::start_with_store(
        Arc::clone(&state),
        bootstrapper,
        view_tx,
        Arc::new(BrokenFeed { snapshots }),
    );

    view.wait_for(|status| matches!(status, ViewStatus::Failed { .. }))
        .await
        .expect("Controller stopped before the feed failed");

    (app(Arc::clone(&state)), state)
}

/// Creates a test application backed by an in-memory sqlite store and
/// waits for the first snapshot.
pub async fn test_app() -> (Router, SharedState) {
    test_app_with_config(test_config()).await
}

pub async fn test_app_with_config(config: AppConfig) -> (Router, SharedState) {
    let db = Connection::open_in_memory()
        .await
        .expect("Failed to open in-memory db");
    let (state, _controller) = app_state(Some(db), config, Arc::new(LocalIdentity));

    let mut view = state.read().unwrap().view.clone();
    let status = wait_until_settled(&mut view)
        .await
        .expect("Controller stopped before the first snapshot");
    assert!(matches!(status, ViewStatus::Live { .. }));

    (app(Arc::clone(&state)), state)
}

/// Creates a test application whose sign in fails, so it never leaves
/// the loading state.
pub async fn loading_app() -> (Router, SharedState) {
    let db = Connection::open_in_memory()
        .await
        .expect("Failed to open in-memory db");
    let (state, _controller) = app_state(Some(db), test_config(), Arc::new(RefusingIdentity));
    (app(Arc::clone(&state)), state)
}

/// Wait until the live view shows `month` as booked.
pub async fn wait_for_booking(state: &SharedState, month: &str) {
    let mut view = state.read().unwrap().view.clone();
    view.wait_for(|status| status.view().is_some_and(|v| v.is_booked(month)))
        .await
        .expect("Controller stopped before the booking arrived");
}

pub async fn body_to_string(body: Body) -> String {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Failed to read body");
    String::from_utf8(bytes.to_vec()).expect("Body is not utf-8")
}
