//! Document stores holding the bookings collection. Every store keys
//! documents by a deterministic id and overwrites on write, so the last
//! writer for an id wins.

mod firestore;
mod sqlite;

pub use firestore::FirestoreStore;
pub use sqlite::SqliteStore;

use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::BoxStream;
use thiserror::Error;
use tokio_rusqlite::Connection;

use crate::booking::Booking;
use crate::core::{AppConfig, StoreBackend};
use crate::session::{AuthError, Session};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] tokio_rusqlite::Error),
    #[error("Request to document store failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Document store responded with {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("Invalid document: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Document store is not configured: {0}")]
    Config(String),
    #[error("Could not renew the store session: {0}")]
    Auth(#[from] AuthError),
}

#[async_trait]
pub trait BookingStore: Send + Sync {
    /// Every booking document in the collection.
    async fn fetch_all(&self) -> Result<Vec<Booking>, StoreError>;

    /// Create or overwrite the document at `doc_id`.
    async fn put(&self, doc_id: &str, booking: &Booking) -> Result<(), StoreError>;

    /// Full snapshots of the collection, starting with the current
    /// contents and then one per change. The stream ends after yielding
    /// an error.
    fn changes(&self) -> BoxStream<'static, Result<Vec<Booking>, StoreError>>;
}

/// Open the store selected by the config. The session must come from a
/// completed bootstrap.
pub async fn connect_store(
    config: &AppConfig,
    db: Option<Connection>,
    session: &Session,
) -> Result<Arc<dyn BookingStore>, StoreError> {
    let collection = config.collection_path();
    tracing::debug!(
        "Connecting to {} store for collection {}",
        config.store_backend,
        collection
    );
    match config.store_backend {
        StoreBackend::Sqlite => {
            let db = db.ok_or_else(|| StoreError::Config("sqlite database is not open".into()))?;
            let store = SqliteStore::open(db, &collection).await?;
            Ok(Arc::new(store))
        }
        StoreBackend::Firestore => {
            let store = FirestoreStore::new(config, session)?;
            Ok(Arc::new(store))
        }
    }
}
