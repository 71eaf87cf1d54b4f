use async_stream::stream;
use async_trait::async_trait;
use chrono::Utc;
use futures::stream::BoxStream;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio_rusqlite::Connection;

use super::{BookingStore, StoreError};
use crate::booking::Booking;
use crate::core::db::initialize_db;

/// Documents kept in a local sqlite table. Writers notify live feeds
/// over a broadcast channel so every change produces a new snapshot.
#[derive(Clone)]
pub struct SqliteStore {
    db: Connection,
    collection: String,
    notify: broadcast::Sender<()>,
}

impl SqliteStore {
    pub async fn open(db: Connection, collection: &str) -> Result<Self, StoreError> {
        db.call(|conn| {
            initialize_db(conn)?;
            Ok(())
        })
        .await?;
        let (notify, _) = broadcast::channel(16);
        Ok(Self {
            db,
            collection: collection.to_string(),
            notify,
        })
    }
}

#[async_trait]
impl BookingStore for SqliteStore {
    async fn fetch_all(&self) -> Result<Vec<Booking>, StoreError> {
        let collection = self.collection.clone();
        let rows: Vec<(String, String)> = self
            .db
            .call(move |conn| {
                let mut stmt =
                    conn.prepare("SELECT id, data FROM document WHERE collection = ? ORDER BY id")?;
                let rows = stmt
                    .query_map([collection], |row| Ok((row.get(0)?, row.get(1)?)))?
                    .collect::<Result<Vec<(String, String)>, rusqlite::Error>>()?;
                Ok(rows)
            })
            .await?;

        let bookings = rows
            .into_iter()
            .filter_map(|(id, data)| {
                serde_json::from_str::<Booking>(&data)
                    .inspect_err(|e| tracing::warn!("Skipping document {}: {}", id, e))
                    .ok()
            })
            .collect();
        Ok(bookings)
    }

    async fn put(&self, doc_id: &str, booking: &Booking) -> Result<(), StoreError> {
        let collection = self.collection.clone();
        let id = doc_id.to_string();
        let data = serde_json::to_string(booking)?;
        let updated_at = Utc::now().to_rfc3339();
        self.db
            .call(move |conn| {
                conn.execute(
                    r"
                    INSERT INTO document (collection, id, data, updated_at)
                    VALUES (?1, ?2, ?3, ?4)
                    ON CONFLICT(collection, id) DO UPDATE SET
                      data = excluded.data,
                      updated_at = excluded.updated_at
                    ",
                    [collection, id, data, updated_at],
                )?;
                Ok(())
            })
            .await?;

        // Nobody listening is fine
        let _ = self.notify.send(());
        Ok(())
    }

    fn changes(&self) -> BoxStream<'static, Result<Vec<Booking>, StoreError>> {
        let store = self.clone();
        // Subscribe before the first read so no write slips in between
        let mut rx = self.notify.subscribe();
        Box::pin(stream! {
            loop {
                match store.fetch_all().await {
                    Ok(bookings) => yield Ok(bookings),
                    Err(e) => {
                        yield Err(e);
                        break;
                    }
                }
                match rx.recv().await {
                    // Lagging only means several writes happened, the
                    // next read picks all of them up
                    Ok(()) | Err(RecvError::Lagged(_)) => {}
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use futures::StreamExt;

    use super::*;
    use crate::booking::Weekday;

    async fn test_store(collection: &str) -> SqliteStore {
        let db = Connection::open_in_memory().await.unwrap();
        SqliteStore::open(db, collection).await.unwrap()
    }

    fn booking(month: &str, host: &str) -> Booking {
        Booking {
            month: month.to_string(),
            year: String::from("1447"),
            host: host.to_string(),
            location: String::from("استراحة الملقا"),
            day: Weekday::Thursday,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn it_overwrites_documents_with_the_same_id() {
        let store = test_store("artifacts/test/public/data/bookings").await;

        store.put("1447_رجب", &booking("رجب", "أبو سلطان")).await.unwrap();
        store.put("1447_رجب", &booking("رجب", "أبو ثامر")).await.unwrap();

        let all = store.fetch_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].host, "أبو ثامر");
    }

    #[tokio::test]
    async fn it_scopes_documents_to_the_collection() {
        let db = Connection::open_in_memory().await.unwrap();
        let a = SqliteStore::open(db.clone(), "artifacts/a/public/data/bookings")
            .await
            .unwrap();
        let b = SqliteStore::open(db, "artifacts/b/public/data/bookings")
            .await
            .unwrap();

        a.put("1447_صفر", &booking("صفر", "أم فهد")).await.unwrap();

        assert_eq!(a.fetch_all().await.unwrap().len(), 1);
        assert!(b.fetch_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn it_streams_a_snapshot_per_change() {
        let store = test_store("artifacts/test/public/data/bookings").await;
        let mut changes = store.changes();

        let first = changes.next().await.unwrap().unwrap();
        assert!(first.is_empty());

        store.put("1447_محرم", &booking("محرم", "أبو فارس")).await.unwrap();

        let second = changes.next().await.unwrap().unwrap();
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].month, "محرم");
    }
}
