use anyhow::{Result, anyhow};
use futures_util::StreamExt;

use crate::booking::BookingClient;
use crate::core::db::async_db;
use crate::core::{AppConfig, StoreBackend};
use crate::session::{SessionBootstrapper, identity_provider};
use crate::store::connect_store;

/// Print one snapshot of the active year.
pub async fn run(config: &AppConfig) -> Result<()> {
    let db = match config.store_backend {
        StoreBackend::Sqlite => Some(async_db(&config.db_path).await?),
        StoreBackend::Firestore => None,
    };

    let bootstrapper = SessionBootstrapper::new(identity_provider(config));
    let session = bootstrapper
        .bootstrap(config.initial_auth_token.as_deref())
        .await?;
    let store = connect_store(config, db, &session).await?;
    let client = BookingClient::new(store, session, &config.year);

    // Taking one item and dropping the stream closes the subscription
    let view = client
        .subscribe()
        .next()
        .await
        .ok_or_else(|| anyhow!("Booking feed closed before the first snapshot"))??;

    println!("{} ({} of 12 booked)", view.year, view.booked_count());
    for entry in view.entries() {
        match &entry.booking {
            Some(b) => println!(
                "{:>2}  {}  {} - {} - {}",
                entry.month.calendar_index,
                entry.month.name,
                b.host,
                b.location,
                b.day.label()
            ),
            None => println!(
                "{:>2}  {}  لم يُحجز بعد",
                entry.month.calendar_index, entry.month.name
            ),
        }
    }

    Ok(())
}
