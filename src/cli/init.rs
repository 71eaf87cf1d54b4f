use anyhow::Result;
use std::fs;

use crate::core::db::{async_db, initialize_db};
use crate::core::{AppConfig, StoreBackend};

pub async fn run(config: &AppConfig) -> Result<()> {
    if config.store_backend != StoreBackend::Sqlite {
        println!(
            "Nothing to initialize for the {} store, bookings live remotely",
            config.store_backend
        );
        return Ok(());
    }

    println!("Initializing db...");
    fs::create_dir_all(&config.db_path)?;
    let db = async_db(&config.db_path).await?;
    db.call(|conn| {
        initialize_db(conn)?;
        Ok(())
    })
    .await?;
    println!("Finished initializing db at {}", config.db_path);

    Ok(())
}
