//! Local sqlite database used by the embedded document store

use anyhow::Result;
use rusqlite::Connection as SyncConnection;
use tokio_rusqlite::Connection;

const DB_FILE_NAME: &str = "dawriya.sqlite3";

/// Open (creating if needed) the sqlite database inside `db_path`.
pub async fn async_db(db_path: &str) -> Result<Connection> {
    let path = format!("{}/{}", db_path.trim_end_matches('/'), DB_FILE_NAME);
    let db = Connection::open(path).await?;
    db.call(|conn| {
        conn.pragma_update(None, "journal_mode", "WAL")?;
        Ok(())
    })
    .await?;
    Ok(db)
}

pub fn initialize_db(conn: &mut SyncConnection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        r"
        BEGIN;
        CREATE TABLE IF NOT EXISTS document (
            collection TEXT NOT NULL,
            id TEXT NOT NULL,
            data TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            PRIMARY KEY (collection, id)
        );
        COMMIT;
        ",
    )
}
