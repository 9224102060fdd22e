//! Named save slots in a local SQLite database.

use std::path::Path;
use std::str::FromStr;

use sim_core::Millis;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
    #[error("cannot prepare database directory: {0}")]
    Io(#[from] std::io::Error),
}

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS saves (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    slot TEXT NOT NULL UNIQUE,
    note TEXT,
    payload TEXT,
    saved_at INTEGER NOT NULL DEFAULT 0
)";

/// Returns the default SQLite URL used for local saves.
pub fn default_sqlite_url() -> &'static str {
    "sqlite://./saves/main.db"
}

/// Opens (creating if needed) the database at `url` and applies the schema.
pub async fn init_db(url: &str) -> Result<SqlitePool, StoreError> {
    let path = url
        .strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))
        .filter(|p| !p.starts_with(":memory:"));
    if let Some(parent) = path.and_then(|p| Path::new(p).parent()) {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }
    let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
    // One connection keeps an in-memory database alive and shared.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;
    sqlx::query(SCHEMA).execute(&pool).await?;
    debug!(url, "save database ready");
    Ok(pool)
}

/// Ensures an (empty) slot exists and returns its row id.
pub async fn create_save(
    pool: &SqlitePool,
    slot: &str,
    note: Option<&str>,
) -> Result<i64, StoreError> {
    sqlx::query("INSERT OR IGNORE INTO saves (slot, note) VALUES (?1, ?2)")
        .bind(slot)
        .bind(note)
        .execute(pool)
        .await?;
    let row = sqlx::query("SELECT id FROM saves WHERE slot = ?1")
        .bind(slot)
        .fetch_one(pool)
        .await?;
    Ok(row.try_get("id")?)
}

/// Replaces the record stored in `slot`.
pub async fn write_slot(
    pool: &SqlitePool,
    slot: &str,
    payload: &str,
    saved_at: Millis,
) -> Result<(), StoreError> {
    sqlx::query(
        "INSERT INTO saves (slot, payload, saved_at) VALUES (?1, ?2, ?3)
         ON CONFLICT(slot) DO UPDATE SET payload = excluded.payload, saved_at = excluded.saved_at",
    )
    .bind(slot)
    .bind(payload)
    .bind(saved_at)
    .execute(pool)
    .await?;
    debug!(slot, bytes = payload.len(), "slot written");
    Ok(())
}

/// The record in `slot`, or `None` when the slot is missing or empty.
pub async fn read_slot(pool: &SqlitePool, slot: &str) -> Result<Option<String>, StoreError> {
    let row = sqlx::query("SELECT payload FROM saves WHERE slot = ?1")
        .bind(slot)
        .fetch_optional(pool)
        .await?;
    match row {
        Some(row) => Ok(row.try_get::<Option<String>, _>("payload")?),
        None => Ok(None),
    }
}

pub async fn delete_slot(pool: &SqlitePool, slot: &str) -> Result<bool, StoreError> {
    let done = sqlx::query("DELETE FROM saves WHERE slot = ?1")
        .bind(slot)
        .execute(pool)
        .await?;
    Ok(done.rows_affected() > 0)
}

/// Slot names with their last save time, ordered by name.
pub async fn list_slots(pool: &SqlitePool) -> Result<Vec<(String, Millis)>, StoreError> {
    let rows = sqlx::query("SELECT slot, saved_at FROM saves ORDER BY slot")
        .fetch_all(pool)
        .await?;
    rows.iter()
        .map(|r| -> Result<(String, Millis), StoreError> {
            Ok((r.try_get("slot")?, r.try_get("saved_at")?))
        })
        .collect()
}
