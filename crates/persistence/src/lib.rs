#![deny(warnings)]

//! Persistence layer: save records, offline catch-up and SQLite slots.
//!
//! Every load path (stored slot, raw JSON, imported text) goes through
//! [`merge_load`], so offline progress is applied exactly once per load.

pub mod codec;
pub mod offline;
pub mod store;

use serde_json::Value;
use sim_core::{GameState, Millis};

pub use codec::{export_text, to_json, to_record, CodecError};
pub use offline::{apply_offline_progress, OfflineReport};
pub use sqlx::sqlite::SqlitePool;
pub use store::{
    create_save, default_sqlite_url, delete_slot, init_db, list_slots, read_slot, write_slot,
    StoreError,
};

/// Merges a record over fresh defaults, then credits the time since its
/// `lastTick`.
pub fn merge_load(record: &Value, now: Millis) -> Result<(GameState, OfflineReport), CodecError> {
    let mut state = codec::merge_record(record, now)?;
    let report = apply_offline_progress(&mut state, now);
    Ok((state, report))
}

pub fn load_json(json: &str, now: Millis) -> Result<(GameState, OfflineReport), CodecError> {
    merge_load(&codec::parse_json(json)?, now)
}

/// Loads exported text. On error nothing is produced, so callers keep
/// their current state.
pub fn import_text(text: &str, now: Millis) -> Result<(GameState, OfflineReport), CodecError> {
    merge_load(&codec::decode_text(text)?, now)
}
