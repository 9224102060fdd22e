#![deny(warnings)]

//! Creates the save database and its `default` slot.
//!
//! Usage: `migrate [sqlite-url]`

use persistence::{create_save, default_sqlite_url, init_db, list_slots};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| default_sqlite_url().to_string());
    let pool = init_db(&url).await?;
    let id = create_save(&pool, "default", Some("initialized")).await?;
    println!("DB migrated at {url} (default slot id {id})");
    for (slot, saved_at) in list_slots(&pool).await? {
        println!("  {slot}\tsaved_at={saved_at}");
    }
    Ok(())
}
