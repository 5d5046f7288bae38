//! `seatplan import` — load guests for an event.

use super::{open_store, read_guest_file};
use seatplan_config::AppConfig;
use seatplan_core::store::GuestStore;
use std::path::Path;

pub async fn run(event: &str, file: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let guests = read_guest_file(file)?;
    let store = open_store(&config).await?;

    let count = guests.len();
    for guest in guests {
        store.upsert_guest(event, guest).await?;
    }

    tracing::info!(event, count, store = store.name(), "Imported guests");
    println!("✅ Imported {count} guests into event {event}");
    Ok(())
}
