//! `seatplan guests` — list an event's guests.

use super::open_store;
use seatplan_config::AppConfig;
use seatplan_core::store::GuestStore;
use seatplan_engine::GuestFacts;

pub async fn run(event: &str) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let store = open_store(&config).await?;
    let mut guests = store.list_guests_by_event(event).await?;
    guests.sort_by_key(|g| (g.table_number.unwrap_or(u32::MAX), g.id.clone()));

    println!("{:<38} {:>6} {:>5} {:>5} {:>6} {:>6}", "Guest", "Table", "VIP", "RSVP", "Press", "Block");
    for guest in &guests {
        let facts = GuestFacts::read(guest);
        let table = guest
            .table_number
            .map(|t| t.to_string())
            .unwrap_or_else(|| "-".into());
        let block = format!(
            "{}{}",
            if facts.is_female { "F" } else { "M" },
            facts.color.as_str()
        );
        println!(
            "{:<38} {:>6} {:>5} {:>5} {:>6} {:>6}",
            guest.id,
            table,
            yes_no(facts.is_vip),
            yes_no(facts.has_rsvp),
            yes_no(facts.is_press),
            block
        );
    }
    println!();
    println!("  {} guests", guests.len());
    Ok(())
}

fn yes_no(b: bool) -> &'static str {
    if b { "yes" } else { "no" }
}
