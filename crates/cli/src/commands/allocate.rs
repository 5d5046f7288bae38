//! `seatplan allocate` — seat an event's guests.

use super::{open_store, read_guest_file};
use seatplan_config::AppConfig;
use seatplan_core::plan::{AllocationRequest, AllocationSummary};
use seatplan_core::store::GuestStore;
use seatplan_engine::{PlanOutcome, SeatingEngine, SeededShuffler};
use seatplan_store::InMemoryGuestStore;
use std::path::PathBuf;
use std::sync::Arc;

pub struct AllocateArgs {
    pub event: String,
    pub tables: Option<i64>,
    pub seats: Option<i64>,
    pub dry_run: bool,
    pub seed: Option<u64>,
    pub guests: Option<PathBuf>,
    pub json: bool,
}

pub async fn run(args: AllocateArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    let store: Arc<dyn GuestStore> = match &args.guests {
        Some(path) => Arc::new(InMemoryGuestStore::with_guests(
            &args.event,
            read_guest_file(path)?,
        )),
        None => open_store(&config).await?,
    };

    let mut engine = SeatingEngine::new(store)
        .serialize_per_event(config.allocation.serialize_per_event);
    if let Some(seed) = args.seed {
        engine = engine.with_shuffler(Arc::new(SeededShuffler::new(seed)));
    }

    let num_tables = args
        .tables
        .unwrap_or_else(|| i64::from(config.allocation.default_num_tables));
    let seats = args
        .seats
        .unwrap_or_else(|| i64::from(config.allocation.default_seats_per_table));

    if args.dry_run {
        let outcome = engine
            .plan_tables(&AllocationRequest::new(&args.event, num_tables, seats))
            .await?;
        if args.json {
            println!("{}", serde_json::to_string_pretty(&preview_json(&outcome))?);
        } else {
            print_plan(&outcome);
            print_summary(&outcome.summary, true);
        }
        return Ok(());
    }

    let summary = engine.allocate_tables(&args.event, num_tables, seats).await?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary, false);
    }
    Ok(())
}

/// Dry-run output for `--json`: the plan alongside the summary it yields.
fn preview_json(outcome: &PlanOutcome) -> serde_json::Value {
    serde_json::json!({
        "plan": outcome.plan,
        "summary": outcome.summary,
    })
}

fn print_plan(outcome: &PlanOutcome) {
    println!("🪑 Seating plan for {}", outcome.summary.event_id);
    println!("─────────────────────────────────────");
    for block in outcome.plan.blocks() {
        println!(
            "  {:<18} tables {:>3}–{:<3} ({} guests)",
            block.group.to_string(),
            block.first_table,
            block.last_table(),
            block.guest_count
        );
    }
    let tables = outcome.plan.tables();
    if !tables.is_empty() {
        println!();
    }
    for (table, guests) in &tables {
        println!("  Table {table:>3}: {}", guests.join(", "));
    }
    let cleared: Vec<&str> = outcome.plan.clears().collect();
    if !cleared.is_empty() {
        println!();
        println!("  Cleared: {}", cleared.join(", "));
    }
    println!();
}

fn print_summary(summary: &AllocationSummary, dry_run: bool) {
    let heading = if dry_run { "📋 Allocation preview (nothing written)" } else { "✅ Allocation committed" };
    println!("{heading}");
    println!("─────────────────────────────────────");
    println!("  Event:            {}", summary.event_id);
    println!("  Seated:           {}", summary.assigned_count);
    println!("  Cleared:          {}", summary.unassigned_count);
    println!("  Skipped (VIP):    {}", summary.skipped_vip_count);
    println!("  Skipped (no RSVP): {}", summary.skipped_no_rsvp_count);
    println!("  Seats per table:  {}", summary.seats_per_table);
    if summary.tables_auto_adjusted {
        println!(
            "  Tables:           {} (requested {}, raised to fit)",
            summary.num_tables_used, summary.num_tables_requested
        );
    } else {
        println!("  Tables:           {}", summary.num_tables_used);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seatplan_core::guest::Guest;
    use seatplan_engine::IdentityShuffler;

    #[tokio::test]
    async fn dry_run_json_carries_plan_and_summary() {
        let store = Arc::new(InMemoryGuestStore::with_guests(
            "gala",
            vec![
                Guest::new("a").attr("Zusage", true),
                Guest::new("b").at_table(7),
            ],
        ));
        let outcome = SeatingEngine::new(store)
            .with_shuffler(Arc::new(IdentityShuffler))
            .plan_tables(&AllocationRequest::new("gala", 1, 4))
            .await
            .unwrap();

        let json = preview_json(&outcome);
        assert_eq!(json["summary"]["assignedCount"], 1);
        assert_eq!(json["summary"]["unassignedCount"], 1);
        assert_eq!(json["summary"]["eventId"], "gala");
        assert!(json["plan"].is_object());
    }
}
