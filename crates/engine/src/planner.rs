//! Building an allocation plan for one event.
//!
//! Flow: validate → load guests → classify → press tables → general
//! partitions → clears. Nothing here writes to the store; a failure at any
//! step leaves guests untouched.

use crate::allocator::{Shuffler, TableAllocator};
use crate::eligibility::Eligibility;
use crate::partition::partition;
use chrono::Utc;
use seatplan_core::error::{Error, Result, ValidationError};
use seatplan_core::guest::{Guest, GuestId};
use seatplan_core::plan::{
    AllocationPlan, AllocationRequest, AllocationSummary, SeatingGroup, TableBlock,
};
use seatplan_core::store::GuestStore;
use std::collections::HashSet;
use std::num::NonZeroU32;
use tracing::{debug, info};

/// A request that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRequest {
    pub event_id: String,
    pub num_tables: NonZeroU32,
    pub seats_per_table: NonZeroU32,
}

/// Reject requests the engine cannot act on, before any I/O.
pub fn validate(request: &AllocationRequest) -> std::result::Result<ValidatedRequest, ValidationError> {
    if request.event_id.trim().is_empty() {
        return Err(ValidationError::MissingEventId);
    }
    let num_tables = positive(request.num_tables)
        .ok_or(ValidationError::InvalidNumTables(request.num_tables))?;
    let seats_per_table = positive(request.seats_per_table)
        .ok_or(ValidationError::InvalidSeatsPerTable(request.seats_per_table))?;

    Ok(ValidatedRequest {
        event_id: request.event_id.clone(),
        num_tables,
        seats_per_table,
    })
}

fn positive(n: i64) -> Option<NonZeroU32> {
    u32::try_from(n).ok().and_then(NonZeroU32::new)
}

/// Plan plus the summary that will be reported once it is committed.
#[derive(Debug, Clone)]
pub struct PlanOutcome {
    pub plan: AllocationPlan,
    pub summary: AllocationSummary,
}

pub struct AssignmentPlanner<'a> {
    shuffler: &'a dyn Shuffler,
}

impl<'a> AssignmentPlanner<'a> {
    pub fn new(shuffler: &'a dyn Shuffler) -> Self {
        Self { shuffler }
    }

    /// Load the event's guests and plan their seating.
    pub async fn plan(
        &self,
        store: &dyn GuestStore,
        request: &ValidatedRequest,
    ) -> Result<PlanOutcome> {
        let guests = store
            .list_guests_by_event(&request.event_id)
            .await
            .map_err(Error::StoreRead)?;
        debug!(event_id = %request.event_id, guests = guests.len(), "Loaded guests");

        Ok(self.build(request, &guests))
    }

    /// Plan seating for an already loaded guest list.
    pub fn build(&self, request: &ValidatedRequest, guests: &[Guest]) -> PlanOutcome {
        let eligibility = Eligibility::classify(guests);
        let allocator = TableAllocator::new(request.seats_per_table);
        let mut plan = AllocationPlan::new();
        let mut seated: HashSet<&str> = HashSet::with_capacity(eligibility.eligible_count());
        let mut offset = 0u32;

        let press: Vec<GuestId> = eligibility.press.iter().map(|c| c.guest.id.clone()).collect();
        let mut groups = vec![(SeatingGroup::Press, press)];
        groups.extend(
            partition(&eligibility.general)
                .into_iter()
                .map(|p| (SeatingGroup::General(p.key), p.members)),
        );

        for (group, members) in groups {
            if members.is_empty() {
                continue;
            }
            let guest_count = members.len();
            let alloc = allocator.shuffle_and_allocate(self.shuffler, members, offset);
            debug!(
                %group,
                guests = guest_count,
                first_table = alloc.first_table,
                tables = alloc.table_count,
                "Allocated tables"
            );

            for (id, table) in alloc.seats {
                plan.assign(id, table);
            }
            plan.push_block(TableBlock {
                group,
                first_table: alloc.first_table,
                table_count: alloc.table_count,
                guest_count,
            });
            offset = alloc.next_offset;
        }

        for classified in eligibility.press.iter().chain(&eligibility.general) {
            seated.insert(classified.guest.id.as_str());
        }
        for guest in &eligibility.non_vip {
            if !seated.contains(guest.id.as_str()) {
                plan.clear(guest.id.clone());
            }
        }

        let requested = request.num_tables.get();
        let summary = AllocationSummary {
            event_id: request.event_id.clone(),
            assigned_count: plan.assigned_count(),
            num_tables_used: requested.max(offset),
            tables_auto_adjusted: offset > requested,
            unassigned_count: plan.cleared_count(),
            skipped_vip_count: eligibility.skipped_vip,
            skipped_no_rsvp_count: eligibility.skipped_no_rsvp,
            num_tables_requested: requested,
            seats_per_table: request.seats_per_table.get(),
            allocated_at: Utc::now(),
        };

        info!(
            event_id = %summary.event_id,
            assigned = summary.assigned_count,
            cleared = summary.unassigned_count,
            tables = offset,
            auto_adjusted = summary.tables_auto_adjusted,
            "Seating plan ready"
        );

        PlanOutcome { plan, summary }
    }
}
