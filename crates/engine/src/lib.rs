//! Banquet seating allocation engine.
//!
//! Given an event's guests, the engine seats every non-VIP guest who has
//! RSVP'd: press guests first at their own tables, then everyone else in
//! blocks keyed by gender and table colour. Guests who are no longer
//! eligible get their table number cleared. The whole plan is committed as
//! one transaction.
//!
//! Runs are not reproducible: each partition is reshuffled every time.
//! Inject a [`SeededShuffler`] or [`IdentityShuffler`] when that matters.

pub mod allocator;
pub mod attributes;
pub mod eligibility;
pub mod executor;
pub mod partition;
pub mod planner;

pub use allocator::{IdentityShuffler, SeededShuffler, Shuffler, TableAllocator, ThreadRngShuffler};
pub use attributes::GuestFacts;
pub use executor::AssignmentExecutor;
pub use planner::{AssignmentPlanner, PlanOutcome, ValidatedRequest, validate};

use seatplan_core::error::Result;
use seatplan_core::plan::{AllocationRequest, AllocationSummary};
use seatplan_core::store::GuestStore;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{info, instrument};

/// Entry point for allocation runs against one guest store.
pub struct SeatingEngine {
    store: Arc<dyn GuestStore>,
    shuffler: Arc<dyn Shuffler>,
    event_locks: Option<Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>>,
}

impl SeatingEngine {
    pub fn new(store: Arc<dyn GuestStore>) -> Self {
        Self {
            store,
            shuffler: Arc::new(ThreadRngShuffler),
            event_locks: Some(Mutex::new(HashMap::new())),
        }
    }

    pub fn with_shuffler(mut self, shuffler: Arc<dyn Shuffler>) -> Self {
        self.shuffler = shuffler;
        self
    }

    /// When enabled (the default), concurrent runs for the same event on
    /// this engine wait for each other. The lock is held from the guest read
    /// through the commit, so a slow store stalls every queued run for that
    /// event; other events are unaffected.
    ///
    /// When disabled, runs interleave freely. Each commit is still one
    /// atomic batch, so the stored seating always equals exactly one run's
    /// plan, and the last commit wins. Runs from other processes are never
    /// coordinated.
    pub fn serialize_per_event(mut self, enabled: bool) -> Self {
        self.event_locks = enabled.then(|| Mutex::new(HashMap::new()));
        self
    }

    /// Compute the plan without writing anything.
    pub async fn plan_tables(&self, request: &AllocationRequest) -> Result<PlanOutcome> {
        let validated = validate(request)?;
        AssignmentPlanner::new(self.shuffler.as_ref())
            .plan(self.store.as_ref(), &validated)
            .await
    }

    /// Seat an event's guests and commit the result.
    #[instrument(skip(self), fields(store = self.store.name()))]
    pub async fn allocate_tables(
        &self,
        event_id: &str,
        num_tables: i64,
        seats_per_table: i64,
    ) -> Result<AllocationSummary> {
        let request = AllocationRequest::new(event_id, num_tables, seats_per_table);
        let validated = validate(&request)?;

        let Some(event_lock) = self.event_lock(&validated.event_id) else {
            return self.plan_and_commit(&validated).await;
        };
        let result = {
            let _guard = event_lock.lock().await;
            self.plan_and_commit(&validated).await
        };
        self.release_event_lock(&validated.event_id, event_lock);
        result
    }

    async fn plan_and_commit(&self, validated: &ValidatedRequest) -> Result<AllocationSummary> {
        let outcome = AssignmentPlanner::new(self.shuffler.as_ref())
            .plan(self.store.as_ref(), validated)
            .await?;
        AssignmentExecutor::new(self.store.as_ref())
            .execute(&validated.event_id, &outcome.plan)
            .await?;

        info!(
            assigned = outcome.summary.assigned_count,
            tables = outcome.summary.num_tables_used,
            "Seating committed"
        );
        Ok(outcome.summary)
    }

    fn event_lock(&self, event_id: &str) -> Option<Arc<tokio::sync::Mutex<()>>> {
        let locks = self.event_locks.as_ref()?;
        let mut locks = locks.lock().unwrap_or_else(PoisonError::into_inner);
        Some(locks.entry(event_id.to_string()).or_default().clone())
    }

    /// Drops the map entry once no other run holds or waits on it.
    fn release_event_lock(&self, event_id: &str, lock: Arc<tokio::sync::Mutex<()>>) {
        let Some(locks) = self.event_locks.as_ref() else {
            return;
        };
        let mut locks = locks.lock().unwrap_or_else(PoisonError::into_inner);
        // One reference in the map, one here.
        if Arc::strong_count(&lock) == 2 {
            locks.remove(event_id);
        }
    }

    #[cfg(test)]
    fn tracked_events(&self) -> usize {
        self.event_locks
            .as_ref()
            .map_or(0, |locks| locks.lock().unwrap_or_else(PoisonError::into_inner).len())
    }
}
