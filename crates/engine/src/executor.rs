//! Committing a plan to the guest store.

use seatplan_core::error::{Error, Result};
use seatplan_core::plan::AllocationPlan;
use seatplan_core::store::GuestStore;
use tracing::{debug, warn};

/// Applies a plan as a single all-or-nothing batch.
pub struct AssignmentExecutor<'a> {
    store: &'a dyn GuestStore,
}

impl<'a> AssignmentExecutor<'a> {
    pub fn new(store: &'a dyn GuestStore) -> Self {
        Self { store }
    }

    pub async fn execute(&self, event_id: &str, plan: &AllocationPlan) -> Result<()> {
        if plan.is_empty() {
            debug!(event_id, "Empty plan, nothing to commit");
            return Ok(());
        }

        let writes = plan.writes();
        self.store
            .batch_set_table_numbers(event_id, &writes)
            .await
            .map_err(|e| {
                warn!(event_id, store = self.store.name(), "Table-number batch failed: {e}");
                Error::StoreWrite(e)
            })?;

        debug!(event_id, writes = writes.len(), "Plan committed");
        Ok(())
    }
}
