//! In-memory guest store — useful for testing and ephemeral runs.

use async_trait::async_trait;
use seatplan_core::error::StoreError;
use seatplan_core::guest::Guest;
use seatplan_core::plan::TableWrite;
use seatplan_core::store::GuestStore;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::RwLock;

/// An in-memory store keyed by event id.
///
/// Reads and writes can be made to fail on demand so callers can exercise
/// their error paths.
pub struct InMemoryGuestStore {
    events: Arc<RwLock<HashMap<String, Vec<Guest>>>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    reads: AtomicUsize,
    batches: AtomicUsize,
}

impl InMemoryGuestStore {
    pub fn new() -> Self {
        Self {
            events: Arc::new(RwLock::new(HashMap::new())),
            fail_reads: AtomicBool::new(false),
            fail_writes: AtomicBool::new(false),
            reads: AtomicUsize::new(0),
            batches: AtomicUsize::new(0),
        }
    }

    /// Seed a store with the guests of one event.
    pub fn with_guests(event_id: &str, guests: Vec<Guest>) -> Self {
        let mut events = HashMap::new();
        events.insert(event_id.to_string(), guests);
        Self {
            events: Arc::new(RwLock::new(events)),
            ..Self::new()
        }
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of `list_guests_by_event` calls served so far.
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Number of committed batches so far.
    pub fn batch_count(&self) -> usize {
        self.batches.load(Ordering::SeqCst)
    }

    /// Snapshot of an event's guests.
    pub async fn guests(&self, event_id: &str) -> Vec<Guest> {
        self.events
            .read()
            .await
            .get(event_id)
            .cloned()
            .unwrap_or_default()
    }
}

impl Default for InMemoryGuestStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GuestStore for InMemoryGuestStore {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn list_guests_by_event(&self, event_id: &str) -> Result<Vec<Guest>, StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("in-memory store is offline".into()));
        }
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.guests(event_id).await)
    }

    async fn batch_set_table_numbers(
        &self,
        event_id: &str,
        writes: &[TableWrite],
    ) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::TransactionFailed(
                "in-memory store rejected the batch".into(),
            ));
        }

        // Held for the whole batch so readers never see half of it.
        let mut events = self.events.write().await;
        let guests = events.entry(event_id.to_string()).or_default();

        let mut positions = Vec::with_capacity(writes.len());
        for write in writes {
            let pos = guests
                .iter()
                .position(|g| g.id == write.guest_id)
                .ok_or_else(|| StoreError::UnknownGuest {
                    event_id: event_id.to_string(),
                    guest_id: write.guest_id.clone(),
                })?;
            positions.push(pos);
        }

        for (pos, write) in positions.into_iter().zip(writes) {
            guests[pos].table_number = write.table_number;
        }
        self.batches.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn upsert_guest(&self, event_id: &str, guest: Guest) -> Result<(), StoreError> {
        let mut events = self.events.write().await;
        let guests = events.entry(event_id.to_string()).or_default();
        match guests.iter_mut().find(|g| g.id == guest.id) {
            Some(existing) => *existing = guest,
            None => guests.push(guest),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(id: &str, table: Option<u32>) -> TableWrite {
        TableWrite {
            guest_id: id.into(),
            table_number: table,
        }
    }

    #[tokio::test]
    async fn upsert_and_list() {
        let store = InMemoryGuestStore::new();
        store.upsert_guest("gala", Guest::new("a")).await.unwrap();
        store.upsert_guest("gala", Guest::new("b")).await.unwrap();
        store
            .upsert_guest("gala", Guest::new("a").vip(true))
            .await
            .unwrap();
        store.upsert_guest("other", Guest::new("c")).await.unwrap();

        let guests = store.list_guests_by_event("gala").await.unwrap();
        assert_eq!(guests.len(), 2);
        assert!(guests.iter().any(|g| g.id == "a" && g.is_vip));
        assert!(store.list_guests_by_event("nope").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn batch_applies_assignments_and_clears() {
        let store = InMemoryGuestStore::with_guests(
            "gala",
            vec![Guest::new("a"), Guest::new("b").at_table(9)],
        );
        store
            .batch_set_table_numbers("gala", &[write("a", Some(1)), write("b", None)])
            .await
            .unwrap();

        let guests = store.guests("gala").await;
        assert_eq!(guests[0].table_number, Some(1));
        assert_eq!(guests[1].table_number, None);
        assert_eq!(store.batch_count(), 1);
    }

    #[tokio::test]
    async fn unknown_guest_aborts_whole_batch() {
        let store = InMemoryGuestStore::with_guests("gala", vec![Guest::new("a")]);
        let err = store
            .batch_set_table_numbers("gala", &[write("a", Some(1)), write("ghost", Some(2))])
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::UnknownGuest { .. }));
        assert_eq!(store.guests("gala").await[0].table_number, None);
        assert_eq!(store.batch_count(), 0);
    }

    #[tokio::test]
    async fn injected_failures() {
        let store = InMemoryGuestStore::with_guests("gala", vec![Guest::new("a")]);
        store.fail_reads(true);
        assert!(store.list_guests_by_event("gala").await.is_err());
        store.fail_reads(false);
        store.fail_writes(true);
        assert!(
            store
                .batch_set_table_numbers("gala", &[write("a", Some(1))])
                .await
                .is_err()
        );
        assert_eq!(store.guests("gala").await[0].table_number, None);
    }
}
