//! Guest store trait — the persistence collaborator of the seating engine.
//!
//! The engine only reads guests of one event and writes back the
//! `table_number` field. Everything else about guests (creation, RSVP
//! handling, reporting) belongs to the surrounding application.

use async_trait::async_trait;
use crate::error::StoreError;
use crate::guest::Guest;
use crate::plan::TableWrite;

/// The core GuestStore trait.
///
/// Implementations: SQLite, in-memory (for testing).
#[async_trait]
pub trait GuestStore: Send + Sync {
    /// The backend name (e.g., "sqlite", "in_memory").
    fn name(&self) -> &str;

    /// Load every guest of an event.
    async fn list_guests_by_event(&self, event_id: &str) -> Result<Vec<Guest>, StoreError>;

    /// Apply all table-number writes as one transaction.
    ///
    /// Either every write is applied or none is. Only `table_number` may be
    /// touched; an id that does not belong to the event aborts the batch.
    async fn batch_set_table_numbers(
        &self,
        event_id: &str,
        writes: &[TableWrite],
    ) -> Result<(), StoreError>;

    /// Insert or replace a guest (used for imports and tests).
    async fn upsert_guest(&self, event_id: &str, guest: Guest) -> Result<(), StoreError>;
}
