//! SQLite guest store.
//!
//! Uses a single `guests` table keyed by `(event_id, id)`. The attribute bag
//! is stored as JSON text exactly as it was imported; interpretation is left
//! to the engine. Table-number batches run inside one transaction.

use async_trait::async_trait;
use seatplan_core::error::StoreError;
use seatplan_core::guest::{AttributeBag, Guest};
use seatplan_core::plan::TableWrite;
use seatplan_core::store::GuestStore;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info, warn};

const DEFAULT_MAX_CONNECTIONS: u32 = 4;
const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// A SQLite-backed guest store.
pub struct SqliteGuestStore {
    pool: SqlitePool,
}

impl SqliteGuestStore {
    /// Open (or create) a store at `path` with default pool settings.
    pub async fn new(path: &str) -> Result<Self, StoreError> {
        Self::connect(path, DEFAULT_MAX_CONNECTIONS, DEFAULT_BUSY_TIMEOUT).await
    }

    /// Open (or create) a store at `path`.
    ///
    /// `busy_timeout` bounds how long a write transaction waits on a locked
    /// database before failing. An in-process `:memory:` database is limited
    /// to a single connection so every query sees the same data.
    pub async fn connect(
        path: &str,
        max_connections: u32,
        busy_timeout: Duration,
    ) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(path)
            .map_err(|e| StoreError::Unavailable(format!("Invalid SQLite path: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(busy_timeout);

        let max_connections = if path.contains(":memory:") {
            1
        } else {
            max_connections.max(1)
        };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .map_err(|e| StoreError::Unavailable(format!("Failed to open SQLite: {e}")))?;

        let store = Self { pool };
        store.run_migrations().await?;
        info!("SQLite guest store initialized at {path}");
        Ok(store)
    }

    async fn run_migrations(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS guests (
                event_id     TEXT NOT NULL,
                id           TEXT NOT NULL,
                is_vip       INTEGER NOT NULL DEFAULT 0,
                attributes   TEXT NOT NULL DEFAULT '{}',
                table_number INTEGER,
                PRIMARY KEY (event_id, id)
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::MigrationFailed(format!("guests table: {e}")))?;

        debug!("SQLite migrations complete");
        Ok(())
    }

    fn row_to_guest(row: &sqlx::sqlite::SqliteRow) -> Result<Guest, StoreError> {
        let id: String = row
            .try_get("id")
            .map_err(|e| StoreError::QueryFailed(format!("id column: {e}")))?;
        let is_vip: bool = row
            .try_get("is_vip")
            .map_err(|e| StoreError::QueryFailed(format!("is_vip column: {e}")))?;
        let attributes: String = row
            .try_get("attributes")
            .map_err(|e| StoreError::QueryFailed(format!("attributes column: {e}")))?;
        let table_number: Option<i64> = row
            .try_get("table_number")
            .map_err(|e| StoreError::QueryFailed(format!("table_number column: {e}")))?;

        // Rows written by other tools may carry junk; treat it as "no table".
        let table_number = table_number.and_then(|t| u32::try_from(t).ok()).filter(|t| *t > 0);

        Ok(Guest {
            id,
            is_vip,
            attributes: AttributeBag::from_json_str(&attributes),
            table_number,
        })
    }
}

#[async_trait]
impl GuestStore for SqliteGuestStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn list_guests_by_event(&self, event_id: &str) -> Result<Vec<Guest>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, is_vip, attributes, table_number FROM guests WHERE event_id = ?1 ORDER BY id",
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::QueryFailed(format!("list guests: {e}")))?;

        rows.iter().map(Self::row_to_guest).collect()
    }

    async fn batch_set_table_numbers(
        &self,
        event_id: &str,
        writes: &[TableWrite],
    ) -> Result<(), StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StoreError::TransactionFailed(format!("BEGIN failed: {e}")))?;

        for write in writes {
            let result =
                sqlx::query("UPDATE guests SET table_number = ?1 WHERE event_id = ?2 AND id = ?3")
                    .bind(write.table_number.map(i64::from))
                    .bind(event_id)
                    .bind(&write.guest_id)
                    .execute(&mut *tx)
                    .await
                    .map_err(|e| StoreError::TransactionFailed(format!("UPDATE failed: {e}")))?;

            if result.rows_affected() == 0 {
                warn!(
                    event_id,
                    guest_id = %write.guest_id,
                    "Guest vanished before commit, rolling back batch"
                );
                if let Err(e) = tx.rollback().await {
                    warn!("Rollback failed: {e}");
                }
                return Err(StoreError::UnknownGuest {
                    event_id: event_id.to_string(),
                    guest_id: write.guest_id.clone(),
                });
            }
        }

        tx.commit()
            .await
            .map_err(|e| StoreError::TransactionFailed(format!("COMMIT failed: {e}")))?;

        debug!(event_id, writes = writes.len(), "Committed table-number batch");
        Ok(())
    }

    async fn upsert_guest(&self, event_id: &str, guest: Guest) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO guests (event_id, id, is_vip, attributes, table_number)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(event_id, id) DO UPDATE SET
                is_vip = excluded.is_vip,
                attributes = excluded.attributes,
                table_number = excluded.table_number
            "#,
        )
        .bind(event_id)
        .bind(&guest.id)
        .bind(guest.is_vip)
        .bind(guest.attributes.to_json_string())
        .bind(guest.table_number.map(i64::from))
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::QueryFailed(format!("INSERT failed: {e}")))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seatplan_core::guest::AttributeValue;

    async fn test_store(dir: &tempfile::TempDir) -> SqliteGuestStore {
        let path = dir.path().join("guests.sqlite");
        SqliteGuestStore::new(&format!("sqlite://{}", path.display()))
            .await
            .unwrap()
    }

    fn write(id: &str, table: Option<u32>) -> TableWrite {
        TableWrite {
            guest_id: id.into(),
            table_number: table,
        }
    }

    #[tokio::test]
    async fn upsert_and_list_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = test_store(&dir).await;
        store
            .upsert_guest(
                "gala",
                Guest::new("a").attr("Zusage", "Ja").attr("Tischfarbe", 2),
            )
            .await
            .unwrap();
        store
            .upsert_guest("gala", Guest::new("b").vip(true).at_table(7))
            .await
            .unwrap();
        store.upsert_guest("brunch", Guest::new("c")).await.unwrap();

        let guests = store.list_guests_by_event("gala").await.unwrap();
        assert_eq!(guests.len(), 2);
        assert_eq!(guests[0].id, "a");
        assert_eq!(
            guests[0].attributes.get("Zusage"),
            Some(&AttributeValue::Text("Ja".into()))
        );
        assert!(guests[1].is_vip);
        assert_eq!(guests[1].table_number, Some(7));
    }

    #[tokio::test]
    async fn batch_commits_assignments_and_clears() {
        let dir = tempfile::tempdir().unwrap();
        let store = test_store(&dir).await;
        store.upsert_guest("gala", Guest::new("a")).await.unwrap();
        store
            .upsert_guest("gala", Guest::new("b").at_table(12))
            .await
            .unwrap();

        store
            .batch_set_table_numbers("gala", &[write("a", Some(3)), write("b", None)])
            .await
            .unwrap();

        let guests = store.list_guests_by_event("gala").await.unwrap();
        assert_eq!(guests[0].table_number, Some(3));
        assert_eq!(guests[1].table_number, None);
    }

    #[tokio::test]
    async fn unknown_guest_rolls_back_batch() {
        let dir = tempfile::tempdir().unwrap();
        let store = test_store(&dir).await;
        store
            .upsert_guest("gala", Guest::new("a").at_table(5))
            .await
            .unwrap();

        let err = store
            .batch_set_table_numbers("gala", &[write("a", Some(1)), write("ghost", Some(1))])
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::UnknownGuest { .. }));

        let guests = store.list_guests_by_event("gala").await.unwrap();
        assert_eq!(guests[0].table_number, Some(5), "first write must be rolled back");
    }

    #[tokio::test]
    async fn writes_are_scoped_to_event() {
        let dir = tempfile::tempdir().unwrap();
        let store = test_store(&dir).await;
        store.upsert_guest("gala", Guest::new("a")).await.unwrap();
        store.upsert_guest("brunch", Guest::new("a")).await.unwrap();

        store
            .batch_set_table_numbers("gala", &[write("a", Some(2))])
            .await
            .unwrap();

        let brunch = store.list_guests_by_event("brunch").await.unwrap();
        assert_eq!(brunch[0].table_number, None);
    }

    #[tokio::test]
    async fn malformed_attribute_text_reads_as_empty_bag() {
        let dir = tempfile::tempdir().unwrap();
        let store = test_store(&dir).await;
        sqlx::query("INSERT INTO guests (event_id, id, attributes) VALUES ('gala', 'x', '{oops')")
            .execute(&store.pool)
            .await
            .unwrap();

        let guests = store.list_guests_by_event("gala").await.unwrap();
        assert!(guests[0].attributes.is_empty());
    }

    #[tokio::test]
    async fn data_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = test_store(&dir).await;
            store
                .upsert_guest("gala", Guest::new("a").at_table(4))
                .await
                .unwrap();
        }
        let store = test_store(&dir).await;
        let guests = store.list_guests_by_event("gala").await.unwrap();
        assert_eq!(guests[0].table_number, Some(4));
    }
}
