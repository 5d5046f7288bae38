pub mod allocate;
pub mod guests;
pub mod import;
pub mod init;

use seatplan_config::AppConfig;
use seatplan_core::guest::Guest;
use seatplan_core::store::GuestStore;
use seatplan_store::SqliteGuestStore;
use std::path::Path;
use std::sync::Arc;

/// Open the guest store named in the config.
///
/// The `in_memory` backend is refused: every command runs in a fresh
/// process, so an import would vanish and `allocate` would see no guests.
/// Use `allocate --dry-run --guests <file>` for a throwaway run.
pub async fn open_store(config: &AppConfig) -> Result<Arc<dyn GuestStore>, Box<dyn std::error::Error>> {
    match config.store.backend.as_str() {
        "in_memory" => Err("the in_memory store does not persist between commands; \
             set store.backend = \"sqlite\" or use `allocate --dry-run --guests <file>`"
            .into()),
        _ => {
            let path = config.store.database_path();
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let store = SqliteGuestStore::connect(
                &format!("sqlite://{}", path.display()),
                config.store.max_connections,
                config.store.busy_timeout(),
            )
            .await?;
            Ok(Arc::new(store))
        }
    }
}

/// Read a JSON array of guests. Entries without an `id` get a fresh one.
pub fn read_guest_file(path: &Path) -> Result<Vec<Guest>, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    parse_guests(&content)
}

fn parse_guests(content: &str) -> Result<Vec<Guest>, Box<dyn std::error::Error>> {
    let raw: Vec<serde_json::Value> = serde_json::from_str(content)?;
    raw.into_iter()
        .map(|mut value| {
            if let Some(obj) = value.as_object_mut() {
                let has_id = obj.get("id").and_then(|v| v.as_str()).is_some_and(|s| !s.is_empty());
                if !has_id {
                    obj.insert("id".into(), uuid::Uuid::new_v4().to_string().into());
                }
            }
            serde_json::from_value::<Guest>(value).map_err(Into::into)
        })
        .collect()
}
