//! Guest store implementations for seatplan.

pub mod in_memory;

#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use in_memory::InMemoryGuestStore;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteGuestStore;
