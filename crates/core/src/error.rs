//! Error types for the seatplan domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use thiserror::Error;

/// The top-level error type for all seatplan operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Request validation ---
    #[error("Invalid allocation request: {0}")]
    Validation(#[from] ValidationError),

    // --- Guest store ---
    #[error("Failed to load guests: {0}")]
    StoreRead(StoreError),

    #[error("Failed to commit table assignments: {0}")]
    StoreWrite(StoreError),
}

/// Coarse classification of an [`Error`], for callers that only need to
/// decide between "fix the input" and "retry later".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InputValidation,
    StoreRead,
    StoreWrite,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Validation(_) => ErrorKind::InputValidation,
            Error::StoreRead(_) => ErrorKind::StoreRead,
            Error::StoreWrite(_) => ErrorKind::StoreWrite,
        }
    }

    /// True when re-running the whole allocation may succeed without
    /// changing the request.
    pub fn is_retryable(&self) -> bool {
        matches!(self.kind(), ErrorKind::StoreRead | ErrorKind::StoreWrite)
    }
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("event id must not be empty")]
    MissingEventId,

    #[error("num_tables must be at least 1 (got {0})")]
    InvalidNumTables(i64),

    #[error("seats_per_table must be at least 1 (got {0})")]
    InvalidSeatsPerTable(i64),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Guest store unavailable: {0}")]
    Unavailable(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Transaction aborted: {0}")]
    TransactionFailed(String),

    #[error("Unknown guest {guest_id} for event {event_id}")]
    UnknownGuest { event_id: String, guest_id: String },

    #[error("Migration failed: {0}")]
    MigrationFailed(String),
}
