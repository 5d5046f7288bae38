//! # seatplan core
//!
//! Domain types, traits, and error definitions for the banquet seating
//! engine. This crate has no storage or runtime dependencies; it defines
//! the model that the store, engine and CLI crates implement against.
//!
//! ## Design Philosophy
//!
//! The guest store is defined as a trait here. Implementations live in
//! `seatplan-store`. This enables:
//! - Swapping storage via configuration
//! - Easy testing with in-memory or failing stores
//! - Clean dependency graph (all crates depend inward on core)

pub mod error;
pub mod guest;
pub mod plan;
pub mod store;

// Re-export key types at crate root for ergonomics
pub use error::{Error, ErrorKind, Result, StoreError, ValidationError};
pub use guest::{AttributeBag, AttributeValue, Guest, GuestId};
pub use plan::{
    AllocationPlan, AllocationRequest, AllocationSummary, ColorTag, PartitionKey, SeatingGroup,
    TableBlock, TableWrite,
};
pub use store::GuestStore;
