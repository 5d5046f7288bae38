//! Numbering tables for one partition.
//!
//! Seating is deliberately random: every run reshuffles each partition
//! before numbering, so running the engine twice gives the same set of
//! seated guests but different table numbers. The permutation source is
//! injected through [`Shuffler`] so tests and reproducible runs can pin it.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use seatplan_core::guest::GuestId;
use std::num::NonZeroU32;
use std::sync::{Mutex, PoisonError};

/// Source of random permutations.
pub trait Shuffler: Send + Sync {
    fn shuffle(&self, ids: &mut [GuestId]);
}

/// Uniform Fisher–Yates shuffle on the thread-local RNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRngShuffler;

impl Shuffler for ThreadRngShuffler {
    fn shuffle(&self, ids: &mut [GuestId]) {
        ids.shuffle(&mut rand::rng());
    }
}

/// Reproducible shuffles from a fixed seed.
#[derive(Debug)]
pub struct SeededShuffler {
    rng: Mutex<StdRng>,
}

impl SeededShuffler {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Shuffler for SeededShuffler {
    fn shuffle(&self, ids: &mut [GuestId]) {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        ids.shuffle(&mut *rng);
    }
}

/// Leaves the order untouched.
#[derive(Debug, Default, Clone, Copy)]
pub struct IdentityShuffler;

impl Shuffler for IdentityShuffler {
    fn shuffle(&self, _ids: &mut [GuestId]) {}
}

/// Table numbers handed to one partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableAllocation {
    /// Guest → table, in seating order.
    pub seats: Vec<(GuestId, u32)>,
    /// First table of the block (meaningless when `table_count == 0`).
    pub first_table: u32,
    pub table_count: u32,
    /// Offset for the next partition.
    pub next_offset: u32,
}

/// Fills tables of a fixed capacity in order.
#[derive(Debug, Clone, Copy)]
pub struct TableAllocator {
    seats_per_table: NonZeroU32,
}

impl TableAllocator {
    pub fn new(seats_per_table: NonZeroU32) -> Self {
        Self { seats_per_table }
    }

    /// Number tables `offset + 1 ..= offset + ceil(n / seats)` for
    /// already-shuffled `members`. Every table but the last is full.
    pub fn allocate(&self, members: Vec<GuestId>, offset: u32) -> TableAllocation {
        let seats = self.seats_per_table.get() as usize;
        let table_count = members.len().div_ceil(seats) as u32;

        let seats_out = members
            .into_iter()
            .enumerate()
            .map(|(i, id)| (id, offset + (i / seats) as u32 + 1))
            .collect();

        TableAllocation {
            seats: seats_out,
            first_table: offset + 1,
            table_count,
            next_offset: offset + table_count,
        }
    }

    /// Shuffle, then number.
    pub fn shuffle_and_allocate(
        &self,
        shuffler: &dyn Shuffler,
        mut members: Vec<GuestId>,
        offset: u32,
    ) -> TableAllocation {
        shuffler.shuffle(&mut members);
        self.allocate(members, offset)
    }
}
