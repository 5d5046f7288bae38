//! Grouping general guests by (gender, colour tag).

use crate::eligibility::Classified;
use seatplan_core::guest::GuestId;
use seatplan_core::plan::PartitionKey;
use std::collections::HashMap;

/// One non-empty general partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    pub key: PartitionKey,
    pub members: Vec<GuestId>,
}

/// Group guests into partitions, returned in [`PartitionKey::ORDER`].
///
/// Empty partitions are left out so they consume no table numbers.
/// Members keep their input order; shuffling is the allocator's job.
pub fn partition(general: &[Classified<'_>]) -> Vec<Partition> {
    let mut buckets: HashMap<PartitionKey, Vec<GuestId>> = HashMap::new();
    for entry in general {
        let key = PartitionKey::new(entry.facts.is_female, entry.facts.color);
        buckets.entry(key).or_default().push(entry.guest.id.clone());
    }

    PartitionKey::ORDER
        .iter()
        .filter_map(|key| {
            buckets.remove(key).map(|members| Partition {
                key: *key,
                members,
            })
        })
        .collect()
}
