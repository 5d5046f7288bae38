//! Allocation requests, plans and summaries.
//!
//! A plan is the complete pre-commit mapping of guest → table number (or an
//! explicit clear). It is computed fresh on every run and handed to the
//! guest store as one batch of [`TableWrite`]s.

use crate::guest::GuestId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Caller input for one allocation run.
///
/// Counts are signed so that nonsense input (zero, negative) can be
/// reported back verbatim by validation rather than failing to parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationRequest {
    pub event_id: String,
    pub num_tables: i64,
    pub seats_per_table: i64,
}

impl AllocationRequest {
    pub fn new(event_id: impl Into<String>, num_tables: i64, seats_per_table: i64) -> Self {
        Self {
            event_id: event_id.into(),
            num_tables,
            seats_per_table,
        }
    }
}

/// Table colour block. Only `1`..`4` are recognised; anything else is
/// seated in the untagged block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ColorTag {
    #[serde(rename = "")]
    Untagged,
    #[serde(rename = "1")]
    One,
    #[serde(rename = "2")]
    Two,
    #[serde(rename = "3")]
    Three,
    #[serde(rename = "4")]
    Four,
}

impl ColorTag {
    pub fn as_str(self) -> &'static str {
        match self {
            ColorTag::Untagged => "",
            ColorTag::One => "1",
            ColorTag::Two => "2",
            ColorTag::Three => "3",
            ColorTag::Four => "4",
        }
    }

    /// Exact match on the trimmed text; everything else is `Untagged`.
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "1" => ColorTag::One,
            "2" => ColorTag::Two,
            "3" => ColorTag::Three,
            "4" => ColorTag::Four,
            _ => ColorTag::Untagged,
        }
    }
}

/// Key of one general (non-press) seating partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartitionKey {
    pub is_female: bool,
    pub color: ColorTag,
}

impl PartitionKey {
    pub const fn new(is_female: bool, color: ColorTag) -> Self {
        Self { is_female, color }
    }

    /// Table numbers are handed out to partitions in exactly this order:
    /// female before male, then colour blocks `"", 1, 2, 3, 4`.
    pub const ORDER: [PartitionKey; 10] = [
        PartitionKey::new(true, ColorTag::Untagged),
        PartitionKey::new(true, ColorTag::One),
        PartitionKey::new(true, ColorTag::Two),
        PartitionKey::new(true, ColorTag::Three),
        PartitionKey::new(true, ColorTag::Four),
        PartitionKey::new(false, ColorTag::Untagged),
        PartitionKey::new(false, ColorTag::One),
        PartitionKey::new(false, ColorTag::Two),
        PartitionKey::new(false, ColorTag::Three),
        PartitionKey::new(false, ColorTag::Four),
    ];
}

/// The group a block of tables was allocated to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SeatingGroup {
    Press,
    General(PartitionKey),
}

impl fmt::Display for SeatingGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeatingGroup::Press => write!(f, "press"),
            SeatingGroup::General(key) => {
                let gender = if key.is_female { "female" } else { "male" };
                match key.color {
                    ColorTag::Untagged => write!(f, "{gender}"),
                    color => write!(f, "{gender}/colour {}", color.as_str()),
                }
            }
        }
    }
}

/// A contiguous run of tables owned by one group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableBlock {
    pub group: SeatingGroup,
    pub first_table: u32,
    pub table_count: u32,
    pub guest_count: usize,
}

impl TableBlock {
    pub fn last_table(&self) -> u32 {
        self.first_table + self.table_count - 1
    }

    pub fn contains(&self, table_number: u32) -> bool {
        table_number >= self.first_table && table_number <= self.last_table()
    }
}

/// One row of the batch handed to the guest store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableWrite {
    pub guest_id: GuestId,
    pub table_number: Option<u32>,
}

/// Guest → table number (or `None` for an explicit clear).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AllocationPlan {
    entries: BTreeMap<GuestId, Option<u32>>,
    blocks: Vec<TableBlock>,
}

impl AllocationPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn assign(&mut self, guest_id: impl Into<GuestId>, table_number: u32) {
        self.entries.insert(guest_id.into(), Some(table_number));
    }

    pub fn clear(&mut self, guest_id: impl Into<GuestId>) {
        self.entries.insert(guest_id.into(), None);
    }

    pub fn push_block(&mut self, block: TableBlock) {
        self.blocks.push(block);
    }

    /// `None` if the guest is not in the plan at all, `Some(None)` if it
    /// is to be cleared.
    pub fn table_of(&self, guest_id: &str) -> Option<Option<u32>> {
        self.entries.get(guest_id).copied()
    }

    pub fn assignments(&self) -> impl Iterator<Item = (&str, u32)> {
        self.entries
            .iter()
            .filter_map(|(id, table)| table.map(|t| (id.as_str(), t)))
    }

    pub fn clears(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|(_, table)| table.is_none())
            .map(|(id, _)| id.as_str())
    }

    pub fn assigned_count(&self) -> usize {
        self.entries.values().filter(|t| t.is_some()).count()
    }

    pub fn cleared_count(&self) -> usize {
        self.entries.values().filter(|t| t.is_none()).count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Table blocks in allocation order.
    pub fn blocks(&self) -> &[TableBlock] {
        &self.blocks
    }

    /// Highest table number used, 0 if nobody was seated.
    pub fn tables_used(&self) -> u32 {
        self.blocks.last().map(TableBlock::last_table).unwrap_or(0)
    }

    /// Table number → seated guest ids.
    pub fn tables(&self) -> BTreeMap<u32, Vec<GuestId>> {
        let mut tables: BTreeMap<u32, Vec<GuestId>> = BTreeMap::new();
        for (id, table) in self.assignments() {
            tables.entry(table).or_default().push(id.to_string());
        }
        tables
    }

    /// Every write in guest-id order.
    pub fn writes(&self) -> Vec<TableWrite> {
        self.entries
            .iter()
            .map(|(id, table)| TableWrite {
                guest_id: id.clone(),
                table_number: *table,
            })
            .collect()
    }
}

/// Result of one allocation run, reported back to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationSummary {
    pub event_id: String,
    pub assigned_count: usize,
    pub num_tables_used: u32,
    pub tables_auto_adjusted: bool,
    pub unassigned_count: usize,
    pub skipped_vip_count: usize,
    pub skipped_no_rsvp_count: usize,
    pub num_tables_requested: u32,
    pub seats_per_table: u32,
    pub allocated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partition_order_is_female_first_then_colour() {
        let order = PartitionKey::ORDER;
        assert!(order[..5].iter().all(|k| k.is_female));
        assert!(order[5..].iter().all(|k| !k.is_female));
        let colours: Vec<&str> = order[..5].iter().map(|k| k.color.as_str()).collect();
        assert_eq!(colours, vec!["", "1", "2", "3", "4"]);
    }

    #[test]
    fn colour_tag_parse_is_strict() {
        assert_eq!(ColorTag::parse(" 3 "), ColorTag::Three);
        assert_eq!(ColorTag::parse("5"), ColorTag::Untagged);
        assert_eq!(ColorTag::parse("1.0"), ColorTag::Untagged);
        assert_eq!(ColorTag::parse("blau"), ColorTag::Untagged);
    }

    #[test]
    fn plan_separates_assignments_and_clears() {
        let mut plan = AllocationPlan::new();
        plan.assign("a", 1);
        plan.assign("b", 1);
        plan.assign("c", 2);
        plan.clear("d");

        assert_eq!(plan.assigned_count(), 3);
        assert_eq!(plan.cleared_count(), 1);
        assert_eq!(plan.table_of("c"), Some(Some(2)));
        assert_eq!(plan.table_of("d"), Some(None));
        assert_eq!(plan.table_of("zz"), None);
        assert_eq!(plan.clears().collect::<Vec<_>>(), vec!["d"]);

        let tables = plan.tables();
        assert_eq!(tables[&1], vec!["a".to_string(), "b".to_string()]);
        assert_eq!(tables.len(), 2);

        let writes = plan.writes();
        assert_eq!(writes.len(), 4);
        assert_eq!(writes[3].table_number, None);
    }

    #[test]
    fn block_ranges() {
        let block = TableBlock {
            group: SeatingGroup::Press,
            first_table: 3,
            table_count: 2,
            guest_count: 7,
        };
        assert_eq!(block.last_table(), 4);
        assert!(block.contains(3) && block.contains(4));
        assert!(!block.contains(5));
    }

    #[test]
    fn group_display() {
        assert_eq!(SeatingGroup::Press.to_string(), "press");
        let g = SeatingGroup::General(PartitionKey::new(false, ColorTag::Two));
        assert_eq!(g.to_string(), "male/colour 2");
    }

    #[test]
    fn summary_serializes_camel_case() {
        let summary = AllocationSummary {
            event_id: "gala".into(),
            assigned_count: 10,
            num_tables_used: 3,
            tables_auto_adjusted: true,
            unassigned_count: 0,
            skipped_vip_count: 1,
            skipped_no_rsvp_count: 2,
            num_tables_requested: 1,
            seats_per_table: 4,
            allocated_at: Utc::now(),
        };
        let json = serde_json::to_string(&summary).unwrap();
        assert!(json.contains("\"numTablesUsed\":3"));
        assert!(json.contains("\"tablesAutoAdjusted\":true"));
        assert!(json.contains("\"skippedNoRsvpCount\":2"));
    }
}
