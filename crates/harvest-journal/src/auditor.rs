//! Auditing and analytics for recorded harvests

use crate::journal::JournalEntry;
use harvest_core::{InstanceId, ItemId, TileId};
use std::collections::BTreeMap;

/// Auditor for querying and analyzing journal entries
pub struct Auditor<'a> {
    entries: &'a [JournalEntry],
}

impl<'a> Auditor<'a> {
    /// Create a new auditor over a journal snapshot
    pub fn new(entries: &'a [JournalEntry]) -> Self {
        Self { entries }
    }

    /// Generate a comprehensive audit report
    pub fn generate_report(&self) -> AuditReport {
        let mut report = AuditReport {
            event_count: self.entries.len(),
            first_seq: self.entries.first().map(|e| e.seq),
            last_seq: self.entries.last().map(|e| e.seq),
            ..AuditReport::default()
        };

        for entry in self.entries {
            let event = &entry.event;
            if event.is_empty() {
                report.empty_yields += 1;
            }
            for stack in &event.items {
                *report.item_totals.entry(stack.item.clone()).or_insert(0) +=
                    u64::from(stack.quantity);
            }
            report.exp_total += event.exp;
            report.gold_total += event.gold;
            *report.events_by_tile.entry(event.tile.clone()).or_insert(0) += 1;
        }

        report
    }

    /// Query entries matching specific criteria
    pub fn query(&self, query: &AuditQuery) -> Vec<&'a JournalEntry> {
        self.entries
            .iter()
            .filter(|entry| query.matches(entry))
            .collect()
    }

    /// Total quantity of one item across all events
    pub fn item_total(&self, item: &ItemId) -> u64 {
        self.entries
            .iter()
            .flat_map(|entry| &entry.event.items)
            .filter(|stack| &stack.item == item)
            .map(|stack| u64::from(stack.quantity))
            .sum()
    }

    /// Events harvested from one tile type
    pub fn events_for_tile(&self, tile: &TileId) -> Vec<&'a JournalEntry> {
        self.query(&AuditQuery {
            tile: Some(tile.clone()),
            ..AuditQuery::default()
        })
    }

    /// The harvest of one instance, if it was recorded
    pub fn event_for_instance(&self, instance: InstanceId) -> Option<&'a JournalEntry> {
        self.entries
            .iter()
            .find(|entry| entry.event.instance == instance)
    }

    /// Instances that were harvested more than once
    ///
    /// Always empty for a journal fed by a single world.
    pub fn repeated_instances(&self) -> Vec<InstanceId> {
        let mut counts: BTreeMap<InstanceId, usize> = BTreeMap::new();
        for entry in self.entries {
            *counts.entry(entry.event.instance).or_insert(0) += 1;
        }
        counts
            .into_iter()
            .filter(|(_, count)| *count > 1)
            .map(|(instance, _)| instance)
            .collect()
    }
}

/// A comprehensive audit report
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuditReport {
    /// Number of harvest events
    pub event_count: usize,
    /// Events that yielded no items, exp or gold
    pub empty_yields: usize,
    pub first_seq: Option<u64>,
    pub last_seq: Option<u64>,
    /// Quantity harvested per item
    pub item_totals: BTreeMap<ItemId, u64>,
    pub exp_total: i64,
    pub gold_total: i64,
    /// Harvest events per tile type
    pub events_by_tile: BTreeMap<TileId, u64>,
}

impl std::fmt::Display for AuditReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Audit Report ===")?;
        writeln!(f, "Harvest events: {}", self.event_count)?;
        writeln!(f, "Empty yields: {}", self.empty_yields)?;

        if let (Some(first), Some(last)) = (self.first_seq, self.last_seq) {
            writeln!(f, "Sequence range: {} - {}", first, last)?;
        }

        writeln!(f, "Exp: {}", self.exp_total)?;
        writeln!(f, "Gold: {}", self.gold_total)?;

        if !self.item_totals.is_empty() {
            writeln!(f, "\nItems:")?;
            let mut sorted: Vec<_> = self.item_totals.iter().collect();
            sorted.sort_by_key(|(_, count)| std::cmp::Reverse(**count));
            for (item, count) in sorted {
                writeln!(f, "  {}: {}", item, count)?;
            }
        }

        if !self.events_by_tile.is_empty() {
            writeln!(f, "\nEvents by tile:")?;
            for (tile, count) in &self.events_by_tile {
                writeln!(f, "  {}: {}", tile, count)?;
            }
        }

        Ok(())
    }
}

/// Query criteria for filtering journal entries
#[derive(Debug, Clone, Default)]
pub struct AuditQuery {
    /// Start sequence number (inclusive)
    pub start_seq: Option<u64>,
    /// End sequence number (inclusive)
    pub end_seq: Option<u64>,
    /// Filter by tile type
    pub tile: Option<TileId>,
    /// Only events containing this item
    pub item: Option<ItemId>,
    /// Skip events that yielded nothing
    pub non_empty_only: bool,
}

impl AuditQuery {
    fn matches(&self, entry: &JournalEntry) -> bool {
        if let Some(start) = self.start_seq {
            if entry.seq < start {
                return false;
            }
        }
        if let Some(end) = self.end_seq {
            if entry.seq > end {
                return false;
            }
        }
        if let Some(ref tile) = self.tile {
            if &entry.event.tile != tile {
                return false;
            }
        }
        if let Some(ref item) = self.item {
            if !entry.event.items.iter().any(|stack| &stack.item == item) {
                return false;
            }
        }
        !(self.non_empty_only && entry.event.is_empty())
    }
}
