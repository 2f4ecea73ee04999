//! Recording sink for harvest events

use chrono::{DateTime, Utc};
use harvest_core::{HarvestEvent, HarvestSink};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// One recorded harvest event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Delivery order, starting at 0 and never reused
    pub seq: u64,
    pub recorded_at: DateTime<Utc>,
    pub event: HarvestEvent,
}

#[derive(Debug, Default)]
struct JournalInner {
    entries: Vec<JournalEntry>,
    next_seq: u64,
}

/// A [`HarvestSink`] that keeps every delivered event
///
/// Safe to share between threads; entries are numbered in the order the
/// deliveries acquired the journal lock.
#[derive(Debug, Default)]
pub struct HarvestJournal {
    inner: Mutex<JournalInner>,
}

impl HarvestJournal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all entries, oldest first
    pub fn entries(&self) -> Vec<JournalEntry> {
        self.inner.lock().entries.clone()
    }

    /// Entries with `seq >= start`
    pub fn entries_since(&self, start: u64) -> Vec<JournalEntry> {
        self.inner
            .lock()
            .entries
            .iter()
            .filter(|entry| entry.seq >= start)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().entries.is_empty()
    }

    /// Drop all entries; sequence numbers keep counting
    pub fn clear(&self) {
        self.inner.lock().entries.clear();
    }

    /// Record an event now
    pub fn record(&self, event: HarvestEvent) -> u64 {
        let mut inner = self.inner.lock();
        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.entries.push(JournalEntry {
            seq,
            recorded_at: Utc::now(),
            event,
        });
        seq
    }
}

impl HarvestSink for HarvestJournal {
    fn deliver(&self, event: &HarvestEvent) {
        self.record(event.clone());
    }
}
