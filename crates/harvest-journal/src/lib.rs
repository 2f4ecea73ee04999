//! Harvest Journal - audit trail of delivered harvests
//!
//! - **HarvestJournal**: a `HarvestSink` that records every event with a
//!   sequence number and timestamp
//! - **Auditor**: totals and queries over recorded entries
//! - **Exporter**: RON, JSON (feature `serde_json`), CSV or text output
//!
//! # Example
//!
//! ```
//! use harvest_core::{HarvestEvent, HarvestSink, InstanceId, ItemId, ItemStack, TileId};
//! use harvest_journal::{Auditor, Exporter, HarvestJournal};
//!
//! let journal = HarvestJournal::new();
//! journal.deliver(&HarvestEvent {
//!     instance: InstanceId::new(1),
//!     tile: TileId::new("tree:0"),
//!     items: vec![ItemStack::new("wood", 1)],
//!     exp: 0,
//!     gold: 0,
//! });
//!
//! let entries = journal.entries();
//! let auditor = Auditor::new(&entries);
//! assert_eq!(auditor.item_total(&ItemId::new("wood")), 1);
//! println!("{}", auditor.generate_report());
//!
//! let csv = Exporter::new(&entries).to_csv();
//! assert_eq!(csv.lines().count(), 2);
//! ```

mod auditor;
mod error;
mod exporter;
mod journal;

pub use auditor::{AuditQuery, AuditReport, Auditor};
pub use error::{Error, Result};
pub use exporter::{ExportFormat, Exporter};
pub use journal::{HarvestJournal, JournalEntry};
