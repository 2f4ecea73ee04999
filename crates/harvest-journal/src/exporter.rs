//! Export journal data to various formats

use crate::journal::JournalEntry;
use crate::{Error, Result};
use harvest_core::ItemStack;
use serde::Serialize;
use std::io::Write;

/// Export format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// RON format (Rust Object Notation)
    Ron,
    /// JSON format (requires serde_json feature)
    Json,
    /// CSV format, one row per event
    Csv,
    /// Human-readable text format
    Text,
}

/// Exporter for journal entries
pub struct Exporter<'a> {
    entries: &'a [JournalEntry],
}

impl<'a> Exporter<'a> {
    /// Create a new exporter
    pub fn new(entries: &'a [JournalEntry]) -> Self {
        Self { entries }
    }

    /// Export to a string in the specified format
    pub fn export(&self, format: ExportFormat) -> Result<String> {
        match format {
            ExportFormat::Ron => self.to_ron(),
            ExportFormat::Json => self.to_json(),
            ExportFormat::Csv => Ok(self.to_csv()),
            ExportFormat::Text => Ok(self.to_text()),
        }
    }

    /// Export to a writer
    pub fn export_to<W: Write>(&self, writer: &mut W, format: ExportFormat) -> Result<()> {
        let content = self.export(format)?;
        writer.write_all(content.as_bytes())?;
        Ok(())
    }

    /// Export to RON format
    pub fn to_ron(&self) -> Result<String> {
        let export = ExportData::from_entries(self.entries);
        ron::ser::to_string_pretty(&export, ron::ser::PrettyConfig::default())
            .map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Export to JSON format
    #[cfg(feature = "serde_json")]
    pub fn to_json(&self) -> Result<String> {
        let export = ExportData::from_entries(self.entries);
        serde_json::to_string_pretty(&export).map_err(|e| Error::Serialization(e.to_string()))
    }

    #[cfg(not(feature = "serde_json"))]
    pub fn to_json(&self) -> Result<String> {
        Err(Error::ExportError(
            "JSON export requires the 'serde_json' feature".to_string(),
        ))
    }

    /// Export to CSV format
    ///
    /// Items are packed into one field as `item x quantity` pairs separated by `;`.
    pub fn to_csv(&self) -> String {
        let mut output = String::new();
        output.push_str("seq,recorded_at,instance,tile,items,exp,gold\n");

        for entry in self.entries {
            let event = &entry.event;
            let tile = event.tile.as_str().replace('"', "\"\"");
            output.push_str(&format!(
                "{},{},{},\"{}\",\"{}\",{},{}\n",
                entry.seq,
                entry.recorded_at.to_rfc3339(),
                event.instance.raw(),
                tile,
                format_items(&event.items, ";").replace('"', "\"\""),
                event.exp,
                event.gold
            ));
        }

        output
    }

    /// Export to human-readable text format
    pub fn to_text(&self) -> String {
        let mut output = String::new();

        output.push_str("=== Harvest Journal Export ===\n\n");
        output.push_str(&format!("Events: {}\n", self.entries.len()));

        if let (Some(first), Some(last)) = (self.entries.first(), self.entries.last()) {
            output.push_str(&format!(
                "Recorded: {} - {}\n",
                first.recorded_at.format("%Y-%m-%d %H:%M:%S"),
                last.recorded_at.format("%Y-%m-%d %H:%M:%S")
            ));
        }

        output.push_str("\n=== Entries ===\n\n");

        for entry in self.entries {
            let event = &entry.event;
            output.push_str(&format!("  #{} {} ({})\n", entry.seq, event.instance, event.tile));
            if event.items.is_empty() {
                output.push_str("      items: none\n");
            } else {
                output.push_str(&format!("      items: {}\n", format_items(&event.items, ", ")));
            }
            if event.exp != 0 || event.gold != 0 {
                output.push_str(&format!("      exp={} gold={}\n", event.exp, event.gold));
            }
        }

        output
    }

    /// Export only entries with `start <= seq <= end`
    pub fn export_range(&self, start: u64, end: u64, format: ExportFormat) -> Result<String> {
        if start > end {
            return Err(Error::ExportError(format!(
                "invalid sequence range {}..={}",
                start, end
            )));
        }
        let entries: Vec<JournalEntry> = self
            .entries
            .iter()
            .filter(|entry| (start..=end).contains(&entry.seq))
            .cloned()
            .collect();
        Exporter::new(&entries).export(format)
    }
}

fn format_items(items: &[ItemStack], separator: &str) -> String {
    items
        .iter()
        .map(|stack| format!("{} x{}", stack.item, stack.quantity))
        .collect::<Vec<_>>()
        .join(separator)
}

/// Data structure for full journal export
#[derive(Debug, Clone, Serialize)]
struct ExportData<'a> {
    version: u32,
    stats: ExportStats,
    entries: &'a [JournalEntry],
}

impl<'a> ExportData<'a> {
    fn from_entries(entries: &'a [JournalEntry]) -> Self {
        Self {
            version: 1,
            stats: ExportStats {
                event_count: entries.len(),
                first_seq: entries.first().map(|e| e.seq),
                last_seq: entries.last().map(|e| e.seq),
            },
            entries,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct ExportStats {
    event_count: usize,
    first_seq: Option<u64>,
    last_seq: Option<u64>,
}
