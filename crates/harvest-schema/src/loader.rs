//! RON property-bag loader

use crate::error::{Error, Result, SchemaValidationError};
use crate::registry::Registry;
use harvest_core::{PropertyBag, TileId};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// One tile and its raw properties
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileEntry {
    pub id: TileId,
    #[serde(default)]
    pub properties: PropertyBag,
}

#[derive(Deserialize)]
struct TileFile {
    tiles: Vec<TileEntry>,
}

/// Collects tile property bags from RON sources
///
/// Bags are kept as-is until [`Loader::finish`], so a repeated id across
/// files surfaces as a registry build failure rather than a load error.
#[derive(Debug, Default)]
pub struct Loader {
    entries: Vec<TileEntry>,
}

impl Loader {
    /// Create a new loader
    pub fn new() -> Self {
        Self::default()
    }

    /// Load tiles from a RON string, returning how many were read
    pub fn load_str(&mut self, content: &str) -> Result<usize> {
        let file: TileFile = ron::from_str(content)?;
        if let Some(index) = file.tiles.iter().position(|t| t.id.as_str().trim().is_empty()) {
            return Err(Error::InvalidSchema(format!("tile entry {} has an empty id", index)));
        }
        let count = file.tiles.len();
        self.entries.extend(file.tiles);
        Ok(count)
    }

    /// Load a single RON file
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<usize> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let count = self.load_str(&content)?;
        tracing::info!(path = %path.display(), tiles = count, "loaded tile properties");
        Ok(count)
    }

    /// Load all RON files under a directory, recursively
    pub fn load_directory(&mut self, path: impl AsRef<Path>) -> Result<usize> {
        let path = path.as_ref();

        if !path.is_dir() {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("Not a directory: {:?}", path),
            )));
        }

        // sorted for a stable load order
        let mut paths = fs::read_dir(path)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<std::io::Result<Vec<_>>>()?;
        paths.sort();

        let mut count = 0;
        for file_path in paths {
            if file_path.is_dir() {
                count += self.load_directory(&file_path)?;
            } else if file_path.extension().map(|e| e == "ron").unwrap_or(false) {
                count += self.load_file(&file_path)?;
            }
        }
        Ok(count)
    }

    /// Bags loaded so far, in load order
    pub fn bags(&self) -> &[TileEntry] {
        &self.entries
    }

    /// Validate everything loaded and build the registry
    pub fn finish(self) -> Result<Registry> {
        Ok(Registry::load(into_pairs(self.entries))?)
    }

    /// Build the registry from whichever bags pass
    pub fn finish_lenient(self) -> (Registry, Vec<SchemaValidationError>) {
        Registry::load_lenient(into_pairs(self.entries))
    }
}

fn into_pairs(entries: Vec<TileEntry>) -> impl Iterator<Item = (TileId, PropertyBag)> {
    entries.into_iter().map(|entry| (entry.id, entry.properties))
}
