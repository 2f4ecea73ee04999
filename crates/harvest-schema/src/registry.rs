//! Definition registry

use crate::error::{RegistryBuildError, SchemaValidationError, Violation};
use crate::validator::validate;
use harvest_core::{Error as CoreError, PropertyBag, ResourceNodeDefinition, TileId};
use std::borrow::Borrow;
use std::collections::HashMap;
use std::sync::Arc;

/// Immutable mapping from tile id to validated definition
///
/// Built once by [`Registry::load`]; afterwards it is only read, so it can be
/// shared behind an `Arc` without locking.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    defs: HashMap<TileId, Arc<ResourceNodeDefinition>>,
}

impl Registry {
    /// Validate every bag and build the registry
    ///
    /// Every bag is checked even after a failure. If any bag was rejected the
    /// error still carries the registry of the accepted ones.
    pub fn load<I, K, B>(bags: I) -> Result<Self, RegistryBuildError>
    where
        I: IntoIterator<Item = (K, B)>,
        K: Into<TileId>,
        B: Borrow<PropertyBag>,
    {
        let (registry, failures) = Self::load_lenient(bags);
        if failures.is_empty() {
            Ok(registry)
        } else {
            Err(RegistryBuildError::new(failures, registry))
        }
    }

    /// Build from whichever bags pass, returning the rejections alongside
    pub fn load_lenient<I, K, B>(bags: I) -> (Self, Vec<SchemaValidationError>)
    where
        I: IntoIterator<Item = (K, B)>,
        K: Into<TileId>,
        B: Borrow<PropertyBag>,
    {
        let mut defs = HashMap::new();
        let mut failures = Vec::new();

        for (tile, bag) in bags {
            let tile = tile.into();
            if defs.contains_key(&tile) {
                let failure = SchemaValidationError::new(tile, "id", Violation::Duplicate);
                tracing::warn!(tile = %failure.tile, "duplicate tile id, keeping the first");
                failures.push(failure);
                continue;
            }

            match validate(&tile, bag.borrow()) {
                Ok(def) => {
                    tracing::debug!(
                        tile = %tile,
                        category = %def.category,
                        slots = def.drop_slots.len(),
                        "registered resource node definition"
                    );
                    defs.insert(tile, Arc::new(def));
                }
                Err(failure) => {
                    tracing::warn!(
                        tile = %failure.tile,
                        field = %failure.field,
                        violation = %failure.violation,
                        "rejected tile definition"
                    );
                    failures.push(failure);
                }
            }
        }

        tracing::info!(
            accepted = defs.len(),
            rejected = failures.len(),
            "definition registry built"
        );
        (Self { defs }, failures)
    }

    /// Definition for a tile, or `UnknownTileId`
    pub fn lookup(&self, tile: &TileId) -> harvest_core::Result<Arc<ResourceNodeDefinition>> {
        self.defs
            .get(tile)
            .cloned()
            .ok_or_else(|| CoreError::UnknownTileId(tile.clone()))
    }

    pub fn get(&self, tile: &TileId) -> Option<&Arc<ResourceNodeDefinition>> {
        self.defs.get(tile)
    }

    pub fn contains(&self, tile: &TileId) -> bool {
        self.defs.contains_key(tile)
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    /// Iterate over all definitions (unordered)
    pub fn iter(&self) -> impl Iterator<Item = (&TileId, &Arc<ResourceNodeDefinition>)> {
        self.defs.iter()
    }

    /// Registered tile ids, sorted
    pub fn tiles(&self) -> Vec<TileId> {
        let mut tiles: Vec<TileId> = self.defs.keys().cloned().collect();
        tiles.sort();
        tiles
    }
}
