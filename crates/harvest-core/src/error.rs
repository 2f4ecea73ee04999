//! Error types for harvest-core

use crate::{InstanceId, TileId};
use thiserror::Error;

/// Core error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Invalid damage: {0} (damage must be positive)")]
    InvalidDamage(i64),

    #[error("Node type {0} cannot be damaged")]
    NotDamageable(TileId),

    #[error("Node type {0} cannot be picked")]
    NotPickable(TileId),

    #[error("Node type {0} has no harvest behaviour and cannot be spawned")]
    NotHarvestable(TileId),

    #[error("Node type {0} is destructible but has no positive HP")]
    InvalidDefinition(TileId),

    #[error("Unknown tile id: {0}")]
    UnknownTileId(TileId),

    #[error("Unknown node instance: {0}")]
    UnknownInstance(InstanceId),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
