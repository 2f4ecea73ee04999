//! Error types for harvest-schema

use crate::registry::Registry;
use harvest_core::{Category, TileId};
use thiserror::Error;

/// The rule a property violated
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Violation {
    #[error("is required")]
    Missing,

    #[error("expected {expected}, got {got}")]
    WrongType {
        expected: &'static str,
        got: &'static str,
    },

    #[error("must lie in [0, 1], got {0}")]
    ProbabilityOutOfRange(f64),

    #[error("must be positive, got {0}")]
    NotPositive(i64),

    #[error("must not be negative, got {0}")]
    Negative(i64),

    #[error("has min {min} greater than max {max}")]
    InvertedRange { min: i64, max: i64 },

    #[error("is {drop_max} but only {slots} drop slots are declared")]
    DropMaxExceedsSlots { drop_max: i64, slots: usize },

    #[error("has no matching entry among {slots} drop_type items")]
    OrphanProbability { slots: usize },

    #[error("is malformed: {0}")]
    MalformedList(String),

    #[error("is not allowed on {0} nodes")]
    NotAllowed(Category),

    #[error("must be true")]
    MustBeTrue,

    #[error("repeats an already registered tile id")]
    Duplicate,
}

/// A property bag that failed validation
#[derive(Error, Debug, Clone, PartialEq)]
#[error("tile `{tile}`: field `{field}` {violation}")]
pub struct SchemaValidationError {
    /// Tile whose bag was rejected
    pub tile: TileId,
    /// Property name that broke the rule
    pub field: String,
    pub violation: Violation,
}

impl SchemaValidationError {
    pub fn new(tile: TileId, field: impl Into<String>, violation: Violation) -> Self {
        Self {
            tile,
            field: field.into(),
            violation,
        }
    }
}

/// Registry build finished with rejected bags
///
/// The valid bags were still registered; [`RegistryBuildError::into_partial`]
/// hands that registry back.
#[derive(Error, Debug)]
#[error("{} tile definition(s) failed validation{}", .failures.len(), Self::first_failure(.failures))]
pub struct RegistryBuildError {
    failures: Vec<SchemaValidationError>,
    registry: Registry,
}

impl RegistryBuildError {
    pub(crate) fn new(failures: Vec<SchemaValidationError>, registry: Registry) -> Self {
        Self { failures, registry }
    }

    /// Every rejected bag, in input order
    pub fn failures(&self) -> &[SchemaValidationError] {
        &self.failures
    }

    /// The registry of the bags that passed
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Take the registry of the bags that passed
    pub fn into_partial(self) -> Registry {
        self.registry
    }

    /// Split into the partial registry and the failures
    pub fn into_parts(self) -> (Registry, Vec<SchemaValidationError>) {
        (self.registry, self.failures)
    }

    fn first_failure(failures: &[SchemaValidationError]) -> String {
        failures
            .first()
            .map(|f| format!(" (first: {})", f))
            .unwrap_or_default()
    }
}

/// Bag loading error type
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("RON parse error: {0}")]
    Ron(#[from] ron::error::SpannedError),

    #[error("Invalid schema: {0}")]
    InvalidSchema(String),

    #[error(transparent)]
    Build(#[from] RegistryBuildError),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
