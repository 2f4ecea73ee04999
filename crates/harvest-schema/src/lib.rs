//! Harvest Schema - property bag validation and the definition registry
//!
//! Turns the loosely-typed property bags of tile metadata into validated
//! [`harvest_core::ResourceNodeDefinition`]s:
//! - `validate` checks one bag against the rules of its category
//! - `Registry` holds every accepted definition, immutable after `load`
//! - `Loader` reads bags from RON files for tests and tooling

mod drop_type;
mod error;
mod loader;
mod registry;
pub mod validator;

pub use drop_type::parse_item_list;
pub use error::{Error, RegistryBuildError, Result, SchemaValidationError, Violation};
pub use loader::{Loader, TileEntry};
pub use registry::Registry;
pub use validator::validate;
