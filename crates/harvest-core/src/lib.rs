//! Harvest Core - Resource node definitions and harvest resolution
//!
//! This crate provides the runtime half of the harvest engine:
//! - Raw property values (`Value`, `PropertyBag`) as parsed from tile metadata
//! - Tile, item and instance identifiers
//! - Validated node definitions (`ResourceNodeDefinition`, `Category`, `DropSlot`)
//! - Seedable probability sampling (`Sampler`, `GameRng`)
//! - Drop table resolution and reward sampling
//! - Resource node instances with an at-most-once harvest state machine
//!
//! Turning property bags into definitions lives in `harvest-schema`.
//!
//! ## Determinism
//!
//! A harvest draws its loot first (slot by slot), then exp, then gold, all from
//! one sampler. Given the same seed the same `(items, exp, gold)` comes out:
//!
//! ```
//! use harvest_core::{drop_table, rewards, Category, GameRng, IntRange, ResourceNodeDefinition};
//!
//! let def = ResourceNodeDefinition::new("tree:0", "tree1", Category::Destructible)
//!     .with_hp(30)
//!     .with_slot("wood", 0.75)
//!     .with_exp(IntRange::new(5, 12).unwrap());
//!
//! let mut a = GameRng::new(7);
//! let mut b = GameRng::new(7);
//! assert_eq!(drop_table::resolve(&def, &mut a), drop_table::resolve(&def, &mut b));
//! assert_eq!(rewards::rewards(&def, &mut a), rewards::rewards(&def, &mut b));
//! ```

mod definition;
pub mod drop_table;
mod error;
mod event;
mod identity;
mod node;
pub mod rewards;
mod rng;
mod value;

pub use definition::{Category, DropSlot, IntRange, ResourceNodeDefinition};
pub use error::{Error, Result};
pub use event::{CollectingSink, HarvestEvent, HarvestSink, ItemStack, NullSink};
pub use identity::{InstanceId, ItemId, TileId};
pub use node::{DamageOutcome, NodeState, PickOutcome, ResourceNode};
pub use rewards::Rewards;
pub use rng::{GameRng, Sampler, ScriptedSampler, SharedSampler};
pub use value::{PropertyBag, Value};
