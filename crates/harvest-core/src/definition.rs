//! Validated resource node definitions

use crate::{rng::Sampler, ItemId, TileId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Harvest behaviour of a node type, fixed once at validation time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    /// Picked once by hand (carrot, bean)
    WildPlant,
    /// Worn down by damage (trees, stone builds)
    Destructible,
    /// Anything else; carries data but cannot be harvested
    Other,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Category::WildPlant => "wild plant",
            Category::Destructible => "destructible",
            Category::Other => "other",
        };
        f.write_str(name)
    }
}

/// An inclusive integer range `[min, max]` with `min <= max`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntRange {
    min: i64,
    max: i64,
}

impl IntRange {
    /// Create a range, or `None` when `min > max`
    pub fn new(min: i64, max: i64) -> Option<Self> {
        (min <= max).then_some(Self { min, max })
    }

    /// A range holding exactly one value
    pub fn single(value: i64) -> Self {
        Self {
            min: value,
            max: value,
        }
    }

    pub fn min(&self) -> i64 {
        self.min
    }

    pub fn max(&self) -> i64 {
        self.max
    }

    /// Check whether `value` lies in the range
    pub fn contains(&self, value: i64) -> bool {
        (self.min..=self.max).contains(&value)
    }

    /// Sample uniformly over the range with exactly one draw
    pub fn sample<S: Sampler + ?Sized>(&self, sampler: &mut S) -> i64 {
        sampler.range_inclusive(self.min, self.max)
    }
}

impl fmt::Display for IntRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.min, self.max)
    }
}

/// One entry of an ordered loot table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropSlot {
    /// Item yielded when the slot hits
    pub item: ItemId,
    /// Chance in `[0, 1]` that the slot hits
    pub probability: f64,
}

impl DropSlot {
    pub fn new(item: impl Into<ItemId>, probability: f64) -> Self {
        Self {
            item: item.into(),
            probability,
        }
    }
}

/// Immutable description of one harvestable node type
///
/// Built by `harvest-schema`'s validator from a raw property bag and shared
/// read-only (behind an `Arc`) by every spawned instance of the tile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceNodeDefinition {
    /// Tile this definition was validated under
    pub tile: TileId,
    /// Harvest behaviour
    pub category: Category,
    /// Identifier name (`tree1`, `carrot_plant`)
    pub name: String,
    /// Free-form `type`/`base` hint (`tree`, `wild_plants`), informational only
    pub kind: Option<String>,
    /// Starting hit points, destructibles only
    pub hp: Option<i64>,
    /// Flat damage reduction
    pub defense: Option<i64>,
    /// Loot table in priority order
    pub drop_slots: Vec<DropSlot>,
    /// Maximum number of slots that may hit in one harvest
    pub drop_max: usize,
    pub exp_range: Option<IntRange>,
    pub gold_range: Option<IntRange>,
    /// Whether a single pick harvests the node
    pub allow_pick: bool,
    /// Item yielded by a successful pick
    pub pickup_item: Option<ItemId>,
    /// Chance that a pick yields anything at all
    pub pick_probability: f64,
    /// Quantity range for each yielded stack; quantity 1 when absent
    pub count_range: Option<IntRange>,
}

impl ResourceNodeDefinition {
    /// Create an empty definition of the given category
    ///
    /// Runtime definitions come from the schema validator; this constructor and
    /// the `with_*` builders exist for tooling and tests.
    pub fn new(tile: impl Into<TileId>, name: impl Into<String>, category: Category) -> Self {
        Self {
            tile: tile.into(),
            category,
            name: name.into(),
            kind: None,
            hp: None,
            defense: None,
            drop_slots: Vec::new(),
            drop_max: 0,
            exp_range: None,
            gold_range: None,
            allow_pick: category == Category::WildPlant,
            pickup_item: None,
            pick_probability: 1.0,
            count_range: None,
        }
    }

    /// Flat damage reduction, 0 when undeclared
    pub fn defense(&self) -> i64 {
        self.defense.unwrap_or(0)
    }

    /// Whether instances of this definition are harvested by picking
    pub fn is_pickable(&self) -> bool {
        self.category == Category::WildPlant && self.allow_pick
    }

    pub fn with_hp(mut self, hp: i64) -> Self {
        self.hp = Some(hp);
        self
    }

    pub fn with_defense(mut self, defense: i64) -> Self {
        self.defense = Some(defense);
        self
    }

    /// Append a drop slot; `drop_max` grows with the table until set explicitly
    pub fn with_slot(mut self, item: impl Into<ItemId>, probability: f64) -> Self {
        if self.drop_max == self.drop_slots.len() {
            self.drop_max += 1;
        }
        self.drop_slots.push(DropSlot::new(item, probability));
        self
    }

    pub fn with_drop_max(mut self, drop_max: usize) -> Self {
        self.drop_max = drop_max;
        self
    }

    pub fn with_exp(mut self, range: IntRange) -> Self {
        self.exp_range = Some(range);
        self
    }

    pub fn with_gold(mut self, range: IntRange) -> Self {
        self.gold_range = Some(range);
        self
    }

    /// Set the picked item and the chance a pick yields it
    pub fn with_pickup(mut self, item: impl Into<ItemId>, probability: f64) -> Self {
        self.pickup_item = Some(item.into());
        self.pick_probability = probability;
        self
    }

    pub fn with_count(mut self, range: IntRange) -> Self {
        self.count_range = Some(range);
        self
    }
}
