//! Property bag validation
//!
//! Turns one raw [`PropertyBag`] into a [`ResourceNodeDefinition`]. The category
//! is decided first, from which fields are present, and every later rule is
//! checked against that category. Nothing is defaulted silently: a bag either
//! produces a complete definition or a [`SchemaValidationError`] naming the
//! offending field.

use crate::drop_type::parse_item_list;
use crate::error::{SchemaValidationError, Violation};
use harvest_core::{
    Category, DropSlot, IntRange, ItemId, PropertyBag, ResourceNodeDefinition, TileId, Value,
};
use std::collections::BTreeMap;

/// Recognized property names
pub mod keys {
    pub const ALLOW_PICK: &str = "allow_pick";
    pub const BASE: &str = "base";
    pub const TYPE: &str = "type";
    pub const NAME: &str = "name";
    pub const HP: &str = "HP";
    pub const DEFENSE: &str = "defense";
    pub const COUNT_MIN: &str = "count_min";
    pub const COUNT_MAX: &str = "count_max";
    pub const PROBABILITY: &str = "probability";
    pub const DROP_MAX: &str = "drop_max";
    pub const DROP_TYPE: &str = "drop_type";
    pub const PICKUP_OBJECT: &str = "pickup_object";
    pub const EXP_MIN: &str = "exp_min";
    pub const EXP_MAX: &str = "exp_max";
    pub const GOLD_MIN: &str = "gold_min";
    pub const GOLD_MAX: &str = "gold_max";

    /// Name of the probability field of slot `n` (1-based)
    pub fn drop_probability(n: usize) -> String {
        format!("drop{}_Probability", n)
    }
}

type Checked<T> = std::result::Result<T, SchemaValidationError>;

/// Validate one tile's property bag
pub fn validate(tile: &TileId, bag: &PropertyBag) -> Checked<ResourceNodeDefinition> {
    let reader = BagReader { tile, bag };

    let allow_pick = reader.bool(keys::ALLOW_PICK)?;
    let hp = reader.int(keys::HP)?;
    let category = if allow_pick.is_some() {
        Category::WildPlant
    } else if hp.is_some() {
        Category::Destructible
    } else {
        Category::Other
    };

    let name = match reader.string(keys::NAME)? {
        Some(name) => name.to_string(),
        None => tile.to_string(),
    };
    let kind = match reader.string(keys::TYPE)? {
        Some(kind) => Some(kind.to_string()),
        None => reader.string(keys::BASE)?.map(str::to_string),
    };

    let defense = reader.int(keys::DEFENSE)?;
    if let Some(defense) = defense {
        if defense < 0 {
            return Err(reader.error(keys::DEFENSE, Violation::Negative(defense)));
        }
    }

    let count_range = reader.range(keys::COUNT_MIN, keys::COUNT_MAX)?;
    if let Some(range) = count_range {
        if range.min() < 1 {
            return Err(reader.error(keys::COUNT_MIN, Violation::NotPositive(range.min())));
        }
    }
    let exp_range = reader.reward_range(keys::EXP_MIN, keys::EXP_MAX)?;
    let gold_range = reader.reward_range(keys::GOLD_MIN, keys::GOLD_MAX)?;

    let pick_probability = reader.probability(keys::PROBABILITY)?;
    let pickup_item = reader.string(keys::PICKUP_OBJECT)?.map(ItemId::new);

    match category {
        Category::WildPlant => {
            if allow_pick != Some(true) {
                return Err(reader.error(keys::ALLOW_PICK, Violation::MustBeTrue));
            }
            reader.forbid(keys::HP, category)?;
            reader.forbid(keys::DEFENSE, category)?;
            reader.forbid(keys::DROP_TYPE, category)?;
            reader.forbid(keys::DROP_MAX, category)?;
            if let Some(key) = reader.first_probability_key() {
                return Err(reader.error(key, Violation::NotAllowed(category)));
            }
            if pickup_item.is_none() {
                return Err(reader.error(keys::PICKUP_OBJECT, Violation::Missing));
            }
        }
        Category::Destructible | Category::Other => {
            if let Some(hp) = hp {
                if hp <= 0 {
                    return Err(reader.error(keys::HP, Violation::NotPositive(hp)));
                }
            }
            reader.forbid(keys::PICKUP_OBJECT, category)?;
            reader.forbid(keys::PROBABILITY, category)?;
        }
    }

    let drop_slots = read_drop_slots(&reader)?;
    let drop_max = match reader.floored_number(keys::DROP_MAX)? {
        None => drop_slots.len(),
        Some(max) if max < 0 => return Err(reader.error(keys::DROP_MAX, Violation::Negative(max))),
        Some(max) if max as u64 > drop_slots.len() as u64 => {
            return Err(reader.error(
                keys::DROP_MAX,
                Violation::DropMaxExceedsSlots {
                    drop_max: max,
                    slots: drop_slots.len(),
                },
            ))
        }
        Some(max) => max as usize,
    };

    Ok(ResourceNodeDefinition {
        tile: tile.clone(),
        category,
        name,
        kind,
        hp,
        defense,
        drop_slots,
        drop_max,
        exp_range,
        gold_range,
        allow_pick: allow_pick.unwrap_or(false),
        pickup_item,
        pick_probability: pick_probability.unwrap_or(1.0),
        count_range,
    })
}

/// Pair the `drop_type` items with their numbered probability fields
fn read_drop_slots(reader: &BagReader<'_>) -> Checked<Vec<DropSlot>> {
    let items = match reader.string(keys::DROP_TYPE)? {
        Some(raw) => parse_item_list(raw)
            .map_err(|msg| reader.error(keys::DROP_TYPE, Violation::MalformedList(msg)))?,
        None => Vec::new(),
    };

    let mut probabilities = BTreeMap::new();
    for key in reader.bag.keys() {
        if let Some(index) = slot_index(key) {
            if let Some(p) = reader.probability(key)? {
                probabilities.insert(index, (key.as_str(), p));
            }
        }
    }

    let mut slots = Vec::with_capacity(items.len());
    for (i, item) in items.into_iter().enumerate() {
        let field = keys::drop_probability(i + 1);
        let Some((_, probability)) = probabilities.remove(&(i + 1)) else {
            return Err(reader.error(field, Violation::Missing));
        };
        slots.push(DropSlot { item, probability });
    }

    if let Some((_, (key, _))) = probabilities.into_iter().next() {
        return Err(reader.error(key, Violation::OrphanProbability { slots: slots.len() }));
    }

    Ok(slots)
}

/// Slot number of a `dropN_Probability` key
fn slot_index(key: &str) -> Option<usize> {
    let digits = key.strip_prefix("drop")?.strip_suffix("_Probability")?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Typed, error-reporting reads from one bag
struct BagReader<'a> {
    tile: &'a TileId,
    bag: &'a PropertyBag,
}

impl<'a> BagReader<'a> {
    fn error(&self, field: impl Into<String>, violation: Violation) -> SchemaValidationError {
        SchemaValidationError::new(self.tile.clone(), field, violation)
    }

    fn wrong_type(&self, field: &str, expected: &'static str, got: &Value) -> SchemaValidationError {
        self.error(
            field,
            Violation::WrongType {
                expected,
                got: got.type_name(),
            },
        )
    }

    /// Raw value, treating explicit nulls as absent
    fn get(&self, field: &str) -> Option<&'a Value> {
        self.bag.get(field).filter(|v| !v.is_null())
    }

    fn bool(&self, field: &str) -> Checked<Option<bool>> {
        self.get(field)
            .map(|v| v.as_bool().ok_or_else(|| self.wrong_type(field, "bool", v)))
            .transpose()
    }

    fn int(&self, field: &str) -> Checked<Option<i64>> {
        self.get(field)
            .map(|v| v.as_int().ok_or_else(|| self.wrong_type(field, "int", v)))
            .transpose()
    }

    fn string(&self, field: &str) -> Checked<Option<&'a str>> {
        self.get(field)
            .map(|v| v.as_str().ok_or_else(|| self.wrong_type(field, "string", v)))
            .transpose()
    }

    fn probability(&self, field: &str) -> Checked<Option<f64>> {
        let Some(value) = self.get(field) else {
            return Ok(None);
        };
        let p = value
            .as_float()
            .ok_or_else(|| self.wrong_type(field, "float", value))?;
        if !(0.0..=1.0).contains(&p) {
            return Err(self.error(field, Violation::ProbabilityOutOfRange(p)));
        }
        Ok(Some(p))
    }

    /// Int as-is, float floored
    fn floored_number(&self, field: &str) -> Checked<Option<i64>> {
        let Some(value) = self.get(field) else {
            return Ok(None);
        };
        match value {
            Value::Int(i) => Ok(Some(*i)),
            Value::Float(f) if f.is_finite() => Ok(Some(f.floor() as i64)),
            other => Err(self.wrong_type(field, "number", other)),
        }
    }

    /// `[min, max]` pair where either bound alone stands for both
    fn range(&self, min_key: &str, max_key: &str) -> Checked<Option<IntRange>> {
        let (min, max) = match (self.int(min_key)?, self.int(max_key)?) {
            (None, None) => return Ok(None),
            (Some(min), None) => (min, min),
            (None, Some(max)) => (max, max),
            (Some(min), Some(max)) => (min, max),
        };
        IntRange::new(min, max)
            .map(Some)
            .ok_or_else(|| self.error(min_key, Violation::InvertedRange { min, max }))
    }

    fn reward_range(&self, min_key: &str, max_key: &str) -> Checked<Option<IntRange>> {
        let range = self.range(min_key, max_key)?;
        if let Some(range) = range {
            if range.min() < 0 {
                return Err(self.error(min_key, Violation::Negative(range.min())));
            }
        }
        Ok(range)
    }

    fn forbid(&self, field: &str, category: Category) -> Checked<()> {
        match self.get(field) {
            Some(_) => Err(self.error(field, Violation::NotAllowed(category))),
            None => Ok(()),
        }
    }

    fn first_probability_key(&self) -> Option<&'a str> {
        self.bag
            .iter()
            .find(|(key, value)| slot_index(key).is_some() && !value.is_null())
            .map(|(key, _)| key.as_str())
    }
}
