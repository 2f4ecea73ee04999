//! Experience and gold rewards

use crate::{definition::ResourceNodeDefinition, rng::Sampler};
use serde::{Deserialize, Serialize};

/// Sampled experience and gold of one harvest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rewards {
    pub exp: i64,
    pub gold: i64,
}

/// Sample the rewards of one harvest
///
/// Exp is drawn before gold. A missing range yields 0 and consumes no draw.
/// Callers run this after [`crate::drop_table::resolve`] on the same sampler.
pub fn rewards<S: Sampler + ?Sized>(definition: &ResourceNodeDefinition, sampler: &mut S) -> Rewards {
    let exp = match definition.exp_range {
        Some(range) => range.sample(sampler),
        None => 0,
    };
    let gold = match definition.gold_range {
        Some(range) => range.sample(sampler),
        None => 0,
    };
    Rewards { exp, gold }
}
