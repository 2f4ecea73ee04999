//! Drop table resolution
//!
//! Draw order is part of the contract: replaying the same sampler sequence must
//! reproduce the same loot.
//!
//! - Loot tables: one inclusion draw per slot, in declaration order, for every
//!   slot, even after `drop_max` hits. An included slot with a count range takes
//!   its quantity draw right after its inclusion draw.
//! - Wild plants: one pick trial, then one quantity draw on success.

use crate::{
    definition::{Category, IntRange, ResourceNodeDefinition},
    event::ItemStack,
    rng::Sampler,
};

/// Resolve the loot of one harvest
pub fn resolve<S: Sampler + ?Sized>(
    definition: &ResourceNodeDefinition,
    sampler: &mut S,
) -> Vec<ItemStack> {
    match definition.category {
        Category::WildPlant => resolve_pick(definition, sampler),
        Category::Destructible | Category::Other => resolve_slots(definition, sampler),
    }
}

fn resolve_slots<S: Sampler + ?Sized>(
    definition: &ResourceNodeDefinition,
    sampler: &mut S,
) -> Vec<ItemStack> {
    let cap = definition.drop_max.min(definition.drop_slots.len());
    let mut items = Vec::with_capacity(cap);

    for slot in &definition.drop_slots {
        let roll = sampler.next_unit();
        if roll < slot.probability && items.len() < cap {
            let quantity = sample_quantity(definition.count_range, sampler);
            items.push(ItemStack::new(slot.item.clone(), quantity));
        }
    }

    items
}

fn resolve_pick<S: Sampler + ?Sized>(
    definition: &ResourceNodeDefinition,
    sampler: &mut S,
) -> Vec<ItemStack> {
    if !sampler.chance(definition.pick_probability) {
        return Vec::new();
    }
    let Some(item) = &definition.pickup_item else {
        return Vec::new();
    };
    let quantity = sample_quantity(definition.count_range, sampler);
    vec![ItemStack::new(item.clone(), quantity)]
}

fn sample_quantity<S: Sampler + ?Sized>(range: Option<IntRange>, sampler: &mut S) -> u32 {
    match range {
        Some(range) => range.sample(sampler).clamp(1, u32::MAX as i64) as u32,
        None => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::{GameRng, ScriptedSampler};
    use proptest::prelude::*;

    fn tree1() -> ResourceNodeDefinition {
        ResourceNodeDefinition::new("tree:0", "tree1", Category::Destructible)
            .with_hp(30)
            .with_defense(5)
            .with_slot("wood", 0.75)
            .with_slot("seed", 0.5)
            .with_slot("stick", 0.4)
    }

    fn apple_tree() -> ResourceNodeDefinition {
        ResourceNodeDefinition::new("tree:1", "apple_tree", Category::Destructible)
            .with_hp(40)
            .with_defense(5)
            .with_slot("wood", 0.75)
            .with_slot("seed", 0.5)
            .with_slot("stick", 0.4)
            .with_slot("apple", 0.3)
            .with_drop_max(3)
    }

    fn carrot() -> ResourceNodeDefinition {
        ResourceNodeDefinition::new("part_3:18", "carrot_plant", Category::WildPlant)
            .with_pickup("carrot", 0.4)
            .with_count(IntRange::new(1, 2).unwrap())
    }

    fn items(stacks: &[ItemStack]) -> Vec<&str> {
        stacks.iter().map(|s| s.item.as_str()).collect()
    }

    #[test]
    fn test_slots_in_declaration_order() {
        let mut sampler = ScriptedSampler::new([0.1, 0.9, 0.2]);
        let loot = resolve(&tree1(), &mut sampler);
        assert_eq!(items(&loot), ["wood", "stick"]);
        assert!(loot.iter().all(|s| s.quantity == 1));
        assert_eq!(sampler.draws_taken(), 3);
    }

    #[test]
    fn test_probability_is_strict_upper_bound() {
        let mut sampler = ScriptedSampler::new([0.75, 0.5, 0.4]);
        assert!(resolve(&tree1(), &mut sampler).is_empty());
    }

    #[test]
    fn test_drop_max_caps_but_still_draws() {
        let mut sampler = ScriptedSampler::new([0.0, 0.0, 0.0, 0.0]);
        let loot = resolve(&apple_tree(), &mut sampler);
        assert_eq!(items(&loot), ["wood", "seed", "stick"]);
        // the fourth slot is still evaluated
        assert_eq!(sampler.draws_taken(), 4);
    }

    #[test]
    fn test_count_range_draw_follows_inclusion() {
        let def = tree1().with_count(IntRange::new(1, 3).unwrap());
        // wood hits (qty draw 0.99 -> 3), seed misses, stick hits (qty draw 0.0 -> 1)
        let mut sampler = ScriptedSampler::new([0.1, 0.99, 0.9, 0.1, 0.0]);
        let loot = resolve(&def, &mut sampler);
        assert_eq!(loot, vec![ItemStack::new("wood", 3), ItemStack::new("stick", 1)]);
        assert_eq!(sampler.draws_taken(), 5);
    }

    #[test]
    fn test_pick_success() {
        let mut sampler = ScriptedSampler::new([0.3, 0.0]);
        assert_eq!(resolve(&carrot(), &mut sampler), vec![ItemStack::new("carrot", 1)]);
        assert_eq!(sampler.draws_taken(), 2);
    }

    #[test]
    fn test_pick_failure_takes_one_draw() {
        let mut sampler = ScriptedSampler::new([0.5]);
        assert!(resolve(&carrot(), &mut sampler).is_empty());
        assert_eq!(sampler.draws_taken(), 1);
    }

    #[test]
    fn test_pick_ignores_loot_table() {
        let mut def = carrot();
        def.drop_slots.push(crate::definition::DropSlot::new("wood", 1.0));
        def.drop_max = 1;
        let mut sampler = ScriptedSampler::new([0.0, 0.99]);
        assert_eq!(resolve(&def, &mut sampler), vec![ItemStack::new("carrot", 2)]);
    }

    #[test]
    fn test_empty_table() {
        let def = ResourceNodeDefinition::new("part_3:21", "rock", Category::Destructible).with_hp(5);
        let mut sampler = ScriptedSampler::new([0.0]);
        assert!(resolve(&def, &mut sampler).is_empty());
        assert_eq!(sampler.draws_taken(), 0);
    }

    proptest! {
        #[test]
        fn prop_drop_max_never_exceeded(seed in any::<u64>(), drop_max in 0usize..=4) {
            let def = apple_tree().with_drop_max(drop_max);
            let mut rng = GameRng::new(seed);
            let loot = resolve(&def, &mut rng);
            prop_assert!(loot.len() <= drop_max);
        }

        #[test]
        fn prop_resolution_is_deterministic(seed in any::<u64>()) {
            let def = apple_tree().with_count(IntRange::new(1, 5).unwrap());
            let a = resolve(&def, &mut GameRng::new(seed));
            let b = resolve(&def, &mut GameRng::new(seed));
            prop_assert_eq!(a, b);
        }

        #[test]
        fn prop_draw_count_independent_of_hits(draws in proptest::collection::vec(0.0f64..1.0, 4)) {
            let mut sampler = ScriptedSampler::new(draws);
            resolve(&apple_tree(), &mut sampler);
            prop_assert_eq!(sampler.draws_taken(), 4);
        }
    }
}
