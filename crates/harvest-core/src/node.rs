//! Resource node instances and the harvest state machine
//!
//! ```text
//! Destructible:  Healthy(hp) --apply_damage--> Healthy(hp') ... --> Depleted
//! WildPlant:     Available   --pick-------------------------------> Depleted
//! ```
//!
//! `Depleted` is terminal. All mutation of one node happens under its own lock,
//! so the transition into `Depleted` and the loot/reward draws that go with it
//! form a single step: concurrent final blows yield exactly one
//! [`DamageOutcome::Harvested`] and every other caller sees
//! [`DamageOutcome::AlreadyDepleted`].

use crate::{
    definition::{Category, ResourceNodeDefinition},
    drop_table,
    error::{Error, Result},
    event::HarvestEvent,
    rewards,
    rng::{GameRng, Sampler},
    InstanceId,
};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Lifecycle state of one node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeState {
    /// Destructible node with hit points left
    Healthy { hp_remaining: i64 },
    /// Wild plant waiting to be picked
    Available,
    /// Harvested; terminal
    Depleted,
}

impl NodeState {
    pub fn is_depleted(&self) -> bool {
        matches!(self, NodeState::Depleted)
    }
}

/// Result of [`ResourceNode::apply_damage`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DamageOutcome {
    /// The node absorbed the hit and is still standing
    Damaged { effective: i64, hp_remaining: i64 },
    /// This hit depleted the node; carries the one harvest event
    Harvested(HarvestEvent),
    /// The node was depleted before this hit landed; nothing changed
    AlreadyDepleted,
}

/// Result of [`ResourceNode::pick`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickOutcome {
    /// This pick harvested the plant; the event may carry no items
    Picked(HarvestEvent),
    /// Someone else picked it first
    AlreadyDepleted,
}

#[derive(Debug)]
struct NodeInner {
    state: NodeState,
    rng: GameRng,
}

/// One placed resource node
///
/// Holds a shared read-only reference to its definition and its own seeded
/// sampler, so the draws of its single harvest are reproducible from the seed.
pub struct ResourceNode {
    id: InstanceId,
    definition: Arc<ResourceNodeDefinition>,
    inner: Mutex<NodeInner>,
}

impl ResourceNode {
    /// Spawn a node of the given definition
    ///
    /// `Other` definitions have no harvest behaviour and are rejected, as are
    /// destructibles built without positive `hp`.
    pub fn spawn(id: InstanceId, definition: Arc<ResourceNodeDefinition>, seed: u64) -> Result<Self> {
        let state = match definition.category {
            Category::Destructible => match definition.hp {
                Some(hp) if hp > 0 => NodeState::Healthy { hp_remaining: hp },
                _ => return Err(Error::InvalidDefinition(definition.tile.clone())),
            },
            Category::WildPlant => NodeState::Available,
            Category::Other => return Err(Error::NotHarvestable(definition.tile.clone())),
        };

        Ok(Self {
            id,
            definition,
            inner: Mutex::new(NodeInner {
                state,
                rng: GameRng::new(seed),
            }),
        })
    }

    pub fn id(&self) -> InstanceId {
        self.id
    }

    pub fn definition(&self) -> &Arc<ResourceNodeDefinition> {
        &self.definition
    }

    /// Current state (a snapshot; may change right after)
    pub fn state(&self) -> NodeState {
        self.inner.lock().state
    }

    /// Remaining hit points of a destructible node; 0 once depleted
    pub fn hp_remaining(&self) -> Option<i64> {
        if self.definition.category != Category::Destructible {
            return None;
        }
        match self.state() {
            NodeState::Healthy { hp_remaining } => Some(hp_remaining),
            _ => Some(0),
        }
    }

    pub fn is_depleted(&self) -> bool {
        self.state().is_depleted()
    }

    /// Apply one hit, drawing from the node's own sampler
    pub fn apply_damage(&self, amount: i64) -> Result<DamageOutcome> {
        let mut guard = self.inner.lock();
        let NodeInner { state, rng } = &mut *guard;
        self.damage_locked(state, amount, rng)
    }

    /// Apply one hit, drawing any harvest from `sampler` instead of the node's own
    pub fn apply_damage_with<S: Sampler + ?Sized>(
        &self,
        amount: i64,
        sampler: &mut S,
    ) -> Result<DamageOutcome> {
        let mut guard = self.inner.lock();
        self.damage_locked(&mut guard.state, amount, sampler)
    }

    /// Pick a wild plant, drawing from the node's own sampler
    pub fn pick(&self) -> Result<PickOutcome> {
        let mut guard = self.inner.lock();
        let NodeInner { state, rng } = &mut *guard;
        self.pick_locked(state, rng)
    }

    /// Pick a wild plant, drawing from `sampler` instead of the node's own
    pub fn pick_with<S: Sampler + ?Sized>(&self, sampler: &mut S) -> Result<PickOutcome> {
        let mut guard = self.inner.lock();
        self.pick_locked(&mut guard.state, sampler)
    }

    fn damage_locked<S: Sampler + ?Sized>(
        &self,
        state: &mut NodeState,
        amount: i64,
        sampler: &mut S,
    ) -> Result<DamageOutcome> {
        if self.definition.category != Category::Destructible {
            return Err(Error::NotDamageable(self.definition.tile.clone()));
        }
        if amount <= 0 {
            return Err(Error::InvalidDamage(amount));
        }

        let hp_remaining = match *state {
            NodeState::Healthy { hp_remaining } => hp_remaining,
            _ => {
                tracing::trace!(instance = %self.id, amount, "hit on depleted node ignored");
                return Ok(DamageOutcome::AlreadyDepleted);
            }
        };

        let effective = amount.saturating_sub(self.definition.defense()).max(0);
        let hp_remaining = hp_remaining.saturating_sub(effective);
        tracing::trace!(instance = %self.id, amount, effective, hp_remaining, "damage applied");

        if hp_remaining > 0 {
            *state = NodeState::Healthy { hp_remaining };
            return Ok(DamageOutcome::Damaged {
                effective,
                hp_remaining,
            });
        }

        *state = NodeState::Depleted;
        Ok(DamageOutcome::Harvested(self.harvest(sampler)))
    }

    fn pick_locked<S: Sampler + ?Sized>(
        &self,
        state: &mut NodeState,
        sampler: &mut S,
    ) -> Result<PickOutcome> {
        if !self.definition.is_pickable() {
            return Err(Error::NotPickable(self.definition.tile.clone()));
        }
        if state.is_depleted() {
            tracing::trace!(instance = %self.id, "pick on depleted node ignored");
            return Ok(PickOutcome::AlreadyDepleted);
        }

        *state = NodeState::Depleted;
        Ok(PickOutcome::Picked(self.harvest(sampler)))
    }

    // Must only run under the node lock, right after the transition to Depleted.
    fn harvest<S: Sampler + ?Sized>(&self, sampler: &mut S) -> HarvestEvent {
        let items = drop_table::resolve(&self.definition, sampler);
        let rewards = rewards::rewards(&self.definition, sampler);
        tracing::debug!(
            instance = %self.id,
            tile = %self.definition.tile,
            items = items.len(),
            exp = rewards.exp,
            gold = rewards.gold,
            "node harvested"
        );

        HarvestEvent {
            instance: self.id,
            tile: self.definition.tile.clone(),
            items,
            exp: rewards.exp,
            gold: rewards.gold,
        }
    }
}

impl std::fmt::Debug for ResourceNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceNode")
            .field("id", &self.id)
            .field("tile", &self.definition.tile)
            .field("state", &self.state())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::IntRange;
    use crate::event::ItemStack;
    use crate::rng::ScriptedSampler;

    fn tree1() -> Arc<ResourceNodeDefinition> {
        Arc::new(
            ResourceNodeDefinition::new("tree:0", "tree1", Category::Destructible)
                .with_hp(30)
                .with_defense(5)
                .with_slot("wood", 0.75)
                .with_slot("seed", 0.5)
                .with_slot("stick", 0.4),
        )
    }

    fn carrot() -> Arc<ResourceNodeDefinition> {
        Arc::new(
            ResourceNodeDefinition::new("part_3:18", "carrot_plant", Category::WildPlant)
                .with_pickup("carrot", 0.4)
                .with_count(IntRange::new(1, 2).unwrap()),
        )
    }

    fn node(def: Arc<ResourceNodeDefinition>) -> ResourceNode {
        ResourceNode::spawn(InstanceId::new(1), def, 42).unwrap()
    }

    #[test]
    fn test_initial_states() {
        assert_eq!(node(tree1()).state(), NodeState::Healthy { hp_remaining: 30 });
        assert_eq!(node(tree1()).hp_remaining(), Some(30));
        assert_eq!(node(carrot()).state(), NodeState::Available);
        assert_eq!(node(carrot()).hp_remaining(), None);
    }

    #[test]
    fn test_destructible_without_hp_rejected() {
        let bare = Arc::new(
            ResourceNodeDefinition::new("tree:0", "tree1", Category::Destructible)
                .with_slot("wood", 1.0),
        );
        let err = ResourceNode::spawn(InstanceId::new(1), bare, 0).unwrap_err();
        assert_eq!(err, Error::InvalidDefinition("tree:0".into()));

        for hp in [0, -5] {
            let def = Arc::new(
                ResourceNodeDefinition::new("tree:0", "tree1", Category::Destructible).with_hp(hp),
            );
            assert!(matches!(
                ResourceNode::spawn(InstanceId::new(2), def, 0),
                Err(Error::InvalidDefinition(_))
            ));
        }
    }

    #[test]
    fn test_other_cannot_spawn() {
        let def = Arc::new(ResourceNodeDefinition::new("part_3:21", "fence", Category::Other));
        let err = ResourceNode::spawn(InstanceId::new(1), def, 0).unwrap_err();
        assert_eq!(err, Error::NotHarvestable("part_3:21".into()));
    }

    #[test]
    fn test_defense_reduces_damage() {
        let tree = node(tree1());
        assert_eq!(
            tree.apply_damage(12).unwrap(),
            DamageOutcome::Damaged {
                effective: 7,
                hp_remaining: 23
            }
        );
        // hits at or below defense do nothing but are not errors
        assert_eq!(
            tree.apply_damage(5).unwrap(),
            DamageOutcome::Damaged {
                effective: 0,
                hp_remaining: 23
            }
        );
    }

    #[test]
    fn test_tree1_single_blow_harvest() {
        let tree = node(tree1());
        let mut sampler = ScriptedSampler::new([0.1, 0.6, 0.3]);
        let outcome = tree.apply_damage_with(35, &mut sampler).unwrap();

        let DamageOutcome::Harvested(event) = outcome else {
            panic!("expected a harvest, got {:?}", outcome);
        };
        assert_eq!(event.items, vec![ItemStack::new("wood", 1), ItemStack::new("stick", 1)]);
        assert_eq!((event.exp, event.gold), (0, 0));
        // all three slots evaluated, nothing else drawn
        assert_eq!(sampler.draws_taken(), 3);
        assert_eq!(tree.hp_remaining(), Some(0));
        assert!(tree.is_depleted());
    }

    #[test]
    fn test_depleted_is_idempotent() {
        let tree = node(tree1());
        assert!(matches!(tree.apply_damage(100).unwrap(), DamageOutcome::Harvested(_)));

        for _ in 0..10 {
            assert_eq!(tree.apply_damage(100).unwrap(), DamageOutcome::AlreadyDepleted);
        }
        assert_eq!(tree.state(), NodeState::Depleted);
    }

    #[test]
    fn test_invalid_damage_changes_nothing() {
        let tree = node(tree1());
        assert_eq!(tree.apply_damage(0), Err(Error::InvalidDamage(0)));
        assert_eq!(tree.apply_damage(-4), Err(Error::InvalidDamage(-4)));
        assert_eq!(tree.state(), NodeState::Healthy { hp_remaining: 30 });
    }

    #[test]
    fn test_carrot_pick_success() {
        let plant = node(carrot());
        let mut sampler = ScriptedSampler::new([0.3, 0.0]);
        let outcome = plant.pick_with(&mut sampler).unwrap();

        let PickOutcome::Picked(event) = outcome else {
            panic!("expected a pick, got {:?}", outcome);
        };
        assert_eq!(event.items, vec![ItemStack::new("carrot", 1)]);
        assert!(plant.is_depleted());
    }

    #[test]
    fn test_carrot_pick_failure_still_depletes() {
        let plant = node(carrot());
        let mut sampler = ScriptedSampler::new([0.5]);
        let PickOutcome::Picked(event) = plant.pick_with(&mut sampler).unwrap() else {
            panic!("first pick must harvest");
        };
        assert!(event.items.is_empty());
        assert_eq!(plant.state(), NodeState::Depleted);
        assert_eq!(plant.pick().unwrap(), PickOutcome::AlreadyDepleted);
    }

    #[test]
    fn test_pick_with_reward_range() {
        let mut def = (*carrot()).clone();
        def.exp_range = IntRange::new(2, 2);
        let plant = node(Arc::new(def));
        let mut sampler = ScriptedSampler::new([0.0, 0.0, 0.0]);
        let PickOutcome::Picked(event) = plant.pick_with(&mut sampler).unwrap() else {
            panic!("first pick must harvest");
        };
        assert_eq!(event.exp, 2);
        assert_eq!(sampler.draws_taken(), 3);
    }

    #[test]
    fn test_wrong_action_for_category() {
        assert_eq!(node(carrot()).apply_damage(10), Err(Error::NotDamageable("part_3:18".into())));
        assert_eq!(node(tree1()).pick(), Err(Error::NotPickable("tree:0".into())));
    }

    #[test]
    fn test_own_sampler_is_reproducible() {
        let a = ResourceNode::spawn(InstanceId::new(7), tree1(), 1234).unwrap();
        let b = ResourceNode::spawn(InstanceId::new(7), tree1(), 1234).unwrap();
        assert_eq!(a.apply_damage(50).unwrap(), b.apply_damage(50).unwrap());
    }

    #[test]
    fn test_concurrent_final_blows_yield_one_harvest() {
        let tree = node(tree1());
        // 8 threads x 4 hits x 6 damage (1 effective each) = 32 effective >= 30 hp
        let outcomes: Vec<DamageOutcome> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    s.spawn(|| {
                        (0..4)
                            .map(|_| tree.apply_damage(6).unwrap())
                            .collect::<Vec<_>>()
                    })
                })
                .collect();
            handles
                .into_iter()
                .flat_map(|h| h.join().unwrap())
                .collect()
        });

        let harvested = outcomes
            .iter()
            .filter(|o| matches!(o, DamageOutcome::Harvested(_)))
            .count();
        let late = outcomes
            .iter()
            .filter(|o| matches!(o, DamageOutcome::AlreadyDepleted))
            .count();
        assert_eq!(harvested, 1);
        // no lost updates: exactly 30 hits were needed
        assert_eq!(late, 2);
    }
}
