//! The live world of placed resource nodes

use crate::config::WorldConfig;
use crate::error::Result;
use harvest_core::{
    DamageOutcome, Error as CoreError, HarvestEvent, HarvestSink, InstanceId, NodeState, NullSink,
    PickOutcome, ResourceNode, TileId,
};
use harvest_schema::Registry;
use indexmap::IndexMap;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Owns the live Instances and routes actions to them
///
/// The registry is shared read-only. The instance table sits behind a
/// read-write lock; each node guards its own state, so actions on different
/// nodes never wait on each other beyond the table lookup.
pub struct World {
    registry: Arc<Registry>,
    config: WorldConfig,
    sink: Arc<dyn HarvestSink>,
    nodes: RwLock<IndexMap<InstanceId, Arc<ResourceNode>>>,
    next_id: AtomicU64,
}

impl World {
    /// Create an empty world whose harvest events are dropped
    pub fn new(registry: Arc<Registry>, config: WorldConfig) -> Self {
        Self::with_sink(registry, config, Arc::new(NullSink))
    }

    /// Create an empty world delivering harvest events to `sink`
    pub fn with_sink(
        registry: Arc<Registry>,
        config: WorldConfig,
        sink: Arc<dyn HarvestSink>,
    ) -> Self {
        tracing::info!(
            definitions = registry.len(),
            global_seed = config.global_seed(),
            core_count = config.core_count(),
            "world created"
        );
        Self {
            registry,
            config,
            sink,
            nodes: RwLock::new(IndexMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Place a new node of the given tile
    pub fn spawn(&self, tile: impl Into<TileId>) -> Result<InstanceId> {
        let tile = tile.into();
        let definition = self.registry.lookup(&tile).map_err(|err| {
            tracing::warn!(tile = %tile, "spawn of unknown tile");
            err
        })?;

        let id = InstanceId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        let node = ResourceNode::spawn(id, definition, self.config.instance_seed(id))?;
        self.nodes.write().insert(id, Arc::new(node));
        tracing::debug!(instance = %id, tile = %tile, "node spawned");
        Ok(id)
    }

    /// Remove one node regardless of its state
    pub fn despawn(&self, id: InstanceId) -> Result<Arc<ResourceNode>> {
        let node = self
            .nodes
            .write()
            .shift_remove(&id)
            .ok_or(CoreError::UnknownInstance(id))?;
        tracing::debug!(instance = %id, "node despawned");
        Ok(node)
    }

    pub fn node(&self, id: InstanceId) -> Result<Arc<ResourceNode>> {
        self.nodes
            .read()
            .get(&id)
            .cloned()
            .ok_or_else(|| CoreError::UnknownInstance(id).into())
    }

    /// Hit one node; a resulting harvest is delivered to the sink
    pub fn apply_damage(&self, id: InstanceId, amount: i64) -> Result<DamageOutcome> {
        let outcome = self.node(id)?.apply_damage(amount)?;
        if let DamageOutcome::Harvested(event) = &outcome {
            self.deliver(event);
        }
        Ok(outcome)
    }

    /// Pick one wild plant; the harvest is delivered to the sink
    pub fn pick(&self, id: InstanceId) -> Result<PickOutcome> {
        let outcome = self.node(id)?.pick()?;
        if let PickOutcome::Picked(event) = &outcome {
            self.deliver(event);
        }
        Ok(outcome)
    }

    /// Apply the same hit to many nodes in parallel
    ///
    /// Work is split across `core_count` scoped threads. Outcomes come back in
    /// the order of `ids`; a repeated id is hit once per occurrence.
    pub fn area_damage(&self, ids: &[InstanceId], amount: i64) -> Vec<Result<DamageOutcome>> {
        let workers = self.config.core_count().min(ids.len());
        if workers <= 1 {
            return ids.iter().map(|&id| self.apply_damage(id, amount)).collect();
        }

        let chunk_size = ids.len().div_ceil(workers);
        std::thread::scope(|scope| {
            let handles: Vec<_> = ids
                .chunks(chunk_size)
                .map(|chunk| {
                    scope.spawn(move || {
                        chunk
                            .iter()
                            .map(|&id| self.apply_damage(id, amount))
                            .collect::<Vec<_>>()
                    })
                })
                .collect();

            let mut outcomes = Vec::with_capacity(ids.len());
            for handle in handles {
                match handle.join() {
                    Ok(chunk) => outcomes.extend(chunk),
                    Err(panic) => std::panic::resume_unwind(panic),
                }
            }
            outcomes
        })
    }

    /// Despawn every depleted node, returning how many were removed
    pub fn remove_depleted(&self) -> usize {
        let mut nodes = self.nodes.write();
        let before = nodes.len();
        nodes.retain(|id, node| {
            let keep = !node.is_depleted();
            if !keep {
                tracing::debug!(instance = %id, "depleted node despawned");
            }
            keep
        });
        before - nodes.len()
    }

    /// Wild plants that can still be picked, in spawn order
    pub fn pickable_nodes(&self) -> Vec<InstanceId> {
        self.nodes
            .read()
            .values()
            .filter(|node| node.state() == NodeState::Available)
            .map(|node| node.id())
            .collect()
    }

    /// All live instance ids, in spawn order
    pub fn ids(&self) -> Vec<InstanceId> {
        self.nodes.read().keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.nodes.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.read().is_empty()
    }

    fn deliver(&self, event: &HarvestEvent) {
        self.sink.deliver(event);
    }
}

impl std::fmt::Debug for World {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World")
            .field("definitions", &self.registry.len())
            .field("nodes", &self.len())
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use harvest_core::{CollectingSink, ItemStack, PropertyBag, Value};

    fn bag(entries: &[(&str, Value)]) -> PropertyBag {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn registry() -> Arc<Registry> {
        let bags = vec![
            (
                "tree:0",
                bag(&[
                    ("HP", Value::Int(30)),
                    ("defense", Value::Int(5)),
                    ("drop1_Probability", Value::Float(1.0)),
                    ("drop_type", Value::from("\"wood\"")),
                ]),
            ),
            (
                "part_3:18",
                bag(&[
                    ("allow_pick", Value::Bool(true)),
                    ("pickup_object", Value::from("carrot")),
                    ("count_min", Value::Int(1)),
                    ("count_max", Value::Int(2)),
                ]),
            ),
            ("fence:0", bag(&[("base", Value::from("fence"))])),
        ];
        Arc::new(Registry::load(bags).unwrap())
    }

    fn world() -> (World, Arc<CollectingSink>) {
        let sink = Arc::new(CollectingSink::new());
        let world = World::with_sink(registry(), WorldConfig::default(), sink.clone());
        (world, sink)
    }

    #[test]
    fn test_spawn_and_lookup() {
        let (world, _) = world();
        let a = world.spawn("tree:0").unwrap();
        let b = world.spawn("part_3:18").unwrap();
        assert_ne!(a, b);
        assert_eq!(world.ids(), vec![a, b]);
        assert_eq!(world.node(a).unwrap().hp_remaining(), Some(30));
        assert_eq!(world.pickable_nodes(), vec![b]);
    }

    #[test]
    fn test_spawn_errors() {
        let (world, _) = world();
        let err = world.spawn("nope").unwrap_err();
        assert_eq!(
            err.as_core(),
            Some(&CoreError::UnknownTileId(TileId::new("nope")))
        );

        let err = world.spawn("fence:0").unwrap_err();
        assert!(matches!(err, Error::Core(CoreError::NotHarvestable(_))));
        assert!(world.is_empty());
    }

    #[test]
    fn test_unknown_instance() {
        let (world, _) = world();
        let missing = InstanceId::new(999);
        assert!(matches!(
            world.apply_damage(missing, 10),
            Err(Error::Core(CoreError::UnknownInstance(id))) if id == missing
        ));
        assert!(world.pick(missing).is_err());
        assert!(world.despawn(missing).is_err());
    }

    #[test]
    fn test_harvest_delivered_once() {
        let (world, sink) = world();
        let id = world.spawn("tree:0").unwrap();

        // 35 - 5 defense = 30 effective
        let outcome = world.apply_damage(id, 35).unwrap();
        assert!(matches!(outcome, DamageOutcome::Harvested(_)));
        assert_eq!(
            world.apply_damage(id, 35).unwrap(),
            DamageOutcome::AlreadyDepleted
        );

        let events = sink.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].instance, id);
        assert_eq!(events[0].items, vec![ItemStack::new("wood", 1)]);
    }

    #[test]
    fn test_pick_delivers_event() {
        let (world, sink) = world();
        let id = world.spawn("part_3:18").unwrap();
        assert!(matches!(world.pick(id).unwrap(), PickOutcome::Picked(_)));
        assert_eq!(world.pick(id).unwrap(), PickOutcome::AlreadyDepleted);
        assert!(world.pickable_nodes().is_empty());

        let events = sink.take();
        assert_eq!(events.len(), 1);
        let quantity = events[0].items[0].quantity;
        assert!((1..=2).contains(&quantity));
    }

    #[test]
    fn test_wrong_action_for_category() {
        let (world, sink) = world();
        let tree = world.spawn("tree:0").unwrap();
        let plant = world.spawn("part_3:18").unwrap();
        assert!(matches!(
            world.pick(tree),
            Err(Error::Core(CoreError::NotPickable(_)))
        ));
        assert!(matches!(
            world.apply_damage(plant, 5),
            Err(Error::Core(CoreError::NotDamageable(_)))
        ));
        assert!(matches!(
            world.apply_damage(tree, 0),
            Err(Error::Core(CoreError::InvalidDamage(0)))
        ));
        assert!(sink.is_empty());
    }

    #[test]
    fn test_remove_depleted() {
        let (world, _) = world();
        let a = world.spawn("tree:0").unwrap();
        let b = world.spawn("tree:0").unwrap();
        world.apply_damage(a, 100).unwrap();

        assert_eq!(world.remove_depleted(), 1);
        assert_eq!(world.ids(), vec![b]);
        assert_eq!(world.remove_depleted(), 0);
    }

    #[test]
    fn test_despawn() {
        let (world, _) = world();
        let id = world.spawn("tree:0").unwrap();
        let node = world.despawn(id).unwrap();
        assert_eq!(node.id(), id);
        assert!(world.is_empty());
    }

    #[test]
    fn test_area_damage_keeps_input_order() {
        let sink = Arc::new(CollectingSink::new());
        let config = WorldConfig::default().with_core_count(4);
        let world = World::with_sink(registry(), config, sink.clone());

        let ids: Vec<_> = (0..9).map(|_| world.spawn("tree:0").unwrap()).collect();
        let plant = world.spawn("part_3:18").unwrap();

        let mut targets = ids.clone();
        targets.push(plant);
        let outcomes = world.area_damage(&targets, 20);

        assert_eq!(outcomes.len(), 10);
        for outcome in &outcomes[..9] {
            assert_eq!(
                outcome.as_ref().unwrap(),
                &DamageOutcome::Damaged {
                    effective: 15,
                    hp_remaining: 15
                }
            );
        }
        assert!(outcomes[9].is_err());

        let outcomes = world.area_damage(&ids, 20);
        assert!(outcomes
            .iter()
            .all(|o| matches!(o, Ok(DamageOutcome::Harvested(_)))));
        assert_eq!(sink.len(), 9);
    }

    #[test]
    fn test_same_seed_same_events() {
        let run = || {
            let sink = Arc::new(CollectingSink::new());
            let world = World::with_sink(
                registry(),
                WorldConfig::default().with_global_seed(77),
                sink.clone(),
            );
            for _ in 0..20 {
                let id = world.spawn("part_3:18").unwrap();
                world.pick(id).unwrap();
            }
            sink.take()
        };
        assert_eq!(run(), run());
    }
}
