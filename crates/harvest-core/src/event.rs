//! Harvest events and their delivery seam

use crate::{InstanceId, ItemId, TileId};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::mpsc::Sender;

/// A quantity of one item
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemStack {
    pub item: ItemId,
    pub quantity: u32,
}

impl ItemStack {
    pub fn new(item: impl Into<ItemId>, quantity: u32) -> Self {
        Self {
            item: item.into(),
            quantity,
        }
    }
}

/// The one-time bundle produced when a node is depleted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HarvestEvent {
    /// Node that was harvested
    pub instance: InstanceId,
    /// Tile the node was spawned from
    pub tile: TileId,
    /// Resolved loot in slot order
    pub items: Vec<ItemStack>,
    pub exp: i64,
    pub gold: i64,
}

impl HarvestEvent {
    /// True when the harvest yielded no items, exp or gold
    pub fn is_empty(&self) -> bool {
        self.items.is_empty() && self.exp == 0 && self.gold == 0
    }

    /// Sum of all item quantities
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|stack| stack.quantity as u64).sum()
    }
}

/// Receiver of harvest events (inventory, economy, network layer)
///
/// Called exactly once per depleted node, on the thread that dealt the final
/// blow or pick. Implementations must not block for long.
pub trait HarvestSink: Send + Sync {
    fn deliver(&self, event: &HarvestEvent);
}

/// Discards every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl HarvestSink for NullSink {
    fn deliver(&self, _event: &HarvestEvent) {}
}

/// Keeps every delivered event in memory
#[derive(Debug, Default)]
pub struct CollectingSink {
    events: Mutex<Vec<HarvestEvent>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of all events delivered so far, in delivery order
    pub fn events(&self) -> Vec<HarvestEvent> {
        self.events.lock().clone()
    }

    /// Remove and return all events delivered so far
    pub fn take(&self) -> Vec<HarvestEvent> {
        std::mem::take(&mut *self.events.lock())
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}

impl HarvestSink for CollectingSink {
    fn deliver(&self, event: &HarvestEvent) {
        self.events.lock().push(event.clone());
    }
}

impl HarvestSink for Sender<HarvestEvent> {
    fn deliver(&self, event: &HarvestEvent) {
        if self.send(event.clone()).is_err() {
            tracing::warn!(instance = %event.instance, "harvest event receiver disconnected, event dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    fn event(items: Vec<ItemStack>, exp: i64) -> HarvestEvent {
        HarvestEvent {
            instance: InstanceId::new(1),
            tile: TileId::new("tree:0"),
            items,
            exp,
            gold: 0,
        }
    }

    #[test]
    fn test_event_helpers() {
        let empty = event(Vec::new(), 0);
        assert!(empty.is_empty());
        assert_eq!(empty.item_count(), 0);

        let full = event(vec![ItemStack::new("wood", 2), ItemStack::new("seed", 1)], 0);
        assert!(!full.is_empty());
        assert_eq!(full.item_count(), 3);

        assert!(!event(Vec::new(), 5).is_empty());
    }

    #[test]
    fn test_collecting_sink() {
        let sink = CollectingSink::new();
        assert!(sink.is_empty());
        sink.deliver(&event(Vec::new(), 1));
        sink.deliver(&event(Vec::new(), 2));
        assert_eq!(sink.len(), 2);
        assert_eq!(sink.events()[1].exp, 2);

        let taken = sink.take();
        assert_eq!(taken.len(), 2);
        assert!(sink.is_empty());
    }

    #[test]
    fn test_channel_sink() {
        let (tx, rx) = mpsc::channel();
        tx.deliver(&event(vec![ItemStack::new("stone", 1)], 0));
        assert_eq!(rx.recv().unwrap().items[0].item.as_str(), "stone");

        drop(rx);
        // disconnected receivers are tolerated
        tx.deliver(&event(Vec::new(), 0));
    }
}
