//! The time-series cache (spec §4.10): an LRU map from node id to a
//! sliding [`TimeSeries`], bound to one session and discarded on commit.

use std::collections::{BTreeMap, VecDeque};

use mlg_core::Id;
use mlg_dao::{LayerDao, MlgDao, SignalDirection};
use mlg_store::StoreAdapter;

use crate::time_series::{TimeSeries, TsDirection};

fn to_signal_direction(dir: TsDirection) -> SignalDirection {
    match dir {
        TsDirection::Past => SignalDirection::Past,
        TsDirection::Future => SignalDirection::Future,
        TsDirection::Both => SignalDirection::Both,
    }
}

/// Walks `steps` layers from `start` in `direction`; stops early at a
/// stack boundary, returning the farthest reached layer and the number
/// of hops actually taken.
fn walk(store: &dyn StoreAdapter, start: Id, up: bool, steps: usize) -> (Id, usize) {
    let mut cur = start;
    let mut hops = 0;
    for _ in 0..steps {
        let next = if up {
            LayerDao::parent(store, cur)
        } else {
            LayerDao::child(store, cur)
        };
        if !next.is_valid() {
            break;
        }
        cur = next;
        hops += 1;
    }
    (cur, hops)
}

/// `(bottom, top, offset_of_active_layer_from_bottom)` for the active
/// window around `active_layer`.
fn window_bounds(
    store: &dyn StoreAdapter,
    active_layer: Id,
    radius: usize,
    direction: TsDirection,
) -> (Id, Id, usize) {
    match direction {
        TsDirection::Past => {
            let (bottom, hops) = walk(store, active_layer, false, radius);
            (bottom, active_layer, hops)
        }
        TsDirection::Future => {
            let (top, _) = walk(store, active_layer, true, radius);
            (active_layer, top, 0)
        }
        TsDirection::Both => {
            let (bottom, hops) = walk(store, active_layer, false, radius);
            let (top, _) = walk(store, active_layer, true, radius);
            (bottom, top, hops)
        }
    }
}

/// An LRU map from node id to its [`TimeSeries`] of observations around
/// the cache's active layer. `capacity = usize::MAX` (the default) means
/// unbounded.
#[derive(Debug)]
pub struct TimeSeriesCache {
    capacity: usize,
    active_layer: Id,
    radius: usize,
    direction: TsDirection,
    order: VecDeque<Id>,
    entries: BTreeMap<Id, TimeSeries>,
}

impl Default for TimeSeriesCache {
    fn default() -> Self {
        TimeSeriesCache {
            capacity: usize::MAX,
            active_layer: Id::INVALID,
            radius: 0,
            direction: TsDirection::Both,
            order: VecDeque::new(),
            entries: BTreeMap::new(),
        }
    }
}

impl TimeSeriesCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        TimeSeriesCache {
            capacity,
            ..Self::default()
        }
    }

    /// Resets the window configuration. Existing entries are dropped: the
    /// active layer they were built around is no longer current.
    pub fn set_active_layer(&mut self, layer: Id) {
        self.active_layer = layer;
        self.entries.clear();
        self.order.clear();
    }

    pub fn set_radius(&mut self, radius: usize) {
        self.radius = radius;
    }

    pub fn set_direction(&mut self, direction: TsDirection) {
        self.direction = direction;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn touch(&mut self, node: Id) {
        self.order.retain(|&n| n != node);
        self.order.push_front(node);
    }

    fn evict_if_over_capacity(&mut self) {
        while self.order.len() > self.capacity {
            if let Some(victim) = self.order.pop_back() {
                self.entries.remove(&victim);
            } else {
                break;
            }
        }
    }

    /// On hit, returns the cached series; on miss, builds it from
    /// [`MlgDao::get_signal`] over the configured window and inserts it at
    /// the front, evicting the LRU tail if over capacity.
    pub fn get(&mut self, store: &dyn StoreAdapter, node: Id) -> &TimeSeries {
        if !self.entries.contains_key(&node) {
            let (bottom, top, offset) =
                window_bounds(store, self.active_layer, self.radius, self.direction);
            let weights = MlgDao::get_signal(store, node, bottom, top);
            let mut ts = TimeSeries::new();
            ts.set_radius(self.radius);
            ts.set_direction(self.direction);
            for w in weights {
                ts.push_back(w);
            }
            ts.scroll(offset as isize);
            self.entries.insert(node, ts);
        }
        self.touch(node);
        self.evict_if_over_capacity();
        self.entries.get(&node).expect("just inserted or present")
    }

    /// Advances every cached entry's `current` by +1, used when the
    /// operator moves from layer *k* to *k+1*.
    pub fn scroll(&mut self) {
        for ts in self.entries.values_mut() {
            ts.scroll(1);
        }
    }

    /// Appends (or prepends) the `OLink` weight at `new_layer` to every
    /// cached entry.
    pub fn update_entries(&mut self, store: &dyn StoreAdapter, new_layer: Id, push_back: bool) {
        let ids: Vec<Id> = self.entries.keys().copied().collect();
        for node in ids {
            let weight = MlgDao::get_signal(store, node, new_layer, new_layer)
                .into_iter()
                .next()
                .unwrap_or(mlg_core::DEFAULT_WEIGHT);
            if let Some(ts) = self.entries.get_mut(&node) {
                if push_back {
                    ts.push_back(weight);
                } else {
                    ts.push_front(weight);
                }
            }
        }
    }
}
