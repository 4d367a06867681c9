//! Selectors (spec §4.6): priority-driven node enumeration for coarsening.
//!
//! Both selectors share the same queue/flagged-set machinery
//! (`SelectorState`), composing it the way the original's
//! `NeighborSelector` base class factors `AbstractSelector` — Rust
//! composition standing in for the C++ inheritance.

use std::collections::BTreeMap;

use mlg_core::{Id, Result};
use mlg_store::{Direction, IdSet, ObjectKind, StoreAdapter};

/// Shared priority-queue state: a node -> score map (acting as the mutable
/// priority queue — ties broken by id ascending when scanning for the
/// best), the flagged (already-merged) set, and the bookkeeping for the
/// node currently popped as root.
#[derive(Debug, Default)]
pub struct SelectorState {
    pub memory_mode: bool,
    flagged: IdSet,
    scores: BTreeMap<Id, f64>,
    root: Id,
    cur_neighbors: IdSet,
}

impl SelectorState {
    pub fn new(memory_mode: bool) -> Self {
        SelectorState {
            memory_mode,
            flagged: IdSet::new(),
            scores: BTreeMap::new(),
            root: Id::INVALID,
            cur_neighbors: IdSet::new(),
        }
    }

    fn reset(&mut self) {
        self.flagged = IdSet::new();
        self.scores.clear();
        self.root = Id::INVALID;
        self.cur_neighbors = IdSet::new();
    }

    /// HLink neighbors of `node`, minus the flagged set when in memory
    /// mode (flagged nodes are treated as absent).
    pub fn neighbors_of(&self, store: &dyn StoreAdapter, node: Id) -> IdSet {
        let n = store.neighbors(node, ObjectKind::HLink, Direction::Any);
        if self.memory_mode {
            n.difference(&self.flagged)
        } else {
            n
        }
    }

    /// Highest-scoring node, ties broken by id ascending. Scanning a
    /// `BTreeMap` in key order and keeping strictly-greater scores gives
    /// exactly that tie-break for free.
    fn pick_best(&self) -> Id {
        let mut best = Id::INVALID;
        let mut best_score = f64::NEG_INFINITY;
        for (&id, &score) in self.scores.iter() {
            if score > best_score {
                best_score = score;
                best = id;
            }
        }
        best
    }

    /// The queue in score-descending, id-ascending order (spec §8
    /// property 5's shape), for tests.
    pub fn ranked_ids(&self) -> Vec<Id> {
        let mut v: Vec<(Id, f64)> = self.scores.iter().map(|(&k, &s)| (k, s)).collect();
        v.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap().then(a.0.cmp(&b.0)));
        v.into_iter().map(|(id, _)| id).collect()
    }
}

/// Common contract for coarsening selectors.
pub trait Selector {
    /// Computes every node's score on `layer` and populates the queue.
    fn rank(&mut self, store: &dyn StoreAdapter, layer: Id) -> Result<()>;

    fn has_next(&self) -> bool;

    /// The current best node. `pop = true` also fixes it as the root for
    /// `get_nodes_to_merge` and removes it from the queue.
    fn next(&mut self, store: &dyn StoreAdapter, pop: bool) -> Id;

    /// The neighborhood selected for merging into the current root.
    fn get_nodes_to_merge(&self) -> IdSet;

    /// Call after a merge involving `root` completes: optionally flags
    /// `root` as merged, optionally drops the merged neighborhood from the
    /// queue, and recomputes affected scores.
    fn flag_and_update(
        &mut self,
        store: &dyn StoreAdapter,
        root: Id,
        remove_neighbors: bool,
        with_flagged: bool,
    );

    fn memory_mode(&self) -> bool;
}

/// Score of a node is the weight of its heaviest incident `HLink` (0 if
/// none); merging absorbs the single neighbor at the other end of that
/// edge.
#[derive(Debug, Default)]
pub struct HeavyHLinkSelector {
    state: SelectorState,
    pending_update: IdSet,
}

impl HeavyHLinkSelector {
    pub fn new(memory_mode: bool) -> Self {
        HeavyHLinkSelector {
            state: SelectorState::new(memory_mode),
            pending_update: IdSet::new(),
        }
    }

    /// `(weight, neighbor)` of the heaviest incident HLink, or `(0.0,
    /// Id::INVALID)` if `node` has none.
    fn best_endpoint(&self, store: &dyn StoreAdapter, node: Id) -> (f64, Id) {
        let mut best_w = 0.0;
        let mut best = Id::INVALID;
        for m in self.state.neighbors_of(store, node).iter() {
            let e = store.find_edge(ObjectKind::HLink, node, m);
            let Some(e) = e else { continue };
            let w = store.get_attr(e, "weight").and_then(|v| v.as_f64()).unwrap_or(1.0);
            if w >= best_w {
                best_w = w;
                best = m;
            }
        }
        (best_w, best)
    }

    fn calc_score(&self, store: &dyn StoreAdapter, node: Id) -> f64 {
        self.best_endpoint(store, node).0
    }
}

impl Selector for HeavyHLinkSelector {
    fn rank(&mut self, store: &dyn StoreAdapter, layer: Id) -> Result<()> {
        self.state.reset();
        self.pending_update = IdSet::new();
        let nodes = store.neighbors(layer, ObjectKind::Owns, Direction::Outgoing);
        let scored: Vec<(Id, f64)> = nodes.iter().map(|n| (n, self.calc_score(store, n))).collect();
        for (n, s) in scored {
            self.state.scores.insert(n, s);
        }
        self.state.root = self.state.pick_best();
        Ok(())
    }

    fn has_next(&self) -> bool {
        !self.state.scores.is_empty()
    }

    fn next(&mut self, store: &dyn StoreAdapter, pop: bool) -> Id {
        let candidate = self.state.pick_best();
        if pop {
            self.state.root = candidate;
            let (_, best) = self.best_endpoint(store, candidate);
            self.state.cur_neighbors = if best.is_valid() {
                IdSet::single(best)
            } else {
                IdSet::new()
            };
            self.pending_update = if best.is_valid() {
                self.state
                    .neighbors_of(store, candidate)
                    .intersection(&self.state.neighbors_of(store, best))
            } else {
                IdSet::new()
            };
            if candidate.is_valid() {
                self.state.scores.remove(&candidate);
            }
        }
        candidate
    }

    fn get_nodes_to_merge(&self) -> IdSet {
        self.state.cur_neighbors.clone()
    }

    fn flag_and_update(
        &mut self,
        store: &dyn StoreAdapter,
        root: Id,
        remove_neighbors: bool,
        with_flagged: bool,
    ) {
        if with_flagged {
            self.state.flagged.add(root);
        }
        if remove_neighbors {
            for n in self.state.cur_neighbors.iter() {
                self.state.scores.remove(&n);
            }
        }
        // Triangle endpoints only: nodes that were neighbors of both root
        // and the absorbed neighbor. Update only if the (now-merged) edge
        // from root is heavier than their current queued score.
        for id in self.pending_update.iter() {
            if id == root {
                continue;
            }
            if self.state.memory_mode && self.state.flagged.exists(id) {
                continue;
            }
            let Some(e) = store.find_edge(ObjectKind::HLink, root, id) else {
                continue;
            };
            let w = store.get_attr(e, "weight").and_then(|v| v.as_f64()).unwrap_or(1.0);
            if let Some(&cur) = self.state.scores.get(&id) {
                if w > cur {
                    self.state.scores.insert(id, w);
                }
            }
        }
        if !with_flagged {
            let s = self.calc_score(store, root);
            self.state.scores.insert(root, s);
        }
        self.state.cur_neighbors = IdSet::new();
        self.pending_update = IdSet::new();
    }

    fn memory_mode(&self) -> bool {
        self.state.memory_mode
    }
}

/// Score of a node balances local centrality against how much of a hub
/// its neighborhood already is (spec §4.6).
#[derive(Debug, Default)]
pub struct XSelector {
    state: SelectorState,
}

impl XSelector {
    pub fn new(memory_mode: bool) -> Self {
        XSelector {
            state: SelectorState::new(memory_mode),
        }
    }

    fn hlink_weight(store: &dyn StoreAdapter, a: Id, b: Id) -> f64 {
        store
            .find_edge(ObjectKind::HLink, a, b)
            .and_then(|e| store.get_attr(e, "weight"))
            .and_then(|v| v.as_f64())
            .unwrap_or(0.0)
    }

    fn root_centrality(&self, store: &dyn StoreAdapter, node: Id) -> f64 {
        let neighbors = self.state.neighbors_of(store, node);
        let trav_weight: f64 = neighbors
            .iter()
            .map(|m| Self::hlink_weight(store, node, m))
            .sum();
        let mut inner_weight = 0.0;
        let ns: Vec<Id> = neighbors.iter().collect();
        for (i, &a) in ns.iter().enumerate() {
            for &b in &ns[i + 1..] {
                inner_weight += Self::hlink_weight(store, a, b);
            }
        }
        trav_weight / (1.0 + inner_weight)
    }

    fn two_hop_hub_affinity(&self, store: &dyn StoreAdapter, node: Id) -> f64 {
        let neighbors = self.state.neighbors_of(store, node);
        let mut horizon = neighbors.clone();
        horizon.add(node);
        let mut outward = IdSet::new();
        for m in neighbors.iter() {
            for e in self.state.neighbors_of(store, m).iter() {
                if !horizon.exists(e) {
                    outward.add(e);
                }
            }
        }
        (outward.count() as f64).max(1.0)
    }

    fn gravity(&self, store: &dyn StoreAdapter, node: Id) -> f64 {
        let neighbors = self.state.neighbors_of(store, node);
        let weight_of = |id: Id| {
            store
                .get_attr(id, "weight")
                .and_then(|v| v.as_f64())
                .unwrap_or(1.0)
        };
        weight_of(node) + neighbors.iter().map(weight_of).sum::<f64>()
    }

    fn calc_score(&self, store: &dyn StoreAdapter, node: Id) -> f64 {
        let r = self.root_centrality(store, node);
        let h = self.two_hop_hub_affinity(store, node);
        let g = self.gravity(store, node);
        r / (g * h)
    }
}

impl Selector for XSelector {
    fn rank(&mut self, store: &dyn StoreAdapter, layer: Id) -> Result<()> {
        self.state.reset();
        let nodes = store.neighbors(layer, ObjectKind::Owns, Direction::Outgoing);
        let scored: Vec<(Id, f64)> = nodes.iter().map(|n| (n, self.calc_score(store, n))).collect();
        for (n, s) in scored {
            self.state.scores.insert(n, s);
        }
        self.state.root = self.state.pick_best();
        Ok(())
    }

    fn has_next(&self) -> bool {
        !self.state.scores.is_empty()
    }

    fn next(&mut self, store: &dyn StoreAdapter, pop: bool) -> Id {
        let candidate = self.state.pick_best();
        if pop {
            self.state.root = candidate;
            self.state.cur_neighbors = self.state.neighbors_of(store, candidate);
            self.state.scores.remove(&candidate);
        }
        candidate
    }

    fn get_nodes_to_merge(&self) -> IdSet {
        self.state.cur_neighbors.clone()
    }

    fn flag_and_update(
        &mut self,
        store: &dyn StoreAdapter,
        root: Id,
        remove_neighbors: bool,
        with_flagged: bool,
    ) {
        if with_flagged {
            self.state.flagged.add(root);
        }
        if remove_neighbors {
            for n in self.state.cur_neighbors.iter() {
                self.state.scores.remove(&n);
            }
        }
        let one_hop = self.state.neighbors_of(store, root);
        let mut two_hop = one_hop.clone();
        for m in one_hop.iter() {
            two_hop = two_hop.union(&self.state.neighbors_of(store, m));
        }
        two_hop.remove(root);
        for id in two_hop.iter() {
            if self.state.memory_mode && self.state.flagged.exists(id) {
                continue;
            }
            if store.find(ObjectKind::Node, id).is_none() {
                self.state.scores.remove(&id);
                continue;
            }
            let s = self.calc_score(store, id);
            self.state.scores.insert(id, s);
        }
        if !with_flagged {
            let s = self.calc_score(store, root);
            self.state.scores.insert(root, s);
        }
        self.state.cur_neighbors = IdSet::new();
    }

    fn memory_mode(&self) -> bool {
        self.state.memory_mode
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mlg_core::AttrMap;
    use mlg_dao::{LayerDao, MlgDao, NodeLinkDao};
    use mlg_store::MemStore;

    fn five_node_graph() -> (MemStore, Id, [Id; 5]) {
        let mut store = MemStore::new();
        let base = LayerDao::add_base_layer(&mut store).unwrap();
        let mut attrs = |w: f64| {
            let mut m = AttrMap::new();
            m.insert("weight".into(), mlg_core::AttrValue::Double(w));
            m
        };
        let n1 = MlgDao::add_node_to_layer(&mut store, base, attrs(1.0), None).unwrap();
        let n2 = MlgDao::add_node_to_layer(&mut store, base, attrs(100.0), None).unwrap();
        let n3 = MlgDao::add_node_to_layer(&mut store, base, attrs(1.0), None).unwrap();
        let n4 = MlgDao::add_node_to_layer(&mut store, base, attrs(1.0), None).unwrap();
        let n5 = MlgDao::add_node_to_layer(&mut store, base, attrs(1.0), None).unwrap();
        NodeLinkDao::create_hlink(&mut store, n1, n2, Some(5.0)).unwrap();
        NodeLinkDao::create_hlink(&mut store, n1, n4, Some(4.0)).unwrap();
        NodeLinkDao::create_hlink(&mut store, n2, n5, Some(3.0)).unwrap();
        NodeLinkDao::create_hlink(&mut store, n1, n3, Some(1.0)).unwrap();
        NodeLinkDao::create_hlink(&mut store, n2, n3, Some(1.0)).unwrap();
        (store, base, [n1, n2, n3, n4, n5])
    }

    #[test]
    fn heavy_hlink_scores_are_descending_ties_ascending() {
        let (store, base, nodes) = five_node_graph();
        let mut sel = HeavyHLinkSelector::new(false);
        sel.rank(&store, base).unwrap();
        let ranked = sel.state.ranked_ids();
        let mut last = f64::INFINITY;
        for id in &ranked {
            let s = *sel.state.scores.get(id).unwrap_or(&sel.calc_score(&store, *id));
            assert!(s <= last + 1e-9);
            last = s;
        }
        let _ = nodes;
    }

    #[test]
    fn heavy_hlink_picks_n1_n2_as_highest_weight_edge() {
        let (store, base, nodes) = five_node_graph();
        let mut sel = HeavyHLinkSelector::new(false);
        sel.rank(&store, base).unwrap();
        let root = sel.next(&store, true);
        assert!(root == nodes[0] || root == nodes[1]);
        let merge_set = sel.get_nodes_to_merge();
        assert_eq!(merge_set.count(), 1);
    }
}
