//! The component extractor (spec §4.13): builds a dynamic graph by
//! thresholding observations, runs connected components over it, and
//! assigns layout coordinates.

use std::collections::{BTreeMap, BTreeSet};

use mlg_core::{Id, Result};
use mlg_dao::{LayerDao, NodeLinkDao};
use mlg_store::{Direction, ObjectKind, StoreAdapter};

use crate::types::{DyEdgeKind, DyNodeId, DynamicEdge, DynamicGraph, DynamicNode};
use crate::union_find::UnionFind;

const NODE_X_SPACING: i64 = 3;
const NODE_Y_SPACING: i64 = 1;

/// Runs the extraction pipeline over one MLG database.
#[derive(Debug, Default)]
pub struct ComponentExtractor {
    alpha_override: Option<f64>,
    group_attr: Option<String>,
}

impl ComponentExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_alpha_override(&mut self, alpha: Option<f64>) {
        self.alpha_override = alpha;
    }

    pub fn set_group_attr(&mut self, attr: Option<String>) {
        self.group_attr = attr;
    }

    fn group_of(&self, store: &dyn StoreAdapter, node: Id) -> Option<String> {
        let attr = self.group_attr.as_ref()?;
        store
            .get_attr(node, attr)
            .and_then(|v| v.as_str().map(str::to_string))
    }

    /// `max(|max|, |min|) / 2` over OLink weights, one threshold per group
    /// (or a single threshold over all nodes when no group attribute is
    /// configured).
    fn compute_thresholds(
        &self,
        store: &dyn StoreAdapter,
        base_nodes: &[Id],
        layers: &[Id],
    ) -> BTreeMap<Option<String>, f64> {
        if let Some(alpha) = self.alpha_override {
            let mut out = BTreeMap::new();
            out.insert(None, alpha);
            return out;
        }

        let mut extremes: BTreeMap<Option<String>, (f64, f64)> = BTreeMap::new();
        for &layer in layers {
            for &node in base_nodes {
                let olink = NodeLinkDao::find_olink(store, layer, node);
                if !olink.is_valid() {
                    continue;
                }
                let Some(w) = store.get_attr(olink, "weight").and_then(|v| v.as_f64()) else {
                    continue;
                };
                let key = self.group_of(store, node);
                let entry = extremes.entry(key).or_insert((0.0, 0.0));
                entry.0 = entry.0.max(w);
                entry.1 = entry.1.min(w);
            }
        }

        extremes
            .into_iter()
            .map(|(k, (max_v, min_v))| (k, max_v.abs().max(min_v.abs()) / 2.0))
            .collect()
    }

    /// The base topology's HLinks, as unordered pairs with `a < b`.
    fn base_hlinks(&self, store: &dyn StoreAdapter, base_nodes: &[Id]) -> BTreeSet<(Id, Id)> {
        let mut out = BTreeSet::new();
        for &n in base_nodes {
            for m in store.neighbors(n, ObjectKind::HLink, Direction::Any).iter() {
                let pair = if n < m { (n, m) } else { (m, n) };
                out.insert(pair);
            }
        }
        out
    }

    fn active_at(
        &self,
        store: &dyn StoreAdapter,
        layer: Id,
        base_nodes: &[Id],
        thresholds: &BTreeMap<Option<String>, f64>,
    ) -> BTreeMap<Id, f64> {
        let mut active = BTreeMap::new();
        for &node in base_nodes {
            let olink = NodeLinkDao::find_olink(store, layer, node);
            if !olink.is_valid() {
                continue;
            }
            let Some(w) = store.get_attr(olink, "weight").and_then(|v| v.as_f64()) else {
                continue;
            };
            let key = self.group_of(store, node);
            let alpha = thresholds
                .get(&key)
                .or_else(|| thresholds.get(&None))
                .copied()
                .unwrap_or(0.0);
            if w.abs() >= alpha {
                active.insert(node, w);
            }
        }
        active
    }

    fn dy_node(store: &dyn StoreAdapter, layer: Id, node: Id, weight: f64) -> DynamicNode {
        let n = NodeLinkDao::get_node(store, node);
        DynamicNode {
            layer,
            node,
            baseid: node,
            weight,
            attrs: n.attrs,
            component: 0,
            x: 0,
            y: 0,
        }
    }

    /// Runs the full pipeline: dynamic graph construction, connected
    /// components, layout.
    pub fn run(&self, store: &dyn StoreAdapter) -> Result<DynamicGraph> {
        let layers = LayerDao::all_layers_bottom_up(store);
        let base = LayerDao::base_layer(store);
        let base_nodes: Vec<Id> = store
            .neighbors(base, ObjectKind::Owns, Direction::Outgoing)
            .iter()
            .collect();

        let thresholds = self.compute_thresholds(store, &base_nodes, &layers);
        let hlinks = self.base_hlinks(store, &base_nodes);

        let mut graph = DynamicGraph::new();
        let mut node_index: BTreeMap<DyNodeId, usize> = BTreeMap::new();

        let mut ensure_node = |graph: &mut DynamicGraph,
                               index: &mut BTreeMap<DyNodeId, usize>,
                               layer: Id,
                               node: Id,
                               weight: f64| {
            let id = DyNodeId::new(layer, node);
            if let std::collections::btree_map::Entry::Vacant(e) = index.entry(id) {
                e.insert(graph.nodes.len());
                graph.nodes.push(Self::dy_node(store, layer, node, weight));
            }
        };

        let mut prev_active: Option<BTreeMap<Id, f64>> = None;
        let mut prev_layer = Id::INVALID;
        for &layer in &layers {
            let active = self.active_at(store, layer, &base_nodes, &thresholds);
            if let Some(prev) = &prev_active {
                for (&n, &w) in prev.iter() {
                    if active.contains_key(&n) {
                        ensure_node(&mut graph, &mut node_index, prev_layer, n, w);
                        ensure_node(&mut graph, &mut node_index, layer, n, active[&n]);
                        graph.edges.push(DynamicEdge {
                            source: DyNodeId::new(prev_layer, n),
                            target: DyNodeId::new(layer, n),
                            kind: DyEdgeKind::SelfLink,
                        });
                    }
                }
                for &(a, b) in &hlinks {
                    if prev.contains_key(&a) && active.contains_key(&b) {
                        ensure_node(&mut graph, &mut node_index, prev_layer, a, prev[&a]);
                        ensure_node(&mut graph, &mut node_index, layer, b, active[&b]);
                        graph.edges.push(DynamicEdge {
                            source: DyNodeId::new(prev_layer, a),
                            target: DyNodeId::new(layer, b),
                            kind: DyEdgeKind::Cross,
                        });
                    }
                    if prev.contains_key(&b) && active.contains_key(&a) {
                        ensure_node(&mut graph, &mut node_index, prev_layer, b, prev[&b]);
                        ensure_node(&mut graph, &mut node_index, layer, a, active[&a]);
                        graph.edges.push(DynamicEdge {
                            source: DyNodeId::new(prev_layer, b),
                            target: DyNodeId::new(layer, a),
                            kind: DyEdgeKind::Cross,
                        });
                    }
                }
            }
            // single-layer nodes with no neighbor in the adjacent layer
            // are still part of the dynamic graph.
            for (&n, &w) in active.iter() {
                ensure_node(&mut graph, &mut node_index, layer, n, w);
            }
            prev_active = Some(active);
            prev_layer = layer;
        }

        self.extract_components(&mut graph);
        self.layout(&mut graph, &layers, &base_nodes);

        Ok(graph)
    }

    fn extract_components(&self, graph: &mut DynamicGraph) {
        let index = graph.index();
        let mut uf = UnionFind::new(graph.nodes.len());
        for edge in &graph.edges {
            if let (Some(&i), Some(&j)) = (index.get(&edge.source), index.get(&edge.target)) {
                uf.union(i, j);
            }
        }
        let labels = uf.labels();
        let count = labels.iter().collect::<BTreeSet<_>>().len();
        for (node, &label) in graph.nodes.iter_mut().zip(labels.iter()) {
            node.component = label;
        }
        graph.component_count = count;
    }

    fn layout(&self, graph: &mut DynamicGraph, layers: &[Id], base_nodes: &[Id]) {
        let y_of: BTreeMap<Id, i64> = base_nodes
            .iter()
            .enumerate()
            .map(|(i, &n)| (n, i as i64 * NODE_Y_SPACING))
            .collect();
        let rank_of: BTreeMap<Id, i64> = layers
            .iter()
            .enumerate()
            .map(|(i, &l)| (l, i as i64))
            .collect();
        for node in &mut graph.nodes {
            let rank = rank_of.get(&node.layer).copied().unwrap_or(0);
            node.x = rank * NODE_X_SPACING;
            node.y = y_of.get(&node.baseid).copied().unwrap_or(0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mlg_core::AttrMap;
    use mlg_dao::{MlgDao, NodeLinkDao as NL};
    use mlg_store::MemStore;

    fn three_layer_scenario() -> (MemStore, Id, Id, Id, Id, Id, Id) {
        let mut store = MemStore::new();
        let base = LayerDao::add_base_layer(&mut store).unwrap();
        let n1 = MlgDao::add_node_to_layer(&mut store, base, AttrMap::new(), Some(1.0)).unwrap();
        let n2 = MlgDao::add_node_to_layer(&mut store, base, AttrMap::new(), Some(1.0)).unwrap();
        let n3 = MlgDao::add_node_to_layer(&mut store, base, AttrMap::new(), Some(1.0)).unwrap();
        NL::create_hlink(&mut store, n1, n2, None).unwrap();
        NL::create_hlink(&mut store, n1, n3, None).unwrap();

        let l2 = LayerDao::add_layer_on_top(&mut store).unwrap();
        let l3 = LayerDao::add_layer_on_top(&mut store).unwrap();

        NL::create_olink(&mut store, base, n1, Some(5.0)).unwrap();
        NL::create_olink(&mut store, l2, n1, Some(6.0)).unwrap();
        NL::create_olink(&mut store, l3, n1, Some(1.0)).unwrap();

        NL::create_olink(&mut store, base, n2, Some(-5.0)).unwrap();
        NL::create_olink(&mut store, l2, n2, Some(-8.0)).unwrap();
        NL::create_olink(&mut store, l3, n2, Some(1.0)).unwrap();

        NL::create_olink(&mut store, base, n3, Some(1.0)).unwrap();
        NL::create_olink(&mut store, l2, n3, Some(-1.0)).unwrap();
        NL::create_olink(&mut store, l3, n3, Some(7.0)).unwrap();

        (store, base, l2, l3, n1, n2, n3)
    }

    #[test]
    fn s5_component_extraction_scenario() {
        let (store, base, l2, l3, n1, n2, n3) = three_layer_scenario();
        let extractor = ComponentExtractor::new();
        let graph = extractor.run(&store).unwrap();

        let active: BTreeSet<DyNodeId> = graph
            .nodes
            .iter()
            .map(|n| DyNodeId::new(n.layer, n.node))
            .collect();
        assert_eq!(active.len(), 5);
        assert!(active.contains(&DyNodeId::new(base, n1)));
        assert!(active.contains(&DyNodeId::new(l2, n1)));
        assert!(active.contains(&DyNodeId::new(base, n2)));
        assert!(active.contains(&DyNodeId::new(l2, n2)));
        assert!(active.contains(&DyNodeId::new(l3, n3)));

        assert_eq!(graph.component_count, 2);
        let comp_of = |layer: Id, node: Id| -> usize {
            graph
                .nodes
                .iter()
                .find(|n| n.layer == layer && n.node == node)
                .unwrap()
                .component
        };
        assert_eq!(comp_of(base, n1), comp_of(l2, n1));
        assert_eq!(comp_of(base, n1), comp_of(base, n2));
        assert_ne!(comp_of(base, n1), comp_of(l3, n3));
    }

    #[test]
    fn alpha_override_is_used_verbatim() {
        let (store, ..) = three_layer_scenario();
        let mut extractor = ComponentExtractor::new();
        extractor.set_alpha_override(Some(100.0));
        let graph = extractor.run(&store).unwrap();
        assert!(graph.nodes.is_empty());
    }
}
