//! MLG DAO (spec §4.5): the layer-aware composition of the Layer DAO and
//! the Node/Link DAO. Every mutating, layer-aware operation in the engine
//! goes through here — selectors, mergers, the coarsener and the filter
//! operator never touch `mlg-store` directly.

use std::collections::BTreeMap;

use mlg_core::{AttrMap, Error, Id, Result, DEFAULT_WEIGHT};
use mlg_store::{Direction, IdSet, ObjectKind, StoreAdapter};

use crate::layer::LayerDao;
use crate::node_link::NodeLinkDao;

/// Direction for vertical (cross-layer) kin lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VDirection {
    /// The layer above (VLink target, `child -> parent`).
    Parent,
    /// The layer below (VLink source).
    Child,
}

/// Direction for affiliation checks between two nodes' owning layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Affiliation {
    Up,
    Down,
    Any,
}

/// Direction for a radius-bounded signal lookup (spec §4.5 `get_signal`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalDirection {
    Past,
    Future,
    Both,
}

/// A binary weight combinator, used by the copy/merge operations. The
/// default throughout the engine is addition (spec §4.7).
pub type Merger = dyn Fn(f64, f64) -> f64;

pub struct MlgDao;

impl MlgDao {
    fn owning_layer(store: &dyn StoreAdapter, node: Id) -> Id {
        let owns = NodeLinkDao::find_owns(store, node);
        if !owns.is_valid() {
            return Id::INVALID;
        }
        NodeLinkDao::get_owns(store, owns).layer
    }

    fn weight_of(store: &dyn StoreAdapter, edge: Id) -> f64 {
        store
            .get_attr(edge, "weight")
            .and_then(|v| v.as_f64())
            .unwrap_or(DEFAULT_WEIGHT)
    }

    /// Creates a node owned by `layer`, with an Owns edge and an OLink
    /// carrying the initial observation.
    pub fn add_node_to_layer(
        store: &mut dyn StoreAdapter,
        layer: Id,
        node_attrs: AttrMap,
        olink_weight: Option<f64>,
    ) -> Result<Id> {
        if store.find(ObjectKind::Layer, layer).is_none() {
            return Err(Error::not_found(format!("layer {layer}")));
        }
        let node = NodeLinkDao::create_node(store, node_attrs)?;
        NodeLinkDao::create_owns(store, layer, node)?;
        NodeLinkDao::create_olink(store, layer, node, olink_weight)?;
        Ok(node)
    }

    /// Adds an `HLink`. When `enforce_same_layer`, rejects endpoints owned
    /// by different layers (invariant 4).
    pub fn add_hlink(
        store: &mut dyn StoreAdapter,
        a: Id,
        b: Id,
        weight: Option<f64>,
        enforce_same_layer: bool,
    ) -> Result<Id> {
        if enforce_same_layer {
            let la = Self::owning_layer(store, a);
            let lb = Self::owning_layer(store, b);
            if !la.is_valid() || la != lb {
                return Err(Error::invalid_argument(
                    "HLink endpoints must share an owning layer",
                ));
            }
        }
        NodeLinkDao::create_hlink(store, a, b, weight)
    }

    /// Adds a `VLink`. When `enforce_adjacency`, rejects endpoints whose
    /// owning layers are not adjacent, child strictly below parent
    /// (invariant 5).
    pub fn add_vlink(
        store: &mut dyn StoreAdapter,
        child: Id,
        parent: Id,
        weight: Option<f64>,
        enforce_adjacency: bool,
    ) -> Result<Id> {
        if enforce_adjacency {
            let lc = Self::owning_layer(store, child);
            let lp = Self::owning_layer(store, parent);
            if !lc.is_valid() || LayerDao::parent(store, lc) != lp {
                return Err(Error::invalid_argument(
                    "VLink endpoints must be on adjacent layers, child below parent",
                ));
            }
        }
        NodeLinkDao::create_vlink(store, child, parent, weight)
    }

    /// Clones the current top layer to a new layer above it: one VLink'd
    /// twin per node, one twinned HLink per original HLink. Returns the
    /// new layer's id.
    pub fn mirror_top_layer(store: &mut dyn StoreAdapter) -> Result<Id> {
        let source = LayerDao::top_layer(store);
        if !source.is_valid() {
            return Err(Error::invalid_argument("no top layer to mirror"));
        }
        let mirror = LayerDao::add_layer_on_top(store)?;
        Self::mirror_layer(store, source, mirror, VDirection::Parent)?;
        Ok(mirror)
    }

    /// Clones the current bottom layer to a new layer below it.
    pub fn mirror_bottom_layer(store: &mut dyn StoreAdapter) -> Result<Id> {
        let source = LayerDao::bottom_layer(store);
        if !source.is_valid() {
            return Err(Error::invalid_argument("no bottom layer to mirror"));
        }
        let mirror = LayerDao::add_layer_on_bottom(store)?;
        Self::mirror_layer(store, source, mirror, VDirection::Child)?;
        Ok(mirror)
    }

    /// Shared mirror body: `new_position` says whether `mirror` sits above
    /// (`Parent`) or below (`Child`) `source` in the VLinks created.
    fn mirror_layer(
        store: &mut dyn StoreAdapter,
        source: Id,
        mirror: Id,
        new_position: VDirection,
    ) -> Result<()> {
        let source_nodes: Vec<Id> = store.neighbors(source, ObjectKind::Owns, Direction::Outgoing).iter().collect();
        let mut twin: BTreeMap<Id, Id> = BTreeMap::new();
        for &n in &source_nodes {
            let attrs = store.attrs(n).unwrap_or_default();
            let weight = attrs.get("weight").and_then(|v| v.as_f64());
            let twin_node = Self::add_node_to_layer(store, mirror, attrs, None)?;
            match new_position {
                VDirection::Parent => {
                    NodeLinkDao::create_vlink(store, n, twin_node, weight)?;
                }
                VDirection::Child => {
                    NodeLinkDao::create_vlink(store, twin_node, n, weight)?;
                }
            }
            twin.insert(n, twin_node);
        }

        let mut mirrored_edges = IdSet::new();
        for &n in &source_nodes {
            for e in store.explode(n, ObjectKind::HLink, Direction::Any).iter() {
                if !mirrored_edges.add(e) {
                    continue;
                }
                let Some((a, b)) = store.edge_endpoints(e) else {
                    continue;
                };
                let w = Self::weight_of(store, e);
                let (Some(&ta), Some(&tb)) = (twin.get(&a), twin.get(&b)) else {
                    continue;
                };
                NodeLinkDao::create_hlink(store, ta, tb, Some(w))?;
            }
        }
        Ok(())
    }

    pub fn parents(store: &dyn StoreAdapter, node: Id) -> IdSet {
        store.neighbors(node, ObjectKind::VLink, Direction::Outgoing)
    }

    pub fn children(store: &dyn StoreAdapter, node: Id) -> IdSet {
        store.neighbors(node, ObjectKind::VLink, Direction::Ingoing)
    }

    /// True iff `tgt` is reachable from `src` by following `VLink`s in the
    /// requested direction.
    pub fn check_affiliation(
        store: &dyn StoreAdapter,
        src: Id,
        tgt: Id,
        direction: Affiliation,
    ) -> bool {
        let dir = match direction {
            Affiliation::Up => Direction::Outgoing,
            Affiliation::Down => Direction::Ingoing,
            Affiliation::Any => Direction::Any,
        };
        let mut seen = IdSet::single(src);
        let mut frontier = vec![src];
        while let Some(cur) = frontier.pop() {
            for n in store.neighbors(cur, ObjectKind::VLink, dir).iter() {
                if n == tgt {
                    return true;
                }
                if seen.add(n) {
                    frontier.push(n);
                }
            }
        }
        false
    }

    /// The heaviest `HLink` whose both endpoints belong to `layer`, or
    /// `Id::INVALID` if the layer has none. Ties broken by id ascending.
    pub fn get_heaviest_hlink(store: &dyn StoreAdapter, layer: Id) -> Id {
        let layer_nodes = store.neighbors(layer, ObjectKind::Owns, Direction::Outgoing);
        let layer_hlinks = store.explode_set(&layer_nodes, ObjectKind::HLink, Direction::Any);
        let mut best = Id::INVALID;
        let mut best_w = f64::NEG_INFINITY;
        for e in layer_hlinks.iter() {
            let w = Self::weight_of(store, e);
            if w > best_w {
                best_w = w;
                best = e;
            }
        }
        best
    }

    /// For every `HLink` incident to `src`, merges its weight into the
    /// corresponding edge at `tgt` (creating it if absent). Skips the
    /// `src`-`tgt` edge itself to avoid a self-loop once `src` is dropped.
    pub fn horizontal_copy_hlinks(
        store: &mut dyn StoreAdapter,
        src: Id,
        tgt: Id,
        merger: &Merger,
    ) -> Result<()> {
        let edges: Vec<Id> = store.explode(src, ObjectKind::HLink, Direction::Any).iter().collect();
        for e in edges {
            let Some((a, b)) = store.edge_endpoints(e) else {
                continue;
            };
            let other = if a == src { b } else { a };
            if other == tgt {
                continue;
            }
            let w = Self::weight_of(store, e);
            if let Some(existing) = store.find_edge(ObjectKind::HLink, tgt, other) {
                let existing_w = Self::weight_of(store, existing);
                store.set_attr(existing, "weight", merger(existing_w, w).into())?;
            } else {
                NodeLinkDao::create_hlink(store, tgt, other, Some(w))?;
            }
        }
        Ok(())
    }

    /// Same shape as [`Self::horizontal_copy_hlinks`] but for `VLink`s,
    /// copying both `src`'s parents and children onto `tgt`.
    pub fn horizontal_copy_vlinks(
        store: &mut dyn StoreAdapter,
        src: Id,
        tgt: Id,
        merger: &Merger,
    ) -> Result<()> {
        let up: Vec<Id> = store.explode(src, ObjectKind::VLink, Direction::Outgoing).iter().collect();
        for e in up {
            let Some((_, parent)) = store.edge_endpoints(e) else {
                continue;
            };
            if parent == tgt {
                continue;
            }
            let w = Self::weight_of(store, e);
            if let Some(existing) = store.find_edge(ObjectKind::VLink, tgt, parent) {
                let existing_w = Self::weight_of(store, existing);
                store.set_attr(existing, "weight", merger(existing_w, w).into())?;
            } else {
                NodeLinkDao::create_vlink(store, tgt, parent, Some(w))?;
            }
        }

        let down: Vec<Id> = store.explode(src, ObjectKind::VLink, Direction::Ingoing).iter().collect();
        for e in down {
            let Some((child, _)) = store.edge_endpoints(e) else {
                continue;
            };
            if child == tgt {
                continue;
            }
            let w = Self::weight_of(store, e);
            if let Some(existing) = store.find_edge(ObjectKind::VLink, child, tgt) {
                let existing_w = Self::weight_of(store, existing);
                store.set_attr(existing, "weight", merger(existing_w, w).into())?;
            } else {
                NodeLinkDao::create_vlink(store, child, tgt, Some(w))?;
            }
        }
        Ok(())
    }

    /// For each `HLink` neighbor `m` of `src` (optionally restricted to
    /// `subset`), finds `m`'s kin in `direction` and creates or
    /// merge-updates an `HLink` from `tgt` to that kin.
    pub fn vertical_copy_hlinks(
        store: &mut dyn StoreAdapter,
        src: Id,
        tgt: Id,
        direction: VDirection,
        subset: Option<&IdSet>,
        merger: &Merger,
    ) -> Result<()> {
        let mut neighbors = store.neighbors(src, ObjectKind::HLink, Direction::Any);
        if let Some(s) = subset {
            neighbors = neighbors.intersection(s);
        }
        for m in neighbors.iter().collect::<Vec<_>>() {
            let w = store
                .find_edge(ObjectKind::HLink, src, m)
                .map(|e| Self::weight_of(store, e))
                .unwrap_or(DEFAULT_WEIGHT);
            let kins = match direction {
                VDirection::Parent => store.neighbors(m, ObjectKind::VLink, Direction::Outgoing),
                VDirection::Child => store.neighbors(m, ObjectKind::VLink, Direction::Ingoing),
            };
            for kin in kins.iter() {
                if kin == tgt {
                    continue;
                }
                if let Some(existing) = store.find_edge(ObjectKind::HLink, tgt, kin) {
                    let existing_w = Self::weight_of(store, existing);
                    store.set_attr(existing, "weight", merger(existing_w, w).into())?;
                } else {
                    NodeLinkDao::create_hlink(store, tgt, kin, Some(w))?;
                }
            }
        }
        Ok(())
    }

    /// The ordered sequence of `OLink` weights for `node` between
    /// `bottom_layer` and `top_layer`, inclusive. Layers missing an
    /// explicit `OLink` contribute the schema default.
    pub fn get_signal(
        store: &dyn StoreAdapter,
        node: Id,
        bottom_layer: Id,
        top_layer: Id,
    ) -> Vec<f64> {
        let stack = LayerDao::all_layers_bottom_up(store);
        let Some(start) = stack.iter().position(|&l| l == bottom_layer) else {
            return Vec::new();
        };
        let Some(end) = stack.iter().position(|&l| l == top_layer) else {
            return Vec::new();
        };
        if start > end {
            return Vec::new();
        }
        stack[start..=end]
            .iter()
            .map(|&l| {
                let olink = NodeLinkDao::find_olink(store, l, node);
                if olink.is_valid() {
                    Self::weight_of(store, olink)
                } else {
                    DEFAULT_WEIGHT
                }
            })
            .collect()
    }

    /// `get_signal` with a radius/direction around `current_layer`,
    /// walking `CLink`s until the radius is exhausted or the stack ends.
    pub fn get_signal_radius(
        store: &dyn StoreAdapter,
        node: Id,
        current_layer: Id,
        radius: u32,
        direction: SignalDirection,
    ) -> Vec<f64> {
        let walk = |mut l: Id, up: bool, steps: u32| -> Id {
            for _ in 0..steps {
                let next = if up {
                    LayerDao::parent(store, l)
                } else {
                    LayerDao::child(store, l)
                };
                if !next.is_valid() {
                    break;
                }
                l = next;
            }
            l
        };
        let (bottom, top) = match direction {
            SignalDirection::Past => (walk(current_layer, false, radius), current_layer),
            SignalDirection::Future => (current_layer, walk(current_layer, true, radius)),
            SignalDirection::Both => (
                walk(current_layer, false, radius),
                walk(current_layer, true, radius),
            ),
        };
        Self::get_signal(store, node, bottom, top)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mlg_core::AttrValue;
    use mlg_store::MemStore;

    fn additive(a: f64, b: f64) -> f64 {
        a + b
    }

    #[test]
    fn add_node_to_layer_creates_owns_and_olink() {
        let mut store = MemStore::new();
        let base = LayerDao::add_base_layer(&mut store).unwrap();
        let n = MlgDao::add_node_to_layer(&mut store, base, AttrMap::new(), Some(5.0)).unwrap();
        let owns = NodeLinkDao::find_owns(&store, n);
        assert!(owns.is_valid());
        let olink = NodeLinkDao::find_olink(&store, base, n);
        assert_eq!(NodeLinkDao::get_olink(&store, olink).weight, 5.0);
    }

    #[test]
    fn mirror_top_layer_round_trips_hlinks() {
        let mut store = MemStore::new();
        let base = LayerDao::add_base_layer(&mut store).unwrap();
        let a = MlgDao::add_node_to_layer(&mut store, base, AttrMap::new(), None).unwrap();
        let b = MlgDao::add_node_to_layer(&mut store, base, AttrMap::new(), None).unwrap();
        NodeLinkDao::create_hlink(&mut store, a, b, Some(2.5)).unwrap();

        let mirror = MlgDao::mirror_top_layer(&mut store).unwrap();
        let a2 = MlgDao::children(&store, a).any().unwrap();
        let b2 = MlgDao::children(&store, b).any().unwrap();
        assert_eq!(MlgDao::owning_layer(&store, a2), mirror);

        let e = NodeLinkDao::find_hlink(&store, a2, b2);
        assert!(e.is_valid());
        assert_eq!(NodeLinkDao::get_hlink(&store, e).weight, 2.5);
    }

    #[test]
    fn get_heaviest_hlink_breaks_ties_by_id() {
        let mut store = MemStore::new();
        let base = LayerDao::add_base_layer(&mut store).unwrap();
        let a = MlgDao::add_node_to_layer(&mut store, base, AttrMap::new(), None).unwrap();
        let b = MlgDao::add_node_to_layer(&mut store, base, AttrMap::new(), None).unwrap();
        let c = MlgDao::add_node_to_layer(&mut store, base, AttrMap::new(), None).unwrap();
        let e1 = NodeLinkDao::create_hlink(&mut store, a, b, Some(5.0)).unwrap();
        NodeLinkDao::create_hlink(&mut store, b, c, Some(5.0)).unwrap();
        assert_eq!(MlgDao::get_heaviest_hlink(&store, base), e1);
    }

    #[test]
    fn horizontal_copy_hlinks_merges_additively() {
        let mut store = MemStore::new();
        let base = LayerDao::add_base_layer(&mut store).unwrap();
        let src = MlgDao::add_node_to_layer(&mut store, base, AttrMap::new(), None).unwrap();
        let tgt = MlgDao::add_node_to_layer(&mut store, base, AttrMap::new(), None).unwrap();
        let shared = MlgDao::add_node_to_layer(&mut store, base, AttrMap::new(), None).unwrap();
        NodeLinkDao::create_hlink(&mut store, src, shared, Some(3.0)).unwrap();
        NodeLinkDao::create_hlink(&mut store, tgt, shared, Some(4.0)).unwrap();

        MlgDao::horizontal_copy_hlinks(&mut store, src, tgt, &additive).unwrap();
        let e = NodeLinkDao::find_hlink(&store, tgt, shared);
        assert_eq!(NodeLinkDao::get_hlink(&store, e).weight, 7.0);
    }

    #[test]
    fn get_signal_returns_weights_between_layers_inclusive() {
        let mut store = MemStore::new();
        let base = LayerDao::add_base_layer(&mut store).unwrap();
        let n = MlgDao::add_node_to_layer(&mut store, base, AttrMap::new(), Some(1.0)).unwrap();
        let mirror = LayerDao::add_layer_on_top(&mut store).unwrap();
        NodeLinkDao::create_olink(&mut store, mirror, n, Some(9.0)).unwrap();

        assert_eq!(
            MlgDao::get_signal(&store, n, base, mirror),
            vec![1.0, 9.0]
        );

        let other = MlgDao::add_node_to_layer(&mut store, base, AttrMap::new(), Some(2.0)).unwrap();
        assert_eq!(
            MlgDao::get_signal(&store, other, base, mirror),
            vec![2.0, mlg_core::DEFAULT_WEIGHT]
        );
    }
}
