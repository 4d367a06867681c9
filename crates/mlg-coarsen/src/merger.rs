//! Mergers (spec §4.7): collapse a chosen neighborhood into its root.

use mlg_core::{Error, Id, Result};
use mlg_dao::{MlgDao, NodeLinkDao};
use mlg_store::{IdSet, StoreAdapter};

/// Given a target and the neighbors being absorbed into it, computes the
/// weight update and re-routes links.
pub trait Merger {
    /// The new weight for `target` once `neighbors` have been merged in.
    fn compute_weight(&self, store: &dyn StoreAdapter, target: Id, neighbors: &IdSet) -> f64;

    /// Merges `neighbors` into `target`: re-routes their links onto
    /// `target`, drops them, then persists `target`'s new weight.
    fn merge(&self, store: &mut dyn StoreAdapter, target: Id, neighbors: &IdSet) -> Result<()>;
}

/// `compute_weight` sums target and neighbor weights; `merge` re-routes
/// links additively (spec §4.7's sole supported pairing — see the
/// `HeavyHLinkSelector` open question on `flag_and_update` monotonicity).
#[derive(Debug, Default, Clone, Copy)]
pub struct AdditiveMerger;

fn add(a: f64, b: f64) -> f64 {
    a + b
}

impl AdditiveMerger {
    pub fn new() -> Self {
        AdditiveMerger
    }

    fn weight_of(store: &dyn StoreAdapter, node: Id) -> f64 {
        store.get_attr(node, "weight").and_then(|v| v.as_f64()).unwrap_or(1.0)
    }
}

impl Merger for AdditiveMerger {
    fn compute_weight(&self, store: &dyn StoreAdapter, target: Id, neighbors: &IdSet) -> f64 {
        let base = Self::weight_of(store, target);
        base + neighbors.iter().map(|n| Self::weight_of(store, n)).sum::<f64>()
    }

    fn merge(&self, store: &mut dyn StoreAdapter, target: Id, neighbors: &IdSet) -> Result<()> {
        if neighbors.is_empty() {
            return Ok(());
        }
        if neighbors.exists(target) {
            return Err(Error::invalid_argument("merge neighborhood cannot include target"));
        }
        let new_weight = self.compute_weight(store, target, neighbors);
        for s in neighbors.iter() {
            MlgDao::horizontal_copy_vlinks(store, s, target, &add)?;
            MlgDao::horizontal_copy_hlinks(store, s, target, &add)?;
        }
        for s in neighbors.iter() {
            NodeLinkDao::drop_node(store, s)?;
        }
        NodeLinkDao::set_node_weight(store, target, new_weight)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mlg_core::AttrMap;
    use mlg_dao::LayerDao;
    use mlg_store::{MemStore, ObjectKind};

    #[test]
    fn merge_sums_weights_and_drops_neighbors() {
        let mut store = MemStore::new();
        let base = LayerDao::add_base_layer(&mut store).unwrap();
        let mut w = |v: f64| {
            let mut m = AttrMap::new();
            m.insert("weight".into(), mlg_core::AttrValue::Double(v));
            m
        };
        let target = MlgDao::add_node_to_layer(&mut store, base, w(1.0), None).unwrap();
        let n1 = MlgDao::add_node_to_layer(&mut store, base, w(2.0), None).unwrap();
        let n2 = MlgDao::add_node_to_layer(&mut store, base, w(3.0), None).unwrap();
        let neighbors: IdSet = [n1, n2].into_iter().collect();

        AdditiveMerger::new().merge(&mut store, target, &neighbors).unwrap();

        assert_eq!(NodeLinkDao::get_node(&store, target).weight, 6.0);
        assert!(store.find(ObjectKind::Node, n1).is_none());
        assert!(store.find(ObjectKind::Node, n2).is_none());
    }

    #[test]
    fn merge_on_empty_neighborhood_is_noop() {
        let mut store = MemStore::new();
        let base = LayerDao::add_base_layer(&mut store).unwrap();
        let target = MlgDao::add_node_to_layer(&mut store, base, AttrMap::new(), None).unwrap();
        let before = NodeLinkDao::get_node(&store, target).weight;
        AdditiveMerger::new().merge(&mut store, target, &IdSet::new()).unwrap();
        assert_eq!(NodeLinkDao::get_node(&store, target).weight, before);
    }

    #[test]
    fn merge_reroutes_shared_hlink_additively() {
        let mut store = MemStore::new();
        let base = LayerDao::add_base_layer(&mut store).unwrap();
        let mut w = |v: f64| {
            let mut m = AttrMap::new();
            m.insert("weight".into(), mlg_core::AttrValue::Double(v));
            m
        };
        let target = MlgDao::add_node_to_layer(&mut store, base, w(1.0), None).unwrap();
        let s = MlgDao::add_node_to_layer(&mut store, base, w(1.0), None).unwrap();
        let shared = MlgDao::add_node_to_layer(&mut store, base, w(1.0), None).unwrap();
        NodeLinkDao::create_hlink(&mut store, target, shared, Some(3.0)).unwrap();
        NodeLinkDao::create_hlink(&mut store, s, shared, Some(4.0)).unwrap();

        let neighbors = IdSet::single(s);
        AdditiveMerger::new().merge(&mut store, target, &neighbors).unwrap();

        let e = NodeLinkDao::find_hlink(&store, target, shared);
        assert_eq!(NodeLinkDao::get_hlink(&store, e).weight, 7.0);
    }
}
