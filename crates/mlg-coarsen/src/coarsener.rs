//! The coarsener (spec §4.8): drives a selector and a merger to reduce the
//! current top layer by a requested fraction, producing a new top layer.

use mlg_core::{Error, Id, Result};
use mlg_dao::{LayerDao, MlgDao};
use mlg_store::{ObjectKind, StoreAdapter};

use crate::merger::Merger;
use crate::selector::Selector;

/// Composes a [`Selector`] and a [`Merger`] to coarsen the current top
/// layer by `reduction_factor` of the base layer's size.
pub struct NeighborCoarsener<S: Selector, M: Merger> {
    selector: S,
    merger: M,
    reduction_factor: f64,
}

impl<S: Selector, M: Merger> NeighborCoarsener<S, M> {
    pub fn new(selector: S, merger: M, reduction_factor: f64) -> Self {
        NeighborCoarsener {
            selector,
            merger,
            reduction_factor,
        }
    }

    /// Requires the top layer to have at least 2 nodes; mirrors it into a
    /// new top layer `L'`, the one coarsening actually happens on.
    fn pre_exec(&self, store: &mut dyn StoreAdapter) -> Result<Id> {
        let top = LayerDao::top_layer(store);
        let count = store.neighbors(top, ObjectKind::Owns, mlg_store::Direction::Outgoing).count();
        if count < 2 {
            return Err(Error::invalid_argument(
                "top layer must have at least 2 nodes to coarsen",
            ));
        }
        MlgDao::mirror_top_layer(store)
    }

    fn merge_count(base_size: usize, reduction_factor: f64, prime_size: usize) -> usize {
        let raw = (reduction_factor * base_size as f64).round() as i64 + 1;
        let raw = raw.max(0) as usize;
        raw.min(prime_size.saturating_sub(1))
    }

    /// Runs the full coarsening pass, returning the new top layer `L'`.
    pub fn run(&mut self, store: &mut dyn StoreAdapter) -> Result<Id> {
        let base = LayerDao::base_layer(store);
        let base_size = store.neighbors(base, ObjectKind::Owns, mlg_store::Direction::Outgoing).count();

        let prime = self.pre_exec(store)?;
        let prime_size = store.neighbors(prime, ObjectKind::Owns, mlg_store::Direction::Outgoing).count();
        let mut remaining = Self::merge_count(base_size, self.reduction_factor, prime_size);

        self.selector.rank(store, prime)?;
        while remaining > 0 {
            if !self.selector.has_next() {
                self.selector.rank(store, prime)?;
                if !self.selector.has_next() {
                    break;
                }
            }
            let root = self.selector.next(store, true);
            if !root.is_valid() {
                break;
            }
            let neighbors = self.selector.get_nodes_to_merge();
            self.merger.merge(store, root, &neighbors)?;
            self.selector
                .flag_and_update(store, root, true, self.selector.memory_mode());
            remaining = remaining.saturating_sub(neighbors.count().max(1));
        }
        Ok(prime)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mlg_core::AttrMap;
    use mlg_dao::NodeLinkDao;
    use mlg_store::MemStore;

    use crate::merger::AdditiveMerger;
    use crate::selector::HeavyHLinkSelector;

    fn five_node_graph() -> MemStore {
        let mut store = MemStore::new();
        let base = LayerDao::add_base_layer(&mut store).unwrap();
        let mut w = |v: f64| {
            let mut m = AttrMap::new();
            m.insert("weight".into(), mlg_core::AttrValue::Double(v));
            m
        };
        let n1 = MlgDao::add_node_to_layer(&mut store, base, w(1.0), None).unwrap();
        let n2 = MlgDao::add_node_to_layer(&mut store, base, w(100.0), None).unwrap();
        let n3 = MlgDao::add_node_to_layer(&mut store, base, w(1.0), None).unwrap();
        let n4 = MlgDao::add_node_to_layer(&mut store, base, w(1.0), None).unwrap();
        let n5 = MlgDao::add_node_to_layer(&mut store, base, w(1.0), None).unwrap();
        NodeLinkDao::create_hlink(&mut store, n1, n2, Some(5.0)).unwrap();
        NodeLinkDao::create_hlink(&mut store, n1, n4, Some(4.0)).unwrap();
        NodeLinkDao::create_hlink(&mut store, n2, n5, Some(3.0)).unwrap();
        NodeLinkDao::create_hlink(&mut store, n1, n3, Some(1.0)).unwrap();
        NodeLinkDao::create_hlink(&mut store, n2, n3, Some(1.0)).unwrap();
        store
    }

    #[test]
    fn five_node_heavy_hlink_collapses_to_one_node() {
        let mut store = five_node_graph();
        let mut coarsener = NeighborCoarsener::new(
            HeavyHLinkSelector::new(false),
            AdditiveMerger::new(),
            0.99,
        );
        let top = coarsener.run(&mut store).unwrap();
        let nodes = store.neighbors(top, ObjectKind::Owns, mlg_store::Direction::Outgoing);
        assert_eq!(nodes.count(), 1);
        let only = nodes.any().unwrap();
        assert_eq!(NodeLinkDao::get_node(&store, only).weight, 104.0);
        assert!(store
            .explode(only, ObjectKind::HLink, mlg_store::Direction::Any)
            .is_empty());
        assert_eq!(
            store.neighbors(only, ObjectKind::VLink, mlg_store::Direction::Ingoing).count(),
            5
        );
    }

    #[test]
    fn merge_count_respects_prime_size_clamp() {
        assert_eq!(NeighborCoarsener::<HeavyHLinkSelector, AdditiveMerger>::merge_count(5, 0.99, 5), 4);
        assert_eq!(NeighborCoarsener::<HeavyHLinkSelector, AdditiveMerger>::merge_count(5, 0.0, 5), 1);
        assert_eq!(NeighborCoarsener::<HeavyHLinkSelector, AdditiveMerger>::merge_count(5, 1.0, 5), 4);
    }
}
