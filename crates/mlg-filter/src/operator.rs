//! Drives a [`TimeVertexFilter`] across the whole layer stack (spec §4.12):
//! for each layer bottom-up, compute every node's new observation into a
//! buffer, then persist the buffer before moving to the next layer.

use mlg_core::Result;
use mlg_dao::{LayerDao, NodeLinkDao};
use mlg_store::{Direction, IdSet, ObjectKind, StoreAdapter};

use crate::cache::TimeSeriesCache;
use crate::filter::TimeVertexFilter;

/// Runs one filtering pass over every layer of the stack.
pub struct TimeSeriesOperator {
    filter: TimeVertexFilter,
    cache: TimeSeriesCache,
    excluded_nodes: IdSet,
}

impl TimeSeriesOperator {
    pub fn new(filter: TimeVertexFilter) -> Self {
        TimeSeriesOperator {
            filter,
            cache: TimeSeriesCache::new(),
            excluded_nodes: IdSet::new(),
        }
    }

    pub fn set_excluded_nodes(&mut self, excluded: IdSet) {
        self.excluded_nodes = excluded.clone();
        self.filter.set_excluded_nodes(excluded);
    }

    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache = TimeSeriesCache::with_capacity(capacity);
        self
    }

    /// Filters every observation in the stack in place, bottom layer
    /// first. Never mutates the store until an entire layer's worth of
    /// new observations has been computed.
    pub fn run(&mut self, store: &mut dyn StoreAdapter) -> Result<usize> {
        let layers = LayerDao::all_layers_bottom_up(store);
        if layers.is_empty() {
            return Ok(0);
        }
        let base = layers[0];
        let nodes: IdSet = store
            .neighbors(base, ObjectKind::Owns, Direction::Outgoing)
            .difference(&self.excluded_nodes);

        self.cache.set_active_layer(base);
        self.cache.set_radius(self.filter.radius());
        self.cache.set_direction(self.filter.direction());

        let mut total = 0usize;
        for &layer in &layers {
            self.filter.compute_tw_coeffs(&*store, layer);
            let mut buffer = Vec::with_capacity(nodes.count());
            for node in nodes.iter() {
                let observation =
                    self.filter
                        .compute(&*store, Some(&mut self.cache), layer, node);
                buffer.push(observation);
            }
            for obs in buffer {
                let olink = NodeLinkDao::find_olink(store, obs.layer, obs.node);
                if olink.is_valid() {
                    NodeLinkDao::set_weight(store, olink, obs.weight)?;
                } else {
                    NodeLinkDao::create_olink(store, obs.layer, obs.node, Some(obs.weight))?;
                }
                total += 1;
            }
            self.cache.scroll();
        }
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mlg_core::AttrMap;
    use mlg_dao::MlgDao;
    use mlg_store::MemStore;

    #[test]
    fn run_over_single_layer_is_a_noop_shape_preserving_pass() {
        let mut store = MemStore::new();
        let base = LayerDao::add_base_layer(&mut store).unwrap();
        let n = MlgDao::add_node_to_layer(&mut store, base, AttrMap::new(), Some(4.0)).unwrap();

        let mut filter = TimeVertexFilter::new();
        filter.set_radius(0);
        let mut op = TimeSeriesOperator::new(filter);
        let touched = op.run(&mut store).unwrap();

        assert_eq!(touched, 1);
        let olink = NodeLinkDao::find_olink(&store, base, n);
        assert!(olink.is_valid());
    }

    #[test]
    fn run_excludes_configured_nodes() {
        let mut store = MemStore::new();
        let base = LayerDao::add_base_layer(&mut store).unwrap();
        let n1 = MlgDao::add_node_to_layer(&mut store, base, AttrMap::new(), Some(4.0)).unwrap();
        let n2 = MlgDao::add_node_to_layer(&mut store, base, AttrMap::new(), Some(9.0)).unwrap();

        let filter = TimeVertexFilter::new();
        let mut op = TimeSeriesOperator::new(filter);
        op.set_excluded_nodes(IdSet::single(n2));
        let touched = op.run(&mut store).unwrap();

        assert_eq!(touched, 1);
        assert!(NodeLinkDao::find_olink(&store, base, n1).is_valid());
        assert!(!NodeLinkDao::find_olink(&store, base, n2).is_valid());
    }
}
