//! Layer DAO (spec §4.3): the ordered stack of layers, linked by `CLink`,
//! with exactly one base layer.
//!
//! The stack position of a layer is never stored as a field — it is always
//! derived by walking `CLink` edges, so "top" and "bottom" are always
//! consistent with whatever the store currently holds.

use std::collections::BTreeSet;

use mlg_core::{AttrMap, AttrValue, Error, Id, Layer, Result};
use mlg_store::{Direction, ObjectKind, StoreAdapter};

/// Stateless facade over the store for layer-stack operations.
pub struct LayerDao;

impl LayerDao {
    /// Creates the first layer. Fails if any layer already exists.
    pub fn add_base_layer(store: &mut dyn StoreAdapter) -> Result<Id> {
        if store.all_of_kind(ObjectKind::Layer).any().is_some() {
            return Err(Error::invalid_argument("a base layer already exists"));
        }
        let mut attrs = AttrMap::new();
        attrs.insert("is_base".into(), AttrValue::Bool(true));
        store.create_node(ObjectKind::Layer, attrs)
    }

    /// Inserts a new layer above the current top, linked by a default-weight
    /// `CLink`. Fails if no base layer exists yet.
    pub fn add_layer_on_top(store: &mut dyn StoreAdapter) -> Result<Id> {
        let old_top = Self::top_layer(store);
        if !old_top.is_valid() {
            return Err(Error::invalid_argument("no base layer to stack onto"));
        }
        let new_top = store.create_node(ObjectKind::Layer, AttrMap::new())?;
        store.create_edge(ObjectKind::CLink, old_top, new_top, AttrMap::new())?;
        Ok(new_top)
    }

    /// Inserts a new layer below the current bottom. Fails if no base layer
    /// exists yet.
    pub fn add_layer_on_bottom(store: &mut dyn StoreAdapter) -> Result<Id> {
        let old_bottom = Self::bottom_layer(store);
        if !old_bottom.is_valid() {
            return Err(Error::invalid_argument("no base layer to stack under"));
        }
        let new_bottom = store.create_node(ObjectKind::Layer, AttrMap::new())?;
        store.create_edge(ObjectKind::CLink, new_bottom, old_bottom, AttrMap::new())?;
        Ok(new_bottom)
    }

    /// The layer with `is_base = true`, or `Id::INVALID` if none.
    pub fn base_layer(store: &dyn StoreAdapter) -> Id {
        store
            .select(
                ObjectKind::Layer,
                "is_base",
                mlg_store::Comparison::Eq,
                &AttrValue::Bool(true),
                None,
            )
            .any()
            .unwrap_or(Id::INVALID)
    }

    /// The layer with no outgoing `CLink` (no parent), or `Id::INVALID` if
    /// the stack is empty.
    pub fn top_layer(store: &dyn StoreAdapter) -> Id {
        store
            .all_of_kind(ObjectKind::Layer)
            .iter()
            .find(|&l| store.explode(l, ObjectKind::CLink, Direction::Outgoing).is_empty())
            .unwrap_or(Id::INVALID)
    }

    /// The layer with no incoming `CLink` (no child), or `Id::INVALID` if
    /// the stack is empty.
    pub fn bottom_layer(store: &dyn StoreAdapter) -> Id {
        store
            .all_of_kind(ObjectKind::Layer)
            .iter()
            .find(|&l| store.explode(l, ObjectKind::CLink, Direction::Ingoing).is_empty())
            .unwrap_or(Id::INVALID)
    }

    /// Moves the base flag onto `l`, clearing whatever layer held it before.
    pub fn set_as_base_layer(store: &mut dyn StoreAdapter, l: Id) -> Result<()> {
        if store.find(ObjectKind::Layer, l).is_none() {
            return Err(Error::not_found(format!("layer {l}")));
        }
        let old = Self::base_layer(store);
        if old.is_valid() && old != l {
            store.set_attr(old, "is_base", AttrValue::Bool(false))?;
        }
        store.set_attr(l, "is_base", AttrValue::Bool(true))
    }

    /// The layer immediately above `l` (its `CLink` head), or invalid.
    pub fn parent(store: &dyn StoreAdapter, l: Id) -> Id {
        store
            .neighbors(l, ObjectKind::CLink, Direction::Outgoing)
            .any()
            .unwrap_or(Id::INVALID)
    }

    /// The layer immediately below `l` (its `CLink` tail), or invalid.
    pub fn child(store: &dyn StoreAdapter, l: Id) -> Id {
        store
            .neighbors(l, ObjectKind::CLink, Direction::Ingoing)
            .any()
            .unwrap_or(Id::INVALID)
    }

    /// True iff there is a `CLink` path from `a` to `b` in either direction
    /// (the stack is a single chain, so this is really "both exist in the
    /// same stack"), used by the MLG DAO to validate `VLink` adjacency.
    pub fn affiliated(store: &dyn StoreAdapter, a: Id, b: Id) -> bool {
        if a == b {
            return store.find(ObjectKind::Layer, a).is_some();
        }
        let mut seen = BTreeSet::new();
        let mut frontier = vec![a];
        seen.insert(a);
        while let Some(cur) = frontier.pop() {
            let next = store.neighbors(cur, ObjectKind::CLink, Direction::Any);
            for n in next.iter() {
                if n == b {
                    return true;
                }
                if seen.insert(n) {
                    frontier.push(n);
                }
            }
        }
        false
    }

    /// Removes the top layer, cascading through its owned nodes and edges.
    /// Forbidden when the top is also the base and other layers remain.
    pub fn remove_top_layer(store: &mut dyn StoreAdapter) -> Result<()> {
        let top = Self::top_layer(store);
        if !top.is_valid() {
            return Ok(());
        }
        Self::remove_one(store, top)
    }

    /// Removes the bottom layer, cascading through its owned nodes and
    /// edges. Forbidden when the bottom is also the base and other layers
    /// remain.
    pub fn remove_bottom_layer(store: &mut dyn StoreAdapter) -> Result<()> {
        let bottom = Self::bottom_layer(store);
        if !bottom.is_valid() {
            return Ok(());
        }
        Self::remove_one(store, bottom)
    }

    /// Removes the base layer. Only succeeds when it is the sole layer.
    pub fn remove_base_layer(store: &mut dyn StoreAdapter) -> Result<()> {
        let base = Self::base_layer(store);
        if !base.is_valid() {
            return Ok(());
        }
        if Self::layer_count(store) != 1 {
            return Err(Error::invalid_argument(
                "cannot remove the base layer while other layers exist",
            ));
        }
        store.drop(base)
    }

    /// Drops every non-base layer and everything it owns.
    pub fn remove_all_but_base(store: &mut dyn StoreAdapter) -> Result<()> {
        let base = Self::base_layer(store);
        let victims: Vec<Id> = store
            .all_of_kind(ObjectKind::Layer)
            .iter()
            .filter(|&l| l != base)
            .collect();
        for l in victims {
            store.drop(l)?;
        }
        Ok(())
    }

    pub fn layer_count(store: &dyn StoreAdapter) -> usize {
        store.all_of_kind(ObjectKind::Layer).count()
    }

    /// Loads a layer's value-type view. Returns a `Layer` with
    /// `id = Id::INVALID` if it does not exist (NotFound recovered
    /// locally, per the error model).
    pub fn get_layer(store: &dyn StoreAdapter, id: Id) -> Layer {
        let Some(attrs) = store.attrs(id) else {
            return Layer::new(Id::INVALID, false);
        };
        let is_base = attrs
            .get("is_base")
            .and_then(|v| v.as_bool())
            .unwrap_or(false);
        let description = attrs.get("description").and_then(|v| v.as_str()).map(str::to_string);
        let mut layer = Layer::new(id, is_base);
        layer.description = description;
        layer.attrs = attrs;
        layer
    }

    /// The layer stack from bottom to top.
    pub fn all_layers_bottom_up(store: &dyn StoreAdapter) -> Vec<Id> {
        let mut out = Vec::new();
        let mut cur = Self::bottom_layer(store);
        while cur.is_valid() {
            out.push(cur);
            cur = Self::parent(store, cur);
        }
        out
    }

    fn remove_one(store: &mut dyn StoreAdapter, target: Id) -> Result<()> {
        let base = Self::base_layer(store);
        if target == base && Self::layer_count(store) > 1 {
            return Err(Error::invalid_argument(
                "cannot remove the base layer while other layers exist",
            ));
        }
        store.drop(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mlg_store::MemStore;

    #[test]
    fn add_base_layer_then_second_fails() {
        let mut store = MemStore::new();
        let base = LayerDao::add_base_layer(&mut store).unwrap();
        assert_eq!(LayerDao::base_layer(&store), base);
        assert!(LayerDao::add_base_layer(&mut store).is_err());
    }

    #[test]
    fn stack_top_and_bottom_track_inserts() {
        let mut store = MemStore::new();
        let base = LayerDao::add_base_layer(&mut store).unwrap();
        let top1 = LayerDao::add_layer_on_top(&mut store).unwrap();
        let top2 = LayerDao::add_layer_on_top(&mut store).unwrap();
        let bottom1 = LayerDao::add_layer_on_bottom(&mut store).unwrap();

        assert_eq!(LayerDao::top_layer(&store), top2);
        assert_eq!(LayerDao::bottom_layer(&store), bottom1);
        assert_eq!(LayerDao::parent(&store, base), top1);
        assert_eq!(LayerDao::child(&store, top1), base);
        assert_eq!(LayerDao::layer_count(&store), 4);
        assert_eq!(
            LayerDao::all_layers_bottom_up(&store),
            vec![bottom1, base, top1, top2]
        );
    }

    #[test]
    fn affiliated_true_within_one_chain() {
        let mut store = MemStore::new();
        let base = LayerDao::add_base_layer(&mut store).unwrap();
        let top = LayerDao::add_layer_on_top(&mut store).unwrap();
        assert!(LayerDao::affiliated(&store, base, top));
        assert!(LayerDao::affiliated(&store, top, base));
    }

    #[test]
    fn remove_base_forbidden_while_other_layers_exist() {
        let mut store = MemStore::new();
        let base = LayerDao::add_base_layer(&mut store).unwrap();
        LayerDao::add_layer_on_top(&mut store).unwrap();
        assert!(LayerDao::remove_base_layer(&mut store).is_err());
        let _ = base;
    }

    #[test]
    fn remove_all_but_base_drops_everything_else() {
        let mut store = MemStore::new();
        let base = LayerDao::add_base_layer(&mut store).unwrap();
        LayerDao::add_layer_on_top(&mut store).unwrap();
        LayerDao::add_layer_on_bottom(&mut store).unwrap();
        LayerDao::remove_all_but_base(&mut store).unwrap();
        assert_eq!(LayerDao::layer_count(&store), 1);
        assert_eq!(LayerDao::top_layer(&store), base);
        assert_eq!(LayerDao::bottom_layer(&store), base);
    }

    #[test]
    fn set_as_base_layer_moves_the_flag() {
        let mut store = MemStore::new();
        let base = LayerDao::add_base_layer(&mut store).unwrap();
        let top = LayerDao::add_layer_on_top(&mut store).unwrap();
        LayerDao::set_as_base_layer(&mut store, top).unwrap();
        assert_eq!(LayerDao::base_layer(&store), top);
        assert_eq!(
            LayerDao::get_layer(&store, base).is_base,
            false
        );
    }
}
