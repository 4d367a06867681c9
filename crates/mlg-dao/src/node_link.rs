//! Node/Link DAO (spec §4.4): CRUD for nodes and the four link kinds.
//!
//! Every create accepts an optional weight/attribute map; omitted
//! attributes fall back to the schema default supplied by `mlg-store`.
//! Lookups recover `NotFound` locally, returning `Id::INVALID` or an
//! entity carrying it, per the error model.

use mlg_core::{AttrMap, AttrValue, CLink, Error, HLink, Id, Node, OLink, Owns, Result, VLink};
use mlg_store::{ObjectKind, StoreAdapter};

pub struct NodeLinkDao;

impl NodeLinkDao {
    pub fn create_node(store: &mut dyn StoreAdapter, attrs: AttrMap) -> Result<Id> {
        store.create_node(ObjectKind::Node, attrs)
    }

    pub fn get_node(store: &dyn StoreAdapter, id: Id) -> Node {
        let Some(attrs) = store.attrs(id) else {
            return Node::new(Id::INVALID);
        };
        let mut n = Node::new(id);
        n.weight = attrs.get("weight").and_then(|v| v.as_f64()).unwrap_or(1.0);
        n.label = attrs
            .get("label")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();
        n.attrs = attrs;
        n
    }

    pub fn set_node_weight(store: &mut dyn StoreAdapter, id: Id, weight: f64) -> Result<()> {
        store.set_attr(id, "weight", AttrValue::Double(weight))
    }

    pub fn drop_node(store: &mut dyn StoreAdapter, id: Id) -> Result<()> {
        store.drop(id)
    }

    /// Creates an `HLink` between `a` and `b`. Rejects self-loops, since
    /// the entity model forbids them outright.
    pub fn create_hlink(
        store: &mut dyn StoreAdapter,
        a: Id,
        b: Id,
        weight: Option<f64>,
    ) -> Result<Id> {
        if a == b {
            return Err(Error::invalid_argument("HLink cannot be a self-loop"));
        }
        let mut attrs = AttrMap::new();
        if let Some(w) = weight {
            attrs.insert("weight".into(), AttrValue::Double(w));
        }
        store.create_edge(ObjectKind::HLink, a, b, attrs)
    }

    pub fn create_vlink(
        store: &mut dyn StoreAdapter,
        child: Id,
        parent: Id,
        weight: Option<f64>,
    ) -> Result<Id> {
        let mut attrs = AttrMap::new();
        if let Some(w) = weight {
            attrs.insert("weight".into(), AttrValue::Double(w));
        }
        store.create_edge(ObjectKind::VLink, child, parent, attrs)
    }

    pub fn create_olink(
        store: &mut dyn StoreAdapter,
        layer: Id,
        node: Id,
        weight: Option<f64>,
    ) -> Result<Id> {
        let mut attrs = AttrMap::new();
        if let Some(w) = weight {
            attrs.insert("weight".into(), AttrValue::Double(w));
        }
        store.create_edge(ObjectKind::OLink, layer, node, attrs)
    }

    pub fn create_clink(
        store: &mut dyn StoreAdapter,
        child_layer: Id,
        parent_layer: Id,
        weight: Option<f64>,
    ) -> Result<Id> {
        let mut attrs = AttrMap::new();
        if let Some(w) = weight {
            attrs.insert("weight".into(), AttrValue::Double(w));
        }
        store.create_edge(ObjectKind::CLink, child_layer, parent_layer, attrs)
    }

    pub fn create_owns(store: &mut dyn StoreAdapter, layer: Id, node: Id) -> Result<Id> {
        store.create_edge(ObjectKind::Owns, layer, node, AttrMap::new())
    }

    pub fn find_hlink(store: &dyn StoreAdapter, a: Id, b: Id) -> Id {
        store
            .find_edge(ObjectKind::HLink, a, b)
            .unwrap_or(Id::INVALID)
    }

    pub fn find_vlink(store: &dyn StoreAdapter, child: Id, parent: Id) -> Id {
        store
            .find_edge(ObjectKind::VLink, child, parent)
            .unwrap_or(Id::INVALID)
    }

    pub fn find_olink(store: &dyn StoreAdapter, layer: Id, node: Id) -> Id {
        store
            .find_edge(ObjectKind::OLink, layer, node)
            .unwrap_or(Id::INVALID)
    }

    pub fn find_clink(store: &dyn StoreAdapter, child_layer: Id, parent_layer: Id) -> Id {
        store
            .find_edge(ObjectKind::CLink, child_layer, parent_layer)
            .unwrap_or(Id::INVALID)
    }

    pub fn find_owns(store: &dyn StoreAdapter, node: Id) -> Id {
        store
            .explode(node, ObjectKind::Owns, mlg_store::Direction::Ingoing)
            .any()
            .unwrap_or(Id::INVALID)
    }

    pub fn get_hlink(store: &dyn StoreAdapter, id: Id) -> HLink {
        let Some((a, b)) = store.edge_endpoints(id) else {
            return HLink::new(Id::INVALID, Id::INVALID, Id::INVALID);
        };
        let mut h = HLink::new(id, a, b);
        if let Some(attrs) = store.attrs(id) {
            h.weight = attrs.get("weight").and_then(|v| v.as_f64()).unwrap_or(1.0);
            h.attrs = attrs;
        }
        h
    }

    pub fn get_vlink(store: &dyn StoreAdapter, id: Id) -> VLink {
        let Some((child, parent)) = store.edge_endpoints(id) else {
            return VLink::new(Id::INVALID, Id::INVALID, Id::INVALID);
        };
        let mut v = VLink::new(id, child, parent);
        if let Some(attrs) = store.attrs(id) {
            v.weight = attrs.get("weight").and_then(|v| v.as_f64()).unwrap_or(1.0);
            v.attrs = attrs;
        }
        v
    }

    pub fn get_olink(store: &dyn StoreAdapter, id: Id) -> OLink {
        let Some((layer, node)) = store.edge_endpoints(id) else {
            return OLink::invalid();
        };
        let mut o = OLink::new(id, layer, node);
        if let Some(w) = store.get_attr(id, "weight").and_then(|v| v.as_f64()) {
            o.weight = w;
        }
        o
    }

    pub fn get_clink(store: &dyn StoreAdapter, id: Id) -> CLink {
        let Some((child_layer, parent_layer)) = store.edge_endpoints(id) else {
            return CLink::new(Id::INVALID, Id::INVALID, Id::INVALID);
        };
        let mut c = CLink::new(id, child_layer, parent_layer);
        if let Some(w) = store.get_attr(id, "weight").and_then(|v| v.as_f64()) {
            c.weight = w;
        }
        c
    }

    pub fn get_owns(store: &dyn StoreAdapter, id: Id) -> Owns {
        let Some((layer, node)) = store.edge_endpoints(id) else {
            return Owns {
                id: Id::INVALID,
                layer: Id::INVALID,
                node: Id::INVALID,
            };
        };
        Owns { id, layer, node }
    }

    pub fn set_weight(store: &mut dyn StoreAdapter, id: Id, weight: f64) -> Result<()> {
        store.set_attr(id, "weight", AttrValue::Double(weight))
    }

    pub fn set_attrs(store: &mut dyn StoreAdapter, id: Id, attrs: AttrMap) -> Result<()> {
        store.set_attrs(id, attrs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mlg_store::MemStore;

    #[test]
    fn hlink_defaults_weight_when_omitted() {
        let mut store = MemStore::new();
        let a = NodeLinkDao::create_node(&mut store, AttrMap::new()).unwrap();
        let b = NodeLinkDao::create_node(&mut store, AttrMap::new()).unwrap();
        let e = NodeLinkDao::create_hlink(&mut store, a, b, None).unwrap();
        assert_eq!(NodeLinkDao::get_hlink(&store, e).weight, 1.0);
    }

    #[test]
    fn hlink_self_loop_rejected() {
        let mut store = MemStore::new();
        let a = NodeLinkDao::create_node(&mut store, AttrMap::new()).unwrap();
        assert!(NodeLinkDao::create_hlink(&mut store, a, a, None).is_err());
    }

    #[test]
    fn find_edge_recovers_invalid_when_absent() {
        let store = MemStore::new();
        assert_eq!(
            NodeLinkDao::find_hlink(&store, Id::new(1), Id::new(2)),
            Id::INVALID
        );
    }

    #[test]
    fn get_node_reads_weight_and_label() {
        let mut store = MemStore::new();
        let mut attrs = AttrMap::new();
        attrs.insert("weight".into(), AttrValue::Double(3.5));
        attrs.insert("label".into(), AttrValue::String("x".into()));
        let id = NodeLinkDao::create_node(&mut store, attrs).unwrap();
        let n = NodeLinkDao::get_node(&store, id);
        assert_eq!(n.weight, 3.5);
        assert_eq!(n.label, "x");
    }
}
