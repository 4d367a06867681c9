//! Value types for the core entity model (spec §3).
//!
//! All fields are public: these are plain value types with opaque ids, not
//! owning objects. Parent/child/layer navigation always goes back through
//! the store, which rules out cycles outside the store's own topology.

use crate::attrs::{attrs_eq, AttrMap};
use crate::id::Id;

/// Default scalar weight for nodes, HLinks, VLinks, OLinks and CLinks.
pub const DEFAULT_WEIGHT: f64 = 1.0;

/// A node: stable id, scalar weight, label, plus a dynamic attribute map.
#[derive(Debug, Clone)]
pub struct Node {
    pub id: Id,
    pub weight: f64,
    pub label: String,
    pub attrs: AttrMap,
}

impl Node {
    pub fn new(id: Id) -> Self {
        Node {
            id,
            weight: DEFAULT_WEIGHT,
            label: String::new(),
            attrs: AttrMap::new(),
        }
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && attrs_eq(&self.attrs, &other.attrs)
    }
}

/// A layer: position in the stack is implied by its CLink chain in the
/// store, not carried here.
#[derive(Debug, Clone)]
pub struct Layer {
    pub id: Id,
    pub is_base: bool,
    pub description: Option<String>,
    pub attrs: AttrMap,
}

impl Layer {
    pub fn new(id: Id, is_base: bool) -> Self {
        Layer {
            id,
            is_base,
            description: None,
            attrs: AttrMap::new(),
        }
    }
}

impl PartialEq for Layer {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && attrs_eq(&self.attrs, &other.attrs)
    }
}

/// Undirected intra-layer edge. No self-loops, at most one per unordered
/// pair within a layer (enforced by the DAOs, not this type).
#[derive(Debug, Clone)]
pub struct HLink {
    pub id: Id,
    pub a: Id,
    pub b: Id,
    pub weight: f64,
    pub attrs: AttrMap,
}

impl HLink {
    pub fn new(id: Id, a: Id, b: Id) -> Self {
        HLink {
            id,
            a,
            b,
            weight: DEFAULT_WEIGHT,
            attrs: AttrMap::new(),
        }
    }

    /// Returns the endpoint that isn't `from`, or `Id::INVALID` if `from`
    /// isn't one of this link's endpoints.
    pub fn other(&self, from: Id) -> Id {
        if from == self.a {
            self.b
        } else if from == self.b {
            self.a
        } else {
            Id::INVALID
        }
    }
}

impl PartialEq for HLink {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && attrs_eq(&self.attrs, &other.attrs)
    }
}

/// Directed child -> parent edge spanning exactly one layer step.
#[derive(Debug, Clone)]
pub struct VLink {
    pub id: Id,
    pub child: Id,
    pub parent: Id,
    pub weight: f64,
    pub attrs: AttrMap,
}

impl VLink {
    pub fn new(id: Id, child: Id, parent: Id) -> Self {
        VLink {
            id,
            child,
            parent,
            weight: DEFAULT_WEIGHT,
            attrs: AttrMap::new(),
        }
    }
}

impl PartialEq for VLink {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && attrs_eq(&self.attrs, &other.attrs)
    }
}

/// Directed layer -> node observation edge: exactly one per (layer, node).
#[derive(Debug, Clone)]
pub struct OLink {
    pub id: Id,
    pub layer: Id,
    pub node: Id,
    pub weight: f64,
}

impl OLink {
    pub fn new(id: Id, layer: Id, node: Id) -> Self {
        OLink {
            id,
            layer,
            node,
            weight: DEFAULT_WEIGHT,
        }
    }

    pub fn invalid() -> Self {
        OLink {
            id: Id::INVALID,
            layer: Id::INVALID,
            node: Id::INVALID,
            weight: 0.0,
        }
    }
}

impl PartialEq for OLink {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

/// Directed child-layer -> parent-layer edge: the inter-layer resistivity.
#[derive(Debug, Clone)]
pub struct CLink {
    pub id: Id,
    pub child_layer: Id,
    pub parent_layer: Id,
    pub weight: f64,
}

impl CLink {
    pub fn new(id: Id, child_layer: Id, parent_layer: Id) -> Self {
        CLink {
            id,
            child_layer,
            parent_layer,
            weight: DEFAULT_WEIGHT,
        }
    }
}

impl PartialEq for CLink {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

/// Directed layer -> node edge recording the node's owning layer.
/// Exactly one per node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Owns {
    pub id: Id,
    pub layer: Id,
    pub node: Id,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hlink_other_returns_opposite_endpoint() {
        let h = HLink::new(Id::new(0), Id::new(1), Id::new(2));
        assert_eq!(h.other(Id::new(1)), Id::new(2));
        assert_eq!(h.other(Id::new(2)), Id::new(1));
        assert_eq!(h.other(Id::new(99)), Id::INVALID);
    }

    #[test]
    fn node_equality_ignores_blob_attrs() {
        use crate::attrs::AttrValue;
        let mut n1 = Node::new(Id::new(1));
        n1.attrs.insert("x".into(), AttrValue::Blob(vec![1]));
        let mut n2 = Node::new(Id::new(1));
        n2.attrs.insert("x".into(), AttrValue::Blob(vec![2]));
        assert_eq!(n1, n2);
    }
}
