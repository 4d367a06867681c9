//! Typed schema declarations (spec §4.1, §6).
//!
//! The schema is fixed for the lifetime of a database: five edge types and
//! two node types, each with one or two declared attributes. Attribute
//! reads filter to these declared names; anything else is silently
//! dropped, per the Node/Link DAO contract.

use mlg_core::AttrValue;

/// The object kinds the store knows how to store: two node types, five
/// edge types. `Owns` has no declared attributes of its own — it is a pure
/// structural edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ObjectKind {
    Node,
    Layer,
    HLink,
    VLink,
    OLink,
    CLink,
    Owns,
}

impl ObjectKind {
    pub fn is_edge(self) -> bool {
        !matches!(self, ObjectKind::Node | ObjectKind::Layer)
    }

    /// True for edge kinds whose two endpoints are logically unordered
    /// (only `HLink`).
    pub fn is_undirected(self) -> bool {
        matches!(self, ObjectKind::HLink)
    }
}

/// Traversal direction for neighborhood/explosion queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Outgoing,
    Ingoing,
    Any,
}

/// Comparison operator for attribute selection queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Eq,
    Ge,
    Le,
    Gt,
    Lt,
}

impl Comparison {
    pub fn matches_f64(self, lhs: f64, rhs: f64) -> bool {
        match self {
            Comparison::Eq => lhs == rhs,
            Comparison::Ge => lhs >= rhs,
            Comparison::Le => lhs <= rhs,
            Comparison::Gt => lhs > rhs,
            Comparison::Lt => lhs < rhs,
        }
    }
}

/// A single declared attribute: its name, whether it is indexed, and its
/// default value used when a caller omits it on creation.
#[derive(Debug, Clone)]
pub struct AttrDef {
    pub name: &'static str,
    pub indexed: bool,
    pub default: AttrValue,
}

impl AttrDef {
    pub const fn new(name: &'static str, indexed: bool, default: AttrValue) -> Self {
        AttrDef {
            name,
            indexed,
            default,
        }
    }
}

/// The declared attributes for one `ObjectKind`, mirroring spec §6's schema
/// table (`MLD_NODE`, `MLD_LAYER`, `MLD_HLINK`, `MLD_VLINK`, `MLD_OLINK`,
/// `MLD_CHILD_OF`, and the unnamed "owns" edge type).
pub fn declared_attrs(kind: ObjectKind) -> Vec<AttrDef> {
    match kind {
        ObjectKind::Node => vec![
            AttrDef::new("weight", true, AttrValue::Double(1.0)),
            AttrDef::new("label", true, AttrValue::String(String::new())),
        ],
        ObjectKind::Layer => vec![
            AttrDef::new("is_base", true, AttrValue::Bool(false)),
            AttrDef::new("description", false, AttrValue::String(String::new())),
        ],
        ObjectKind::HLink | ObjectKind::VLink | ObjectKind::OLink | ObjectKind::CLink => {
            vec![AttrDef::new("weight", true, AttrValue::Double(1.0))]
        }
        ObjectKind::Owns => vec![],
    }
}
