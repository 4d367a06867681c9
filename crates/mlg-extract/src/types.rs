//! Dynamic graph value types (spec §4.13): nodes are `(layer, base-node)`
//! pairs; edges connect consecutive layers. D3-friendly field names, since
//! `mlg-io`'s exporter serializes this shape directly.

use std::collections::BTreeMap;

use mlg_core::{AttrMap, Id};
use serde::Serialize;

/// Identifies one dynamic node by the layer it was activated on and the
/// base-graph node it tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DyNodeId {
    pub layer: Id,
    pub node: Id,
}

impl DyNodeId {
    pub fn new(layer: Id, node: Id) -> Self {
        DyNodeId { layer, node }
    }
}

/// Why a dynamic edge exists: persistence of one node across consecutive
/// layers, or spatial propagation along a base HLink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DyEdgeKind {
    SelfLink,
    Cross,
}

/// A node in the dynamic graph: attributes copied from the base node plus
/// `baseid`, component index, and layout coordinates.
#[derive(Debug, Clone, Serialize)]
pub struct DynamicNode {
    pub layer: Id,
    pub node: Id,
    pub baseid: Id,
    pub weight: f64,
    #[serde(skip)]
    pub attrs: AttrMap,
    pub component: usize,
    pub x: i64,
    pub y: i64,
}

/// A directed edge between two dynamic nodes.
#[derive(Debug, Clone, Serialize)]
pub struct DynamicEdge {
    pub source: DyNodeId,
    pub target: DyNodeId,
    pub kind: DyEdgeKind,
}

impl Serialize for DyNodeId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&format!("{}:{}", self.layer, self.node))
    }
}

/// The complete extracted dynamic graph.
#[derive(Debug, Clone, Serialize, Default)]
pub struct DynamicGraph {
    pub nodes: Vec<DynamicNode>,
    #[serde(rename = "links")]
    pub edges: Vec<DynamicEdge>,
    pub component_count: usize,
}

impl DynamicGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn index(&self) -> BTreeMap<DyNodeId, usize> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (DyNodeId::new(n.layer, n.node), i))
            .collect()
    }
}
