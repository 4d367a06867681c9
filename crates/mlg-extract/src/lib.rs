pub mod extractor;
pub mod types;
mod union_find;

pub use extractor::ComponentExtractor;
pub use types::{DyEdgeKind, DyNodeId, DynamicEdge, DynamicGraph, DynamicNode};

pub mod prelude {
    pub use crate::{ComponentExtractor, DyEdgeKind, DyNodeId, DynamicEdge, DynamicGraph, DynamicNode};
}
