//! # mlg-coarsen
//!
//! Selectors, mergers, the coarsener, and the plan builder (spec
//! §4.6-§4.9) — the layer-reduction half of the engine, sitting on top of
//! [`mlg_dao`].

pub mod builder;
pub mod coarsener;
pub mod merger;
pub mod selector;

pub use builder::{parse_plan, Builder, PlanStep, SelectorKind};
pub use coarsener::NeighborCoarsener;
pub use merger::{AdditiveMerger, Merger};
pub use selector::{HeavyHLinkSelector, Selector, SelectorState, XSelector};

pub mod prelude {
    pub use crate::{
        AdditiveMerger, Builder, HeavyHLinkSelector, Merger, NeighborCoarsener, PlanStep,
        Selector, SelectorKind, XSelector,
    };
}
