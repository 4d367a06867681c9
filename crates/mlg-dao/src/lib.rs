//! # mlg-dao
//!
//! The Layer DAO, Node/Link DAO, and the MLG DAO that composes them into
//! layer-aware operations (spec §4.3-§4.5). Everything above this crate —
//! selectors, mergers, the coarsener, the filter, the extractor — talks to
//! the store exclusively through [`MlgDao`].

pub mod layer;
pub mod mlg;
pub mod node_link;

pub use layer::LayerDao;
pub use mlg::{Affiliation, Merger, MlgDao, SignalDirection, VDirection};
pub use node_link::NodeLinkDao;

pub mod prelude {
    pub use crate::{Affiliation, LayerDao, Merger, MlgDao, NodeLinkDao, SignalDirection, VDirection};
}
