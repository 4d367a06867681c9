//! # mlg-core
//!
//! Entity model and error taxonomy shared by every crate in the MLG engine.
//!
//! ## Architecture position
//!
//! Layer 1 (foundation) of the workspace: every other `mlg-*` crate depends
//! on this one. It carries no store access and no algorithmic behaviour,
//! only the plain value types (`Node`, `Layer`, `HLink`, `VLink`, `OLink`,
//! `CLink`, `Owns`), the dynamic attribute map, opaque ids, and the shared
//! `Error`/`Result`.

pub mod attrs;
pub mod entities;
pub mod error;
pub mod id;

pub use attrs::{attrs_eq, AttrMap, AttrValue};
pub use entities::{CLink, HLink, Layer, Node, OLink, Owns, VLink, DEFAULT_WEIGHT};
pub use error::{Error, Result};
pub use id::Id;

/// Convenient re-export bundle, mirroring the teacher workspace's `prelude`
/// modules.
pub mod prelude {
    pub use crate::attrs::{attrs_eq, AttrMap, AttrValue};
    pub use crate::entities::{CLink, HLink, Layer, Node, OLink, Owns, VLink, DEFAULT_WEIGHT};
    pub use crate::error::{Error, Result};
    pub use crate::id::Id;
}
