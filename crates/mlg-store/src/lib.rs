//! The typed store adapter boundary (spec §4.1).
//!
//! This crate defines [`StoreAdapter`], the only contract the rest of the
//! engine is allowed to assume about the external graph database, plus the
//! schema it is typed over and one in-memory reference implementation used
//! by every other crate's tests.

pub mod adapter;
pub mod ids;
pub mod mem;
pub mod schema;

pub use adapter::StoreAdapter;
pub use ids::IdSet;
pub use mem::MemStore;
pub use schema::{declared_attrs, AttrDef, Comparison, Direction, ObjectKind};

pub mod prelude {
    pub use crate::{
        declared_attrs, AttrDef, Comparison, Direction, IdSet, MemStore, ObjectKind, StoreAdapter,
    };
}
