//! The typed store adapter contract (spec §4.1).
//!
//! This is the entire surface the rest of the engine is allowed to assume
//! about the external out-of-core graph database. No DAO, selector,
//! merger, filter or extractor may reach around it.

use mlg_core::{AttrMap, AttrValue, Id, Result};

use crate::ids::IdSet;
use crate::schema::{Comparison, Direction, ObjectKind};

/// Thin contract over the external graph store.
///
/// Implementations own one ambient session: there is no explicit handle
/// threaded through calls, matching the single-transaction concurrency
/// model (spec §5). `begin`/`commit` bracket that session.
pub trait StoreAdapter {
    /// Starts the ambient session/transaction. A no-op if already begun.
    fn begin(&mut self);

    /// Commits the ambient session. After this call the adapter may be
    /// reused for a fresh session.
    fn commit(&mut self) -> Result<()>;

    /// Creates a node-kind object (`ObjectKind::Node` or `ObjectKind::Layer`)
    /// with the given attributes; unspecified declared attributes are
    /// filled with their schema default.
    fn create_node(&mut self, kind: ObjectKind, attrs: AttrMap) -> Result<Id>;

    /// Creates an edge-kind object between `tail` and `head`. For
    /// `ObjectKind::HLink` the pair is unordered.
    fn create_edge(&mut self, kind: ObjectKind, tail: Id, head: Id, attrs: AttrMap) -> Result<Id>;

    /// Looks up an object by id, returning `None` (recovered as NotFound
    /// locally by callers) if it does not exist or is the wrong kind.
    fn find(&self, kind: ObjectKind, id: Id) -> Option<()>;

    /// Finds the unique edge of `kind` between `tail` and `head`, if any.
    /// For `ObjectKind::HLink` this checks both orderings.
    fn find_edge(&self, kind: ObjectKind, tail: Id, head: Id) -> Option<Id>;

    /// Drops an object and, if it is a node-kind object, cascades to every
    /// edge incident to it (the DAOs rely on this for layer/node removal).
    fn drop(&mut self, id: Id) -> Result<()>;

    /// Reads a single attribute, or `None` if the attribute isn't declared
    /// for this object's kind or the object doesn't exist.
    fn get_attr(&self, id: Id, attr: &str) -> Option<AttrValue>;

    /// Sets a single attribute, auto-vivifying it to the schema default
    /// for any other declared attribute not yet set.
    fn set_attr(&mut self, id: Id, attr: &str, value: AttrValue) -> Result<()>;

    /// Reads the full attribute map, filtered to attributes declared for
    /// this object's schema kind.
    fn attrs(&self, id: Id) -> Option<AttrMap>;

    /// Replaces the full attribute map (only declared attribute names are
    /// retained; the rest are silently dropped).
    fn set_attrs(&mut self, id: Id, attrs: AttrMap) -> Result<()>;

    /// The two endpoints of an edge, as `(tail, head)`. For an `HLink` the
    /// order is whatever was supplied at creation time.
    fn edge_endpoints(&self, id: Id) -> Option<(Id, Id)>;

    /// Neighbor node ids reachable from `node` via edges of `kind` in the
    /// given direction.
    fn neighbors(&self, node: Id, kind: ObjectKind, dir: Direction) -> IdSet;

    /// Neighbor node ids reachable from any node in `nodes`.
    fn neighbors_of_set(&self, nodes: &IdSet, kind: ObjectKind, dir: Direction) -> IdSet;

    /// Incident edge ids of `kind` at `node` in the given direction.
    fn explode(&self, node: Id, kind: ObjectKind, dir: Direction) -> IdSet;

    /// Incident edge ids of `kind` at any node in `nodes`.
    fn explode_set(&self, nodes: &IdSet, kind: ObjectKind, dir: Direction) -> IdSet;

    /// Objects of `kind` whose `attr` compares `cmp` against `value`,
    /// optionally intersected with `restrict`.
    fn select(
        &self,
        kind: ObjectKind,
        attr: &str,
        cmp: Comparison,
        value: &AttrValue,
        restrict: Option<&IdSet>,
    ) -> IdSet;

    /// Min/max of a numeric attribute across every object of `kind`.
    fn attr_stats(&self, kind: ObjectKind, attr: &str) -> Option<(f64, f64)>;

    /// All ids of a given kind, ordered ascending.
    fn all_of_kind(&self, kind: ObjectKind) -> IdSet;
}
