//! Opaque, ordered result sets returned by store queries.
//!
//! Spec §5 requires iteration over set-valued query results to be ordered
//! by id ascending, so this is a thin `BTreeSet` wrapper rather than a
//! hash set — the ordering is load-bearing, not incidental.

use std::collections::BTreeSet;
use std::iter::FromIterator;

use mlg_core::Id;

/// An opaque set of ids, as returned by neighborhood/selection/explosion
/// queries against the store (spec §4.1 "set algebra").
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdSet(BTreeSet<Id>);

impl IdSet {
    pub fn new() -> Self {
        IdSet(BTreeSet::new())
    }

    pub fn single(id: Id) -> Self {
        let mut s = BTreeSet::new();
        s.insert(id);
        IdSet(s)
    }

    pub fn add(&mut self, id: Id) -> bool {
        self.0.insert(id)
    }

    pub fn remove(&mut self, id: Id) -> bool {
        self.0.remove(&id)
    }

    pub fn exists(&self, id: Id) -> bool {
        self.0.contains(&id)
    }

    pub fn count(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn any(&self) -> Option<Id> {
        self.0.iter().next().copied()
    }

    pub fn union(&self, other: &IdSet) -> IdSet {
        IdSet(self.0.union(&other.0).copied().collect())
    }

    pub fn intersection(&self, other: &IdSet) -> IdSet {
        IdSet(self.0.intersection(&other.0).copied().collect())
    }

    pub fn difference(&self, other: &IdSet) -> IdSet {
        IdSet(self.0.difference(&other.0).copied().collect())
    }

    /// Iterator ordered by id ascending.
    pub fn iter(&self) -> impl Iterator<Item = Id> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<Id> for IdSet {
    fn from_iter<T: IntoIterator<Item = Id>>(iter: T) -> Self {
        IdSet(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a IdSet {
    type Item = Id;
    type IntoIter = std::iter::Copied<std::collections::btree_set::Iter<'a, Id>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter().copied()
    }
}
