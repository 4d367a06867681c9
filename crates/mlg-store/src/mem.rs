//! An in-memory reference implementation of [`StoreAdapter`].
//!
//! This is the only concrete adapter the workspace ships: every other
//! `mlg-*` crate's tests, and `mlg-demo`, exercise the engine against it.
//! The real out-of-core database is an external collaborator (spec §1) —
//! this type exists purely to give the trait a testable instantiation, in
//! the spirit of the teacher workspace's in-memory `BufferPool`/`CurveCache`
//! test doubles.

use std::collections::{BTreeMap, BTreeSet};

use mlg_core::{AttrMap, AttrValue, Error, Id, Result};

use crate::adapter::StoreAdapter;
use crate::ids::IdSet;
use crate::schema::{declared_attrs, Comparison, Direction, ObjectKind};

#[derive(Debug, Default)]
pub struct MemStore {
    next_id: u64,
    kind_of: BTreeMap<Id, ObjectKind>,
    attrs: BTreeMap<Id, AttrMap>,
    endpoints: BTreeMap<Id, (Id, Id)>,
    out_index: BTreeMap<(ObjectKind, Id), BTreeSet<Id>>,
    in_index: BTreeMap<(ObjectKind, Id), BTreeSet<Id>>,
    in_session: bool,
}

impl MemStore {
    pub fn new() -> Self {
        MemStore::default()
    }

    fn alloc_id(&mut self) -> Id {
        let id = Id::new(self.next_id);
        self.next_id += 1;
        id
    }

    fn default_attrs(kind: ObjectKind) -> AttrMap {
        declared_attrs(kind)
            .into_iter()
            .map(|def| (def.name.to_string(), def.default))
            .collect()
    }

    fn filtered(kind: ObjectKind, given: AttrMap) -> AttrMap {
        let declared: BTreeSet<&str> = declared_attrs(kind).iter().map(|d| d.name).collect();
        given
            .into_iter()
            .filter(|(k, _)| declared.contains(k.as_str()))
            .collect()
    }

    fn index_insert(&mut self, kind: ObjectKind, id: Id, tail: Id, head: Id) {
        if kind.is_undirected() {
            self.out_index.entry((kind, tail)).or_default().insert(id);
            self.out_index.entry((kind, head)).or_default().insert(id);
            self.in_index.entry((kind, tail)).or_default().insert(id);
            self.in_index.entry((kind, head)).or_default().insert(id);
        } else {
            self.out_index.entry((kind, tail)).or_default().insert(id);
            self.in_index.entry((kind, head)).or_default().insert(id);
        }
    }

    fn index_remove(&mut self, kind: ObjectKind, id: Id, tail: Id, head: Id) {
        if let Some(s) = self.out_index.get_mut(&(kind, tail)) {
            s.remove(&id);
        }
        if let Some(s) = self.out_index.get_mut(&(kind, head)) {
            s.remove(&id);
        }
        if let Some(s) = self.in_index.get_mut(&(kind, tail)) {
            s.remove(&id);
        }
        if let Some(s) = self.in_index.get_mut(&(kind, head)) {
            s.remove(&id);
        }
    }

    fn incident_edges(&self, node: Id) -> Vec<Id> {
        let mut out = BTreeSet::new();
        for kind in [
            ObjectKind::HLink,
            ObjectKind::VLink,
            ObjectKind::OLink,
            ObjectKind::CLink,
            ObjectKind::Owns,
        ] {
            if let Some(s) = self.out_index.get(&(kind, node)) {
                out.extend(s.iter().copied());
            }
            if let Some(s) = self.in_index.get(&(kind, node)) {
                out.extend(s.iter().copied());
            }
        }
        out.into_iter().collect()
    }
}

impl StoreAdapter for MemStore {
    fn begin(&mut self) {
        self.in_session = true;
    }

    fn commit(&mut self) -> Result<()> {
        self.in_session = false;
        Ok(())
    }

    fn create_node(&mut self, kind: ObjectKind, attrs: AttrMap) -> Result<Id> {
        if kind.is_edge() {
            return Err(Error::invalid_argument(format!(
                "{kind:?} is not a node kind"
            )));
        }
        let id = self.alloc_id();
        let mut merged = Self::default_attrs(kind);
        merged.extend(Self::filtered(kind, attrs));
        self.kind_of.insert(id, kind);
        self.attrs.insert(id, merged);
        Ok(id)
    }

    fn create_edge(&mut self, kind: ObjectKind, tail: Id, head: Id, attrs: AttrMap) -> Result<Id> {
        if !kind.is_edge() {
            return Err(Error::invalid_argument(format!(
                "{kind:?} is not an edge kind"
            )));
        }
        let id = self.alloc_id();
        let mut merged = Self::default_attrs(kind);
        merged.extend(Self::filtered(kind, attrs));
        self.kind_of.insert(id, kind);
        self.attrs.insert(id, merged);
        self.endpoints.insert(id, (tail, head));
        self.index_insert(kind, id, tail, head);
        Ok(id)
    }

    fn find(&self, kind: ObjectKind, id: Id) -> Option<()> {
        if self.kind_of.get(&id) == Some(&kind) {
            Some(())
        } else {
            None
        }
    }

    fn find_edge(&self, kind: ObjectKind, tail: Id, head: Id) -> Option<Id> {
        let candidates = self.out_index.get(&(kind, tail))?;
        candidates.iter().copied().find(|eid| {
            let Some(&(t, h)) = self.endpoints.get(eid) else {
                return false;
            };
            if kind.is_undirected() {
                (t == tail && h == head) || (t == head && h == tail)
            } else {
                t == tail && h == head
            }
        })
    }

    fn drop(&mut self, id: Id) -> Result<()> {
        let Some(kind) = self.kind_of.get(&id).copied() else {
            return Ok(());
        };
        if kind.is_edge() {
            if let Some((t, h)) = self.endpoints.remove(&id) {
                self.index_remove(kind, id, t, h);
            }
            self.kind_of.remove(&id);
            self.attrs.remove(&id);
        } else {
            for edge_id in self.incident_edges(id) {
                self.drop(edge_id)?;
            }
            self.kind_of.remove(&id);
            self.attrs.remove(&id);
        }
        Ok(())
    }

    fn get_attr(&self, id: Id, attr: &str) -> Option<AttrValue> {
        self.attrs.get(&id)?.get(attr).cloned()
    }

    fn set_attr(&mut self, id: Id, attr: &str, value: AttrValue) -> Result<()> {
        let kind = self
            .kind_of
            .get(&id)
            .copied()
            .ok_or_else(|| Error::not_found(format!("object {id}")))?;
        let declared = declared_attrs(kind);
        if !declared.iter().any(|d| d.name == attr) {
            tracing::debug!(%id, attr, "set_attr on undeclared attribute ignored");
            return Ok(());
        }
        self.attrs
            .entry(id)
            .or_insert_with(|| Self::default_attrs(kind))
            .insert(attr.to_string(), value);
        Ok(())
    }

    fn attrs(&self, id: Id) -> Option<AttrMap> {
        let kind = *self.kind_of.get(&id)?;
        let mut out = Self::default_attrs(kind);
        if let Some(stored) = self.attrs.get(&id) {
            out.extend(stored.clone());
        }
        Some(out)
    }

    fn set_attrs(&mut self, id: Id, attrs: AttrMap) -> Result<()> {
        let kind = self
            .kind_of
            .get(&id)
            .copied()
            .ok_or_else(|| Error::not_found(format!("object {id}")))?;
        let mut merged = Self::default_attrs(kind);
        if let Some(existing) = self.attrs.get(&id) {
            merged.extend(existing.clone());
        }
        merged.extend(Self::filtered(kind, attrs));
        self.attrs.insert(id, merged);
        Ok(())
    }

    fn edge_endpoints(&self, id: Id) -> Option<(Id, Id)> {
        self.endpoints.get(&id).copied()
    }

    fn neighbors(&self, node: Id, kind: ObjectKind, dir: Direction) -> IdSet {
        self.explode(node, kind, dir)
            .iter()
            .filter_map(|eid| {
                self.endpoints
                    .get(&eid)
                    .map(|&(t, h)| if t == node { h } else { t })
            })
            .collect()
    }

    fn neighbors_of_set(&self, nodes: &IdSet, kind: ObjectKind, dir: Direction) -> IdSet {
        let mut out = IdSet::new();
        for node in nodes.iter() {
            for n in self.neighbors(node, kind, dir).iter() {
                out.add(n);
            }
        }
        out
    }

    fn explode(&self, node: Id, kind: ObjectKind, dir: Direction) -> IdSet {
        match dir {
            Direction::Outgoing => self
                .out_index
                .get(&(kind, node))
                .map(|s| s.iter().copied().collect())
                .unwrap_or_default(),
            Direction::Ingoing => self
                .in_index
                .get(&(kind, node))
                .map(|s| s.iter().copied().collect())
                .unwrap_or_default(),
            Direction::Any => {
                let out: IdSet = self
                    .out_index
                    .get(&(kind, node))
                    .map(|s| s.iter().copied().collect())
                    .unwrap_or_default();
                let inn: IdSet = self
                    .in_index
                    .get(&(kind, node))
                    .map(|s| s.iter().copied().collect())
                    .unwrap_or_default();
                out.union(&inn)
            }
        }
    }

    fn explode_set(&self, nodes: &IdSet, kind: ObjectKind, dir: Direction) -> IdSet {
        let mut out = IdSet::new();
        for node in nodes.iter() {
            for e in self.explode(node, kind, dir).iter() {
                out.add(e);
            }
        }
        out
    }

    fn select(
        &self,
        kind: ObjectKind,
        attr: &str,
        cmp: Comparison,
        value: &AttrValue,
        restrict: Option<&IdSet>,
    ) -> IdSet {
        let mut out = IdSet::new();
        for (&id, &k) in self.kind_of.iter() {
            if k != kind {
                continue;
            }
            if let Some(r) = restrict {
                if !r.exists(id) {
                    continue;
                }
            }
            let current = self.get_attr(id, attr).unwrap_or(AttrValue::Null);
            let matches = match (current.as_f64(), value.as_f64()) {
                (Some(a), Some(b)) => cmp.matches_f64(a, b),
                _ => cmp == Comparison::Eq && current == *value,
            };
            if matches {
                out.add(id);
            }
        }
        out
    }

    fn attr_stats(&self, kind: ObjectKind, attr: &str) -> Option<(f64, f64)> {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut any = false;
        for (&id, &k) in self.kind_of.iter() {
            if k != kind {
                continue;
            }
            if let Some(v) = self.get_attr(id, attr).and_then(|v| v.as_f64()) {
                any = true;
                min = min.min(v);
                max = max.max(v);
            }
        }
        any.then_some((min, max))
    }

    fn all_of_kind(&self, kind: ObjectKind) -> IdSet {
        self.kind_of
            .iter()
            .filter(|(_, &k)| k == kind)
            .map(|(&id, _)| id)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_and_read_node_with_defaults() {
        let mut s = MemStore::new();
        let id = s.create_node(ObjectKind::Node, AttrMap::new()).unwrap();
        assert_eq!(s.get_attr(id, "weight"), Some(AttrValue::Double(1.0)));
    }

    #[test]
    fn undeclared_attribute_is_silently_dropped() {
        let mut s = MemStore::new();
        let mut attrs = AttrMap::new();
        attrs.insert("mystery".into(), AttrValue::Int32(5));
        let id = s.create_node(ObjectKind::Node, attrs).unwrap();
        assert_eq!(s.get_attr(id, "mystery"), None);
    }

    #[test]
    fn hlink_neighbors_are_symmetric() {
        let mut s = MemStore::new();
        let a = s.create_node(ObjectKind::Node, AttrMap::new()).unwrap();
        let b = s.create_node(ObjectKind::Node, AttrMap::new()).unwrap();
        s.create_edge(ObjectKind::HLink, a, b, AttrMap::new())
            .unwrap();
        assert!(s
            .neighbors(a, ObjectKind::HLink, Direction::Any)
            .exists(b));
        assert!(s
            .neighbors(b, ObjectKind::HLink, Direction::Any)
            .exists(a));
        assert!(s
            .neighbors(a, ObjectKind::HLink, Direction::Outgoing)
            .exists(b));
    }

    #[test]
    fn dropping_node_cascades_to_incident_edges() {
        let mut s = MemStore::new();
        let a = s.create_node(ObjectKind::Node, AttrMap::new()).unwrap();
        let b = s.create_node(ObjectKind::Node, AttrMap::new()).unwrap();
        let e = s
            .create_edge(ObjectKind::HLink, a, b, AttrMap::new())
            .unwrap();
        s.drop(a).unwrap();
        assert!(s.find(ObjectKind::HLink, e).is_none());
        assert!(s.neighbors(b, ObjectKind::HLink, Direction::Any).is_empty());
    }

    #[test]
    fn select_filters_by_comparison() {
        let mut s = MemStore::new();
        let mut attrs = AttrMap::new();
        attrs.insert("weight".into(), AttrValue::Double(5.0));
        let hi = s.create_node(ObjectKind::Node, attrs).unwrap();
        let lo = s.create_node(ObjectKind::Node, AttrMap::new()).unwrap();
        let sel = s.select(
            ObjectKind::Node,
            "weight",
            Comparison::Ge,
            &AttrValue::Double(2.0),
            None,
        );
        assert!(sel.exists(hi));
        assert!(!sel.exists(lo));
    }

    #[test]
    fn attr_stats_min_max() {
        let mut s = MemStore::new();
        let mut a1 = AttrMap::new();
        a1.insert("weight".into(), AttrValue::Double(3.0));
        s.create_node(ObjectKind::Node, a1).unwrap();
        let mut a2 = AttrMap::new();
        a2.insert("weight".into(), AttrValue::Double(9.0));
        s.create_node(ObjectKind::Node, a2).unwrap();
        let (min, max) = s.attr_stats(ObjectKind::Node, "weight").unwrap();
        assert_eq!(min, 3.0);
        assert_eq!(max, 9.0);
    }
}
