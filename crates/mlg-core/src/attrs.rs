//! The dynamic attribute map carried by every entity.
//!
//! The store schema can grow attributes at runtime, so entities carry a
//! name -> tagged value map rather than fixed struct fields beyond the
//! handful (weight, label, ...) the spec calls out explicitly.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::id::Id;

/// A single typed attribute value.
///
/// Round-trips null / bool / int32 / int64 / double / timestamp / string /
/// opaque-id without loss, per the attribute map abstraction design note.
/// `Blob` stands in for values the schema marks opaque; it is carried but
/// never compared (see [`attrs_eq`]).
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Null,
    Bool(bool),
    Int32(i32),
    Int64(i64),
    Double(f64),
    String(String),
    Timestamp(DateTime<Utc>),
    Id(Id),
    Blob(Vec<u8>),
}

impl AttrValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttrValue::Double(v) => Some(*v),
            AttrValue::Int32(v) => Some(*v as f64),
            AttrValue::Int64(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttrValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl From<f64> for AttrValue {
    fn from(v: f64) -> Self {
        AttrValue::Double(v)
    }
}

impl From<bool> for AttrValue {
    fn from(v: bool) -> Self {
        AttrValue::Bool(v)
    }
}

impl From<String> for AttrValue {
    fn from(v: String) -> Self {
        AttrValue::String(v)
    }
}

impl From<&str> for AttrValue {
    fn from(v: &str) -> Self {
        AttrValue::String(v.to_string())
    }
}

/// A dynamic attribute map, ordered by key so iteration (and therefore
/// equality and golden-test output) is deterministic.
pub type AttrMap = BTreeMap<String, AttrValue>;

/// Entity equality as specified: compares element-wise, string attributes
/// by content, opaque blob attributes ignored entirely.
pub fn attrs_eq(a: &AttrMap, b: &AttrMap) -> bool {
    let filtered = |m: &AttrMap| -> BTreeMap<&String, &AttrValue> {
        m.iter()
            .filter(|(_, v)| !matches!(v, AttrValue::Blob(_)))
            .collect()
    };
    filtered(a) == filtered(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blob_attributes_are_ignored_in_equality() {
        let mut a = AttrMap::new();
        a.insert("w".into(), AttrValue::Double(1.0));
        a.insert("payload".into(), AttrValue::Blob(vec![1, 2, 3]));

        let mut b = AttrMap::new();
        b.insert("w".into(), AttrValue::Double(1.0));
        b.insert("payload".into(), AttrValue::Blob(vec![9, 9]));

        assert!(attrs_eq(&a, &b));
    }

    #[test]
    fn differing_non_blob_values_are_unequal() {
        let mut a = AttrMap::new();
        a.insert("w".into(), AttrValue::Double(1.0));
        let mut b = AttrMap::new();
        b.insert("w".into(), AttrValue::Double(2.0));
        assert!(!attrs_eq(&a, &b));
    }

    #[test]
    fn string_attributes_compare_by_content() {
        let mut a = AttrMap::new();
        a.insert("label".into(), AttrValue::String("north".into()));
        let mut b = AttrMap::new();
        b.insert("label".into(), AttrValue::String("north".into()));
        assert!(attrs_eq(&a, &b));
    }
}
