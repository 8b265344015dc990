//! Typed column values.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

/// A table targeted by mutations, with the name of its primary-key column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Table {
    pub name: &'static str,
    pub key: &'static str,
}

impl Table {
    pub const fn new(name: &'static str, key: &'static str) -> Self {
        Self { name, key }
    }
}

/// A single column value.
///
/// Nullable columns keep their SQL type even when null, so a cleared
/// timestamp still binds as a timestamp.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(Option<i64>),
    Text(Option<String>),
    Timestamp(Option<DateTime<Utc>>),
    Json(serde_json::Value),
}

impl Value {
    pub fn int(v: i64) -> Self {
        Value::Int(Some(v))
    }

    pub fn text(v: impl Into<String>) -> Self {
        Value::Text(Some(v.into()))
    }

    pub fn timestamp(v: DateTime<Utc>) -> Self {
        Value::Timestamp(Some(v))
    }

    /// Returns true for a typed SQL NULL.
    pub fn is_null(&self) -> bool {
        matches!(
            self,
            Value::Int(None) | Value::Text(None) | Value::Timestamp(None)
        ) || matches!(self, Value::Json(serde_json::Value::Null))
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => *v,
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(v) => v.as_deref(),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            Value::Timestamp(v) => *v,
            _ => None,
        }
    }

    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Value::Json(v) => Some(v),
            _ => None,
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::int(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(Some(v))
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::text(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::timestamp(v)
    }
}

impl From<Option<String>> for Value {
    fn from(v: Option<String>) -> Self {
        Value::Text(v)
    }
}

impl From<Option<DateTime<Utc>>> for Value {
    fn from(v: Option<DateTime<Utc>>) -> Self {
        Value::Timestamp(v)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        Value::Json(v)
    }
}

/// Column name to value. Column names are compile-time constants so they
/// can be spliced into generated SQL.
pub type Columns = BTreeMap<&'static str, Value>;

/// A stored row, as seen by readers of the in-memory store.
pub type Row = Columns;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_nulls_are_null() {
        assert!(Value::Int(None).is_null());
        assert!(Value::Text(None).is_null());
        assert!(Value::Timestamp(None).is_null());
        assert!(Value::Json(serde_json::Value::Null).is_null());
        assert!(!Value::int(0).is_null());
        assert!(!Value::text("").is_null());
    }

    #[test]
    fn accessors_match_variants() {
        let now = Utc::now();
        assert_eq!(Value::int(7).as_i64(), Some(7));
        assert_eq!(Value::text("a").as_str(), Some("a"));
        assert_eq!(Value::timestamp(now).as_timestamp(), Some(now));
        assert_eq!(Value::text("a").as_i64(), None);
        assert_eq!(Value::int(1).as_str(), None);
    }
}
