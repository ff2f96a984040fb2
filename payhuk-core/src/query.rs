//! Query identity types.
//!
//! A [`QueryKey`] is the string the cache is indexed by. Free-form keys are
//! allowed, but backend table reads should derive theirs from a structured
//! [`TableQuery`] so that equal queries always produce equal keys.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;

/// Opaque identity of a logical query.
///
/// Two keys are the same query if and only if their strings are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryKey(String);

impl QueryKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for QueryKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl From<String> for QueryKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

impl AsRef<str> for QueryKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Equality filter on a single column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EqFilter {
    pub field: String,
    pub value: Value,
}

/// Result ordering on a single column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBy {
    pub field: String,
    pub ascending: bool,
}

/// A read against one backend table.
///
/// # Example
///
/// ```
/// use payhuk_core::TableQuery;
///
/// let query = TableQuery::new("products")
///     .with_select("id,name,price")
///     .with_eq("store_id", "abc")
///     .with_order("created_at", false)
///     .with_limit(20);
/// assert!(query.cache_key().as_str().starts_with("table:products:"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableQuery {
    pub table: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub select: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eq: Option<EqFilter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<OrderBy>,
}

impl TableQuery {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            select: None,
            eq: None,
            limit: None,
            order: None,
        }
    }

    pub fn with_select(mut self, columns: impl Into<String>) -> Self {
        self.select = Some(columns.into());
        self
    }

    pub fn with_eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.eq = Some(EqFilter {
            field: field.into(),
            value: value.into(),
        });
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_order(mut self, field: impl Into<String>, ascending: bool) -> Self {
        self.order = Some(OrderBy {
            field: field.into(),
            ascending,
        });
        self
    }

    /// Column list to request; `*` when none was given.
    pub fn columns(&self) -> &str {
        self.select.as_deref().unwrap_or("*")
    }

    /// Derive the canonical cache key for this query.
    ///
    /// Every component is JSON-encoded inside one object built in a fixed
    /// key order, so the encoding is injective and independent of how the
    /// query was built.
    pub fn cache_key(&self) -> QueryKey {
        let canonical = json!({
            "table": self.table,
            "select": self.columns(),
            "eq": self.eq.as_ref().map(|eq| json!([eq.field, eq.value])),
            "limit": self.limit,
            "order": self.order.as_ref().map(|o| json!([o.field, o.ascending])),
        });
        QueryKey(format!("table:{}:{}", self.table, canonical))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_query_key_equality_is_string_equality() {
        assert_eq!(QueryKey::from("k1"), QueryKey::new("k1".to_string()));
        assert_ne!(QueryKey::from("k1"), QueryKey::from("k2"));
        assert_eq!(QueryKey::from("k1").to_string(), "k1");
    }

    #[test]
    fn test_cache_key_ignores_builder_order() {
        let a = TableQuery::new("products")
            .with_eq("store_id", "abc")
            .with_limit(10);
        let b = TableQuery::new("products")
            .with_limit(10)
            .with_eq("store_id", "abc");
        assert_eq!(a.cache_key(), b.cache_key());
    }

    #[test]
    fn test_cache_key_default_select_matches_star() {
        let implicit = TableQuery::new("orders");
        let explicit = TableQuery::new("orders").with_select("*");
        assert_eq!(implicit.cache_key(), explicit.cache_key());
    }

    #[test]
    fn test_cache_key_distinguishes_value_types() {
        let text = TableQuery::new("products").with_eq("price", "10");
        let number = TableQuery::new("products").with_eq("price", 10);
        assert_ne!(text.cache_key(), number.cache_key());
    }

    #[test]
    fn test_cache_key_distinguishes_order_direction() {
        let asc = TableQuery::new("products").with_order("created_at", true);
        let desc = TableQuery::new("products").with_order("created_at", false);
        assert_ne!(asc.cache_key(), desc.cache_key());
    }

    #[test]
    fn test_table_query_deserializes_sparse_json() {
        let query: TableQuery = serde_json::from_str(
            r#"{"table":"products","eq":{"field":"store_id","value":"abc"}}"#,
        )
        .unwrap();
        assert_eq!(query.columns(), "*");
        assert_eq!(query.eq.as_ref().map(|e| e.field.as_str()), Some("store_id"));
        assert_eq!(query.limit, None);
    }

    fn ident() -> impl Strategy<Value = String> {
        "[a-z_:|=\\.]{1,12}"
    }

    proptest! {
        /// Property: queries that differ in table or filter never share a key.
        #[test]
        fn prop_cache_key_is_injective(
            table_a in ident(),
            table_b in ident(),
            field_a in ident(),
            field_b in ident(),
            value_a in ident(),
            value_b in ident(),
        ) {
            let a = TableQuery::new(table_a).with_eq(field_a, value_a);
            let b = TableQuery::new(table_b).with_eq(field_b, value_b);
            if a == b {
                prop_assert_eq!(a.cache_key(), b.cache_key());
            } else {
                prop_assert_ne!(a.cache_key(), b.cache_key());
            }
        }
    }
}
