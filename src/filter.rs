//! Filter descriptions and their wire query-string encoding.
//!
//! A [`Filter`] describes which records to retrieve: equality constraints
//! per field, an optional limit, and an optional offset. Translation to the
//! LoopBack bracket-notation query string is pure: no I/O, no mutation.
//!
//! ## Wire format
//!
//! ```text
//! ?filter[where][id]=1&filter[limit]=1&filter[skip]=2
//! ```
//!
//! A list-valued constraint becomes an inclusion (`inq`) operator:
//!
//! ```text
//! ?filter[where][role][inq][]=admin&filter[where][role][inq][]=ops
//! ```
//!
//! A non-list JSON object is passed through verbatim under the field's
//! bracket path, so callers can express advanced operators directly:
//!
//! ```text
//! ?filter[where][age][gt]=5
//! ```

use std::collections::BTreeMap;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde_json::Value;

/// Characters percent-encoded in key segments and values.
///
/// Everything outside the RFC 3986 unreserved set is encoded. The structural
/// brackets of the key paths are emitted literally; brackets appearing in
/// field names or values are encoded like any other reserved character.
const QUERY_ENCODE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// A declarative description of which records to retrieve.
///
/// Field order is deterministic (sorted by field name), so a given filter
/// always renders to the same query string.
///
/// ## Examples
///
/// ```rust
/// use loopback_datastore::Filter;
/// use serde_json::json;
///
/// let filter = Filter::new()
///     .eq("status", "active")
///     .eq("role", json!(["admin", "ops"]))
///     .limit(10)
///     .offset(20);
///
/// assert_eq!(
///     filter.to_query_string(),
///     "?filter[where][role][inq][]=admin&filter[where][role][inq][]=ops\
///      &filter[where][status]=active&filter[limit]=10&filter[skip]=20"
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    where_clause: BTreeMap<String, Value>,
    limit: Option<u64>,
    offset: Option<u64>,
}

impl Filter {
    /// Creates an empty filter. An empty filter renders to the empty
    /// string, never `"?"`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a constraint on `field`.
    ///
    /// - A scalar value is an equality constraint.
    /// - An array value is an inclusion constraint (the field must equal
    ///   one of the members).
    /// - A non-array JSON object is passed through verbatim, assumed to
    ///   already be in wire shape (e.g. `json!({"gt": 5})`).
    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.where_clause.insert(field.into(), value.into());
        self
    }

    /// Caps the number of returned rows.
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Skips the first `offset` rows. Emitted under the wire name `skip`.
    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Returns `true` if no constraint, limit, or offset is set.
    pub fn is_empty(&self) -> bool {
        self.where_clause.is_empty() && self.limit.is_none() && self.offset.is_none()
    }

    /// Renders the wire query string, including the leading `?`.
    ///
    /// Returns the empty string for an empty filter.
    pub fn to_query_string(&self) -> String {
        let mut pairs: Vec<(String, String)> = Vec::new();
        for (field, value) in &self.where_clause {
            let key = format!("filter[where][{}]", encode(field));
            push_where_value(&mut pairs, key, value);
        }
        if let Some(limit) = self.limit {
            pairs.push(("filter[limit]".to_string(), limit.to_string()));
        }
        if let Some(offset) = self.offset {
            pairs.push(("filter[skip]".to_string(), offset.to_string()));
        }

        if pairs.is_empty() {
            return String::new();
        }
        let encoded: Vec<String> = pairs
            .iter()
            .map(|(key, value)| format!("{key}={}", encode(value)))
            .collect();
        format!("?{}", encoded.join("&"))
    }
}

/// Renders the query string for an optional filter; absent means no query.
pub(crate) fn query_string(filter: Option<&Filter>) -> String {
    filter.map(Filter::to_query_string).unwrap_or_default()
}

/// Encodes a top-level where value under `key`.
///
/// Arrays get the `inq` inclusion operator; objects recurse as passthrough.
fn push_where_value(pairs: &mut Vec<(String, String)>, key: String, value: &Value) {
    match value {
        Value::Array(items) => {
            for item in items {
                pairs.push((format!("{key}[inq][]"), scalar_text(item)));
            }
        }
        Value::Object(_) => push_passthrough(pairs, key, value),
        other => pairs.push((key, scalar_text(other))),
    }
}

/// Encodes a passthrough constraint object recursively.
///
/// Inside a passthrough object the `inq` wrapping does not apply; nested
/// arrays encode as repeated `key[]` members.
fn push_passthrough(pairs: &mut Vec<(String, String)>, key: String, value: &Value) {
    match value {
        Value::Object(map) => {
            for (member, inner) in map {
                push_passthrough(pairs, format!("{key}[{}]", encode(member)), inner);
            }
        }
        Value::Array(items) => {
            for item in items {
                pairs.push((format!("{key}[]"), scalar_text(item)));
            }
        }
        other => pairs.push((key, scalar_text(other))),
    }
}

/// Renders a scalar JSON value as query-string text.
///
/// Strings render without quotes; `null` renders as the empty string.
fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn encode(text: &str) -> String {
    utf8_percent_encode(text, QUERY_ENCODE).to_string()
}
