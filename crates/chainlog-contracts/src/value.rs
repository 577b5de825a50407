//! The canonical value model.
//!
//! `CanonicalValue` is the explicit tagged union of everything the canonical
//! encoder accepts: null, booleans, finite numbers, strings, lists, and
//! string-keyed objects. Anything else — binary blobs, date objects, map/set
//! wrappers, values with hidden type tags, cyclic references — is
//! unrepresentable in this owned tree and therefore rejected by
//! construction. The two illegal shapes the type system cannot rule out
//! (non-finite floats and reserved object keys) are rejected at encode time
//! with a path-qualified error.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::EncodingError;

/// A structured value with a unique, deterministic byte encoding.
///
/// Serializes as plain JSON (`untagged`): integers deserialize to `Int`,
/// non-integral numbers to `Float`. Object keys live in a `BTreeMap`, so
/// they are byte-wise lexicographically ordered by construction — two
/// structurally identical objects built with different insertion orders are
/// already equal here, before the encoder ever runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CanonicalValue {
    /// JSON `null`.
    Null,
    /// `true` / `false`.
    Bool(bool),
    /// A signed 64-bit integer.
    Int(i64),
    /// An IEEE-754 double. Must be finite by the time it is encoded.
    Float(f64),
    /// A UTF-8 string.
    Str(String),
    /// An ordered list. Element order is semantically significant.
    List(Vec<CanonicalValue>),
    /// A string-keyed object with byte-ordered keys.
    Object(BTreeMap<String, CanonicalValue>),
}

impl From<bool> for CanonicalValue {
    fn from(v: bool) -> Self {
        CanonicalValue::Bool(v)
    }
}

impl From<i64> for CanonicalValue {
    fn from(v: i64) -> Self {
        CanonicalValue::Int(v)
    }
}

impl From<f64> for CanonicalValue {
    fn from(v: f64) -> Self {
        CanonicalValue::Float(v)
    }
}

impl From<&str> for CanonicalValue {
    fn from(v: &str) -> Self {
        CanonicalValue::Str(v.to_string())
    }
}

impl From<String> for CanonicalValue {
    fn from(v: String) -> Self {
        CanonicalValue::Str(v)
    }
}

impl From<Vec<CanonicalValue>> for CanonicalValue {
    fn from(v: Vec<CanonicalValue>) -> Self {
        CanonicalValue::List(v)
    }
}

impl TryFrom<serde_json::Value> for CanonicalValue {
    type Error = EncodingError;

    /// Strict conversion from a dynamic JSON value.
    ///
    /// Fails with `EncodingError::IntegerOverflow` when a number cannot be
    /// represented as an `i64` or a finite `f64` — the arbitrary-precision
    /// exclusion. The error names the path of the offending number.
    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        from_json(value, &mut vec![])
    }
}

/// Path-tracked recursive conversion backing `TryFrom<serde_json::Value>`.
fn from_json(
    value: serde_json::Value,
    path: &mut Vec<String>,
) -> Result<CanonicalValue, EncodingError> {
    Ok(match value {
        serde_json::Value::Null => CanonicalValue::Null,
        serde_json::Value::Bool(b) => CanonicalValue::Bool(b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                CanonicalValue::Int(i)
            } else if let Some(f) = n.as_f64() {
                CanonicalValue::Float(f)
            } else {
                // u64 above i64::MAX: representable in JSON, not in the
                // canonical form.
                return Err(EncodingError::IntegerOverflow {
                    path: render_path(path),
                    value: n.to_string(),
                });
            }
        }
        serde_json::Value::String(s) => CanonicalValue::Str(s),
        serde_json::Value::Array(items) => {
            let mut out = Vec::with_capacity(items.len());
            for (i, item) in items.into_iter().enumerate() {
                path.push(format!("[{i}]"));
                out.push(from_json(item, path)?);
                path.pop();
            }
            CanonicalValue::List(out)
        }
        serde_json::Value::Object(map) => {
            let mut out = BTreeMap::new();
            for (key, item) in map {
                path.push(format!(".{key}"));
                let converted = from_json(item, path)?;
                path.pop();
                out.insert(key, converted);
            }
            CanonicalValue::Object(out)
        }
    })
}

fn render_path(segments: &[String]) -> String {
    let mut rendered = String::from("$");
    for segment in segments {
        rendered.push_str(segment);
    }
    rendered
}
