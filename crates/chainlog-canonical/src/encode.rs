//! The canonical encoder.
//!
//! Maps a `CanonicalValue` to a unique byte string: JSON text with object
//! keys in byte-wise lexicographic order, a single fixed spelling for every
//! number, and standard JSON string escaping. Structurally identical values
//! always produce identical bytes, regardless of how they were built.
//!
//! The encoder fails loudly instead of coercing:
//!
//! - non-finite numbers have no canonical form;
//! - the reserved keys `__proto__`, `constructor`, and `prototype` are
//!   forbidden at any nesting level;
//! - nesting past `MAX_DEPTH` is cut off (sharing and cycles are
//!   unrepresentable in the owned value tree, so runaway depth is the one
//!   remaining pathological shape).
//!
//! Every failure names the exact path of the offending value, e.g.
//! `$.payload.items[2].amount`.

use chainlog_contracts::{error::EncodingError, value::CanonicalValue};

/// Maximum nesting depth the encoder will follow.
pub const MAX_DEPTH: usize = 128;

/// Keys that may not appear in any object, at any level.
pub const FORBIDDEN_KEYS: [&str; 3] = ["__proto__", "constructor", "prototype"];

/// One step of the path from the root to the value being encoded.
enum Segment<'a> {
    Key(&'a str),
    Index(usize),
}

fn render_path(segments: &[Segment<'_>]) -> String {
    let mut rendered = String::from("$");
    for segment in segments {
        match segment {
            Segment::Key(key) => {
                rendered.push('.');
                rendered.push_str(key);
            }
            Segment::Index(i) => {
                rendered.push('[');
                rendered.push_str(&i.to_string());
                rendered.push(']');
            }
        }
    }
    rendered
}

/// Encode `value` to its canonical byte string.
///
/// Pure function, no side effects. The returned `String` is the exact
/// UTF-8 input the digest function hashes.
pub fn encode(value: &CanonicalValue) -> Result<String, EncodingError> {
    let mut out = String::new();
    let mut path: Vec<Segment<'_>> = Vec::new();
    encode_value(value, &mut out, &mut path)?;
    Ok(out)
}

fn encode_value<'v>(
    value: &'v CanonicalValue,
    out: &mut String,
    path: &mut Vec<Segment<'v>>,
) -> Result<(), EncodingError> {
    if path.len() >= MAX_DEPTH {
        return Err(EncodingError::DepthExceeded {
            path: render_path(path),
            limit: MAX_DEPTH,
        });
    }

    match value {
        CanonicalValue::Null => out.push_str("null"),
        CanonicalValue::Bool(true) => out.push_str("true"),
        CanonicalValue::Bool(false) => out.push_str("false"),
        CanonicalValue::Int(i) => out.push_str(&i.to_string()),
        CanonicalValue::Float(f) => encode_float(*f, out, path)?,
        CanonicalValue::Str(s) => encode_string(s, out),

        CanonicalValue::List(items) => {
            // Insertion order preserved — order is semantically significant
            // for lists.
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                path.push(Segment::Index(i));
                encode_value(item, out, path)?;
                path.pop();
            }
            out.push(']');
        }

        CanonicalValue::Object(fields) => {
            // BTreeMap iteration order is byte-wise lexicographic, which is
            // exactly the canonical key order.
            out.push('{');
            for (i, (key, item)) in fields.iter().enumerate() {
                if FORBIDDEN_KEYS.contains(&key.as_str()) {
                    return Err(EncodingError::ForbiddenKey {
                        path: render_path(path),
                        key: key.clone(),
                    });
                }
                if i > 0 {
                    out.push(',');
                }
                encode_string(key, out);
                out.push(':');
                path.push(Segment::Key(key));
                encode_value(item, out, path)?;
                path.pop();
            }
            out.push('}');
        }
    }

    Ok(())
}

/// Encode a float with a single fixed spelling.
///
/// Integral values inside the f64-exact range encode without a fractional
/// part, so the logical number 1 yields the same bytes whether it was built
/// as `Int(1)` or `Float(1.0)`. Everything else uses the shortest decimal
/// that round-trips (ryu, via `serde_json::Number`).
fn encode_float(
    f: f64,
    out: &mut String,
    path: &[Segment<'_>],
) -> Result<(), EncodingError> {
    if !f.is_finite() {
        return Err(EncodingError::NonFinite {
            path: render_path(path),
        });
    }

    // 2^53: the largest magnitude at which every integer is f64-exact.
    const MAX_EXACT: f64 = 9_007_199_254_740_992.0;

    if f.fract() == 0.0 && f.abs() <= MAX_EXACT {
        out.push_str(&(f as i64).to_string());
        return Ok(());
    }

    let n = serde_json::Number::from_f64(f).ok_or_else(|| EncodingError::NonFinite {
        path: render_path(path),
    })?;
    out.push_str(&n.to_string());
    Ok(())
}

/// Standard JSON string escaping: quote, backslash, the short control
/// escapes, `\u00xx` for remaining control characters. Non-ASCII passes
/// through as UTF-8 with no additional normalization.
fn encode_string(s: &str, out: &mut String) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{0008}' => out.push_str("\\b"),
            '\u{000C}' => out.push_str("\\f"),
            c if (c as u32) < 0x20 => {
                out.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push('"');
}
