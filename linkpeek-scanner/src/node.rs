//! Typed access to the untyped `pageProps` tree.
//!
//! The payload is loosely typed: the same field shows up as a number on one
//! account and as a string on another. Nothing in here fails. Accessors return
//! `None` on a type mismatch and [`coerce_or_default`] is the one place that
//! turns a `None` into the documented default.

use serde_json::Value;
use tracing::{debug, warn};

/// Arbitrary JSON as found in the page. Produced once per fetch, read-only afterwards.
pub type UntypedNode = Value;

/// Result of a coercion, remembering whether the default had to be substituted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coerced<T> {
    /// The node existed and converted to the expected type.
    Parsed(T),
    /// The node was missing or mistyped; this is the default.
    Defaulted(T),
}

impl<T> Coerced<T> {
    pub fn into_inner(self) -> T {
        match self {
            Coerced::Parsed(value) | Coerced::Defaulted(value) => value,
        }
    }

    pub fn is_defaulted(&self) -> bool {
        matches!(self, Coerced::Defaulted(_))
    }
}

/// Convert `node` with `convert`, falling back to `default` when the node is
/// absent or `convert` rejects it.
pub fn coerce_or_default<T>(
    field: &str,
    node: Option<&UntypedNode>,
    convert: impl FnOnce(&UntypedNode) -> Option<T>,
    default: T,
) -> Coerced<T> {
    match node {
        None | Some(Value::Null) => {
            debug!("{} absent, using default", field);
            Coerced::Defaulted(default)
        }
        Some(value) => match convert(value) {
            Some(parsed) => Coerced::Parsed(parsed),
            None => {
                warn!("{} has unexpected value {}, using default", field, kind_of(value));
                Coerced::Defaulted(default)
            }
        },
    }
}

pub fn as_array(node: &UntypedNode) -> Option<&[Value]> {
    node.as_array().map(Vec::as_slice)
}

pub fn as_string(node: &UntypedNode) -> Option<String> {
    node.as_str().map(str::to_string)
}

/// Like [`as_string`] but treats `""` as missing.
pub fn as_non_empty_string(node: &UntypedNode) -> Option<String> {
    node.as_str().filter(|s| !s.is_empty()).map(str::to_string)
}

pub fn as_bool(node: &UntypedNode) -> Option<bool> {
    node.as_bool()
}

/// Integers arrive as JSON integers, as floats (`42.0`) or as decimal strings (`"42"`).
/// Floats are truncated toward zero.
pub fn as_integer(node: &UntypedNode) -> Option<i64> {
    match node {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f as i64)),
        Value::String(s) => s.parse::<i64>().ok(),
        _ => None,
    }
}

/// Short name of the JSON type, for log lines and error messages.
pub fn kind_of(node: &UntypedNode) -> &'static str {
    match node {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
