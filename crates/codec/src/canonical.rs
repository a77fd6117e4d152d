// Path: crates/codec/src/canonical.rs
//! RFC8785-style JSON canonicalization: recursively sort object keys
//! ASCII-wise, preserve array order, re-serialize without insignificant
//! whitespace. Numbers are preserved exactly as written — this crate is
//! built with `serde_json`'s `arbitrary_precision` feature so a number
//! like `1.50` never gets renormalized to `1.5`.

use std::collections::BTreeMap;

use serde_json::Value;

use certen_types::error::ProcessingError;

/// Parses `input` as JSON and returns its canonical byte representation.
pub fn canonicalize(input: &[u8]) -> Result<Vec<u8>, ProcessingError> {
    let value: Value = serde_json::from_slice(input)
        .map_err(|e| ProcessingError::Other(format!("invalid JSON: {e}")))?;
    let sorted = sort_value(value);
    serde_json::to_vec(&sorted).map_err(|e| ProcessingError::Other(format!("re-serialize failed: {e}")))
}

/// Canonicalizes an already-parsed `Value`, useful when the caller built
/// the structure in-process rather than parsing bytes.
pub fn canonicalize_value(value: &Value) -> Result<Vec<u8>, ProcessingError> {
    let sorted = sort_value(value.clone());
    serde_json::to_vec(&sorted).map_err(|e| ProcessingError::Other(format!("re-serialize failed: {e}")))
}

fn sort_value(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut sorted: BTreeMap<String, Value> = BTreeMap::new();
            for (k, v) in map {
                sorted.insert(k, sort_value(v));
            }
            let mut out = serde_json::Map::new();
            for (k, v) in sorted {
                out.insert(k, v);
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_value).collect()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sorts_object_keys_ascii_wise() {
        let input = br#"{"b":1,"a":2}"#;
        let out = canonicalize(input).unwrap();
        assert_eq!(out, br#"{"a":2,"b":1}"#);
    }

    #[test]
    fn preserves_array_order() {
        let input = br#"{"a":[3,1,2]}"#;
        let out = canonicalize(input).unwrap();
        assert_eq!(out, br#"{"a":[3,1,2]}"#);
    }

    #[test]
    fn preserves_number_representation_without_renormalizing() {
        let input = br#"{"a":1.50}"#;
        let out = canonicalize(input).unwrap();
        assert_eq!(out, br#"{"a":1.50}"#);
    }

    #[test]
    fn is_idempotent() {
        let input = br#"{"z":1,"a":{"y":2,"x":3}}"#;
        let once = canonicalize(input).unwrap();
        let twice = canonicalize(&once).unwrap();
        assert_eq!(once, twice);
    }
}
