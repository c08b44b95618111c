//! # Canonical payload serialization
//!
//! Defines [`CanonicalBytes`], the single construction path for the bytes a
//! credential's `data_hash` is computed over.
//!
//! ## Why a newtype
//!
//! Two independently built credential records with the same semantic content
//! must hash identically, regardless of the order their fields were inserted
//! in or which process serialized them. `CanonicalBytes` has a private inner
//! field, and the only constructor applies the full pipeline: float
//! rejection, then RFC 8785 (JCS) serialization with lexicographically
//! sorted keys and compact separators. Any function that computes a digest
//! takes `&CanonicalBytes`, so there is no way to hash bytes that skipped
//! the pipeline.
//!
//! ## Value rules
//!
//! - `null`, `bool`, `string`, and integer numbers pass through unchanged.
//! - Non-integer floats are **rejected**: JCS float formatting has edge
//!   cases, and a grade-point average rendered as `3.8000000000000003`
//!   would silently fork the hash. Scores travel as fixed-point strings.
//! - Objects and arrays are recursed; keys are already strings in JSON.
//! - Timestamps enter as ISO 8601 `Z`-suffixed strings ([`crate::Timestamp`]
//!   guarantees second precision on the way in).

use serde::Serialize;
use serde_json::Value;

use crate::error::CanonicalizationError;

/// Bytes produced exclusively by JCS canonicalization of a float-free
/// JSON value tree.
///
/// The inner `Vec<u8>` is private; [`CanonicalBytes::new()`] is the only
/// constructor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalBytes(Vec<u8>);

impl CanonicalBytes {
    /// Canonicalize any serializable value.
    ///
    /// # Errors
    ///
    /// Returns [`CanonicalizationError::FloatRejected`] if the value tree
    /// contains a non-integer float, or
    /// [`CanonicalizationError::SerializationFailed`] if serialization
    /// itself fails.
    pub fn new(obj: &impl Serialize) -> Result<Self, CanonicalizationError> {
        let value = serde_json::to_value(obj)?;
        Self::from_value(value)
    }

    /// Canonicalize an already-built JSON value tree.
    pub fn from_value(value: Value) -> Result<Self, CanonicalizationError> {
        let checked = reject_floats(value)?;
        let s = serde_jcs::to_string(&checked)?;
        Ok(Self(s.into_bytes()))
    }

    /// The canonical bytes, for digest computation.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Length of the canonical byte sequence.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the canonical byte sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for CanonicalBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Walk the value tree and reject any non-integer float.
///
/// Integers that serde_json happens to carry as `u64`/`i64` pass; a number
/// only representable as `f64` does not.
fn reject_floats(value: Value) -> Result<Value, CanonicalizationError> {
    match value {
        Value::Null | Value::Bool(_) | Value::String(_) => Ok(value),
        Value::Number(ref n) => {
            if n.is_f64() && !n.is_i64() && !n.is_u64() {
                if let Some(f) = n.as_f64() {
                    return Err(CanonicalizationError::FloatRejected(f));
                }
            }
            Ok(value)
        }
        Value::Object(map) => {
            let mut out = serde_json::Map::with_capacity(map.len());
            for (k, v) in map {
                out.insert(k, reject_floats(v)?);
            }
            Ok(Value::Object(out))
        }
        Value::Array(arr) => {
            let out: Result<Vec<_>, _> = arr.into_iter().map(reject_floats).collect();
            Ok(Value::Array(out?))
        }
    }
}
