// governor-core/src/core/hashing.rs
// ============================================================================
// Module: Governor Canonical Hashing
// Description: RFC 8785 JSON canonicalization and SHA-256 chain hashing.
// Purpose: Provide deterministic hashes for requests, ledger entries, and bundles.
// Dependencies: serde, serde_jcs, sha2, subtle
// ============================================================================

//! ## Overview
//! All hashed payloads are canonicalized with RFC 8785 (JCS) before hashing so
//! that digests are stable and replayable across implementations. Absent
//! optional fields are serialized as explicit nulls, which makes `{a:1}` and
//! `{a:1,b:null}` hash differently by construction. Floating-point values are
//! rejected before any bytes are produced; callers must widen to integers or
//! strings.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;
use serde_json::Value;
use sha2::Digest;
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Chain seed used as `prev_hash` of the first ledger entry.
pub const GENESIS_HASH: &str =
    "0000000000000000000000000000000000000000000000000000000000000000";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while producing canonical bytes or hashes.
#[derive(Debug, Error)]
pub enum HashError {
    /// JSON canonicalization failed.
    #[error("failed to canonicalize json: {0}")]
    Canonicalization(String),
    /// A floating-point number reached a hashed payload.
    #[error("floating-point value {0} is not permitted in hashed payloads")]
    FloatRejected(String),
}

// ============================================================================
// SECTION: Canonical Encoding
// ============================================================================

/// Returns canonical JSON bytes for a serializable value using RFC 8785.
///
/// # Errors
///
/// Returns [`HashError::Canonicalization`] when serialization fails and
/// [`HashError::FloatRejected`] when the value contains a non-integer number.
pub fn canonical_json_bytes<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, HashError> {
    let tree =
        serde_json::to_value(value).map_err(|err| HashError::Canonicalization(err.to_string()))?;
    reject_float_values(&tree)?;
    serde_jcs::to_vec(&tree).map_err(|err| HashError::Canonicalization(err.to_string()))
}

/// Rejects any floating-point number anywhere in a JSON tree.
///
/// # Errors
///
/// Returns [`HashError::FloatRejected`] naming the offending value.
pub fn reject_float_values(value: &Value) -> Result<(), HashError> {
    match value {
        Value::Number(number) => {
            if number.is_f64() {
                return Err(HashError::FloatRejected(number.to_string()));
            }
            Ok(())
        }
        Value::Array(items) => {
            for item in items {
                reject_float_values(item)?;
            }
            Ok(())
        }
        Value::Object(fields) => {
            for field in fields.values() {
                reject_float_values(field)?;
            }
            Ok(())
        }
        Value::Null | Value::Bool(_) | Value::String(_) => Ok(()),
    }
}

// ============================================================================
// SECTION: Digests
// ============================================================================

/// Hashes raw bytes with SHA-256 and returns the lowercase hex digest.
#[must_use]
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex_encode(&hasher.finalize())
}

/// Derives a chain hash by binding canonical body bytes to the previous hash.
///
/// The digest covers `prev_hash`, a single `:` separator, and the body bytes.
#[must_use]
pub fn chain_hash(prev_hash: &str, body: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(prev_hash.as_bytes());
    hasher.update(b":");
    hasher.update(body);
    hex_encode(&hasher.finalize())
}

/// Hashes a canonicalizable value with SHA-256.
///
/// # Errors
///
/// Returns [`HashError`] when canonical bytes cannot be produced.
pub fn hash_canonical_json<T: Serialize + ?Sized>(value: &T) -> Result<String, HashError> {
    Ok(sha256_hex(&canonical_json_bytes(value)?))
}

/// Hashes a tool-call parameter map.
///
/// # Errors
///
/// Returns [`HashError`] when the parameters cannot be canonicalized.
pub fn params_hash(params: &serde_json::Map<String, Value>) -> Result<String, HashError> {
    hash_canonical_json(params)
}

/// Hashes the evidence identifiers of a request under an `evidence` wrapper.
///
/// # Errors
///
/// Returns [`HashError`] when the identifiers cannot be canonicalized.
pub fn evidence_hash(evidence: &[String]) -> Result<String, HashError> {
    hash_canonical_json(&serde_json::json!({ "evidence": evidence }))
}

// ============================================================================
// SECTION: Constant-Time Comparison
// ============================================================================

/// Compares two hex digest strings in constant time.
#[must_use]
pub fn hash_eq(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

// ============================================================================
// SECTION: Hex Encoding
// ============================================================================

/// Encodes bytes as a lowercase hex string.
fn hex_encode(bytes: &[u8]) -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        let hi = usize::from(byte >> 4);
        let lo = usize::from(byte & 0x0f);
        out.push(char::from(HEX[hi]));
        out.push(char::from(HEX[lo]));
    }
    out
}
