// governor-core/src/runtime/replay.rs
// ============================================================================
// Module: Governor Replay Verifier
// Description: Offline re-chaining and verification of evidence bundles.
// Purpose: Detect any tampering of exported ledgers, reporting every failure.
// Dependencies: crate::core, serde
// ============================================================================

//! ## Overview
//! The verifier replays the hash chain of an exported bundle: it checks each
//! entry's `prev_hash` linkage, recomputes every body hash from canonical
//! bytes, and compares the final head against the expected root. It never
//! short-circuits, so a tampered bundle reports every inconsistency. All hash
//! comparisons are constant-time.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::audit::EvidenceBundle;
use crate::core::hashing::GENESIS_HASH;
use crate::core::hashing::chain_hash;
use crate::core::hashing::hash_eq;

// ============================================================================
// SECTION: Report Types
// ============================================================================

/// Verification status for replay reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplayStatus {
    /// Every check passed.
    Pass,
    /// At least one check failed.
    Fail,
}

/// Offline verification report for an evidence bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayReport {
    /// Verification status.
    pub status: ReplayStatus,
    /// Number of entries checked.
    pub entries_checked: usize,
    /// Every failed check, in chain order.
    pub errors: Vec<String>,
    /// Root hash recomputed from the declared chain.
    pub computed_root_hash: String,
}

impl ReplayReport {
    /// Returns true when verification passed.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        matches!(self.status, ReplayStatus::Pass)
    }
}

// ============================================================================
// SECTION: Verifier
// ============================================================================

/// Replays and verifies an evidence bundle against an expected root hash.
///
/// When `expected_root_hash` is absent the bundle's own `root_hash` is used.
/// An empty bundle verifies against the genesis hash.
#[must_use]
pub fn replay_and_verify(bundle: &EvidenceBundle, expected_root_hash: Option<&str>) -> ReplayReport {
    let mut errors = Vec::new();
    let mut prev = GENESIS_HASH.to_string();

    for (index, entry) in bundle.entries.iter().enumerate() {
        if !hash_eq(&entry.prev_hash, &prev) {
            errors.push(format!("entry {index}: prev_hash mismatch"));
        }

        match entry.body().canonical_bytes() {
            Ok(body) => {
                let computed = chain_hash(&prev, &body);
                if !hash_eq(&computed, &entry.entry_hash) {
                    errors.push(format!("entry {index}: entry_hash mismatch"));
                }
            }
            Err(err) => {
                errors.push(format!("entry {index}: failed to canonicalize body: {err}"));
            }
        }

        prev = entry.entry_hash.clone();
    }

    let expected = expected_root_hash.unwrap_or(&bundle.root_hash);
    if !hash_eq(&prev, expected) {
        errors.push("root hash mismatch".to_string());
    }

    ReplayReport {
        status: if errors.is_empty() { ReplayStatus::Pass } else { ReplayStatus::Fail },
        entries_checked: bundle.entries.len(),
        errors,
        computed_root_hash: prev,
    }
}
