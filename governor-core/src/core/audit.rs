// governor-core/src/core/audit.rs
// ============================================================================
// Module: Governor Audit Records
// Description: Hash-chained ledger entries and exportable evidence bundles.
// Purpose: Define the immutable audit schema and its canonical wire form.
// Dependencies: serde, serde_jcs
// ============================================================================

//! ## Overview
//! Ledger entries are immutable once appended. Each entry binds its body to
//! the previous entry's hash; the exported bundle carries the full chain plus
//! the root hash. Optional fields are serialized as explicit nulls so that
//! canonical bytes are total over the schema and independently recomputable.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::hashing::HashError;
use crate::core::hashing::canonical_json_bytes;
use crate::core::identifiers::ActorId;
use crate::core::identifiers::KernelId;
use crate::core::identifiers::RequestId;
use crate::core::identifiers::ToolName;
use crate::core::receipt::Decision;
use crate::core::state::KernelState;
use crate::core::variant::Variant;

// ============================================================================
// SECTION: Entry Draft
// ============================================================================

/// Body fields of a ledger entry, before chaining.
///
/// # Invariants
/// - The canonical bytes of a draft are exactly what the chain hash covers;
///   `prev_hash` and `entry_hash` are never part of the body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryDraft {
    /// Request identifier.
    pub request_id: RequestId,
    /// Submitting actor.
    pub actor: ActorId,
    /// Request intent.
    pub intent: String,
    /// Committed decision.
    pub decision: Decision,
    /// State in which the submission concluded.
    pub state_from: KernelState,
    /// State the entry transitions into.
    pub state_to: KernelState,
    /// Kernel clock reading at commit time.
    pub timestamp_ms: i64,
    /// Invoked tool name, when a tool call was present.
    pub tool_name: Option<ToolName>,
    /// Hash of the tool-call parameters, when present.
    pub params_hash: Option<String>,
    /// Hash of the request evidence identifiers, when present.
    pub evidence_hash: Option<String>,
    /// Error description for denied or failed submissions.
    pub error: Option<String>,
}

impl EntryDraft {
    /// Returns the canonical body bytes covered by the chain hash.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] when the body cannot be canonicalized.
    pub fn canonical_bytes(&self) -> Result<Vec<u8>, HashError> {
        canonical_json_bytes(self)
    }
}

// ============================================================================
// SECTION: Audit Entry
// ============================================================================

/// A single committed entry in the append-only ledger.
///
/// # Invariants
/// - `prev_hash` equals the previous entry's `entry_hash`, or the genesis
///   hash for the first entry.
/// - `entry_hash` equals the chain hash of `prev_hash` and the body bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Submitting actor.
    pub actor: ActorId,
    /// Committed decision.
    pub decision: Decision,
    /// Chain hash of this entry.
    pub entry_hash: String,
    /// Error description for denied or failed submissions.
    pub error: Option<String>,
    /// Hash of the request evidence identifiers, when present.
    pub evidence_hash: Option<String>,
    /// Request intent.
    pub intent: String,
    /// Hash of the tool-call parameters, when present.
    pub params_hash: Option<String>,
    /// Chain hash of the previous entry, or genesis.
    pub prev_hash: String,
    /// Request identifier.
    pub request_id: RequestId,
    /// State in which the submission concluded.
    pub state_from: KernelState,
    /// State the entry transitions into.
    pub state_to: KernelState,
    /// Kernel clock reading at commit time.
    pub timestamp_ms: i64,
    /// Invoked tool name, when a tool call was present.
    pub tool_name: Option<ToolName>,
}

impl AuditEntry {
    /// Reconstructs the body draft covered by this entry's chain hash.
    #[must_use]
    pub fn body(&self) -> EntryDraft {
        EntryDraft {
            request_id: self.request_id.clone(),
            actor: self.actor.clone(),
            intent: self.intent.clone(),
            decision: self.decision,
            state_from: self.state_from,
            state_to: self.state_to,
            timestamp_ms: self.timestamp_ms,
            tool_name: self.tool_name.clone(),
            params_hash: self.params_hash.clone(),
            evidence_hash: self.evidence_hash.clone(),
            error: self.error.clone(),
        }
    }
}

// ============================================================================
// SECTION: Evidence Bundle
// ============================================================================

/// Exportable snapshot of the ledger plus its root hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceBundle {
    /// Committed entries in append order.
    pub entries: Vec<AuditEntry>,
    /// Kernel clock reading at export time.
    pub exported_at_ms: i64,
    /// Exporting kernel identifier.
    pub kernel_id: KernelId,
    /// Hash of the last entry, or genesis when empty.
    pub root_hash: String,
    /// Posture variant of the exporting kernel.
    pub variant: Variant,
}

impl EvidenceBundle {
    /// Returns the canonical wire bytes of the bundle.
    ///
    /// Keys are sorted and absent optionals appear as explicit nulls; these
    /// bytes are what an external verifier canonicalizes and rehashes.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] when the bundle cannot be canonicalized.
    pub fn to_canonical_json(&self) -> Result<Vec<u8>, HashError> {
        canonical_json_bytes(self)
    }

    /// Returns true when the bundle carries no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
