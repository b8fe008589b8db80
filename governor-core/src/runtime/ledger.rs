// governor-core/src/runtime/ledger.rs
// ============================================================================
// Module: Governor Audit Ledger
// Description: Append-only, hash-chained sequence of audit entries.
// Purpose: Commit decisions durably before any effect becomes observable.
// Dependencies: crate::core, thiserror
// ============================================================================

//! ## Overview
//! The ledger is the kernel's only mutable shared resource and is
//! single-writer by construction. An append either commits the entry and
//! advances the head atomically or leaves the ledger unchanged; append
//! failures are fatal to the owning kernel. Past entries are never mutated,
//! truncated, or purged within an instance.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::core::audit::AuditEntry;
use crate::core::audit::EntryDraft;
use crate::core::audit::EvidenceBundle;
use crate::core::hashing::GENESIS_HASH;
use crate::core::hashing::HashError;
use crate::core::hashing::chain_hash;
use crate::core::identifiers::KernelId;
use crate::core::variant::Variant;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Ledger append errors; always fatal to the owning kernel.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Canonical encoding or hashing of the entry body failed.
    #[error(transparent)]
    Hash(#[from] HashError),
}

// ============================================================================
// SECTION: Audit Ledger
// ============================================================================

/// Append-only hash-chained audit ledger.
///
/// # Invariants
/// - `head` equals the last entry's `entry_hash`, or genesis when empty.
/// - Entries are exposed read-only; export returns deep copies.
#[derive(Debug, Clone)]
pub struct AuditLedger {
    /// Owning kernel identifier, stamped into exports.
    kernel_id: KernelId,
    /// Posture variant of the owning kernel, stamped into exports.
    variant: Variant,
    /// Committed entries in append order.
    entries: Vec<AuditEntry>,
    /// Chain head: `prev_hash` for the next append.
    head: String,
}

impl AuditLedger {
    /// Creates an empty ledger with a genesis head.
    #[must_use]
    pub fn new(kernel_id: KernelId, variant: Variant) -> Self {
        Self {
            kernel_id,
            variant,
            entries: Vec::new(),
            head: GENESIS_HASH.to_string(),
        }
    }

    /// Returns the `prev_hash` the next append will use.
    #[must_use]
    pub fn head(&self) -> &str {
        &self.head
    }

    /// Returns the current root hash: the last entry's hash or genesis.
    #[must_use]
    pub fn root_hash(&self) -> &str {
        &self.head
    }

    /// Returns the number of committed entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when no entries have been committed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns a read-only view of the committed entries.
    #[must_use]
    pub fn entries(&self) -> &[AuditEntry] {
        &self.entries
    }

    /// Chains and commits a draft entry, returning its `entry_hash`.
    ///
    /// The append is all-or-nothing: canonical bytes and the chain hash are
    /// computed before any mutation, so a failure leaves the ledger unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] when the body cannot be canonicalized; the
    /// owning kernel must treat this as fatal.
    pub fn append(&mut self, draft: EntryDraft) -> Result<String, LedgerError> {
        let body = draft.canonical_bytes()?;
        let entry_hash = chain_hash(&self.head, &body);
        let entry = AuditEntry {
            actor: draft.actor,
            decision: draft.decision,
            entry_hash: entry_hash.clone(),
            error: draft.error,
            evidence_hash: draft.evidence_hash,
            intent: draft.intent,
            params_hash: draft.params_hash,
            prev_hash: self.head.clone(),
            request_id: draft.request_id,
            state_from: draft.state_from,
            state_to: draft.state_to,
            timestamp_ms: draft.timestamp_ms,
            tool_name: draft.tool_name,
        };
        self.entries.push(entry);
        self.head = entry_hash.clone();
        Ok(entry_hash)
    }

    /// Exports a deep-copied snapshot of the ledger with its root hash.
    #[must_use]
    pub fn export(&self, exported_at_ms: i64) -> EvidenceBundle {
        EvidenceBundle {
            entries: self.entries.clone(),
            exported_at_ms,
            kernel_id: self.kernel_id.clone(),
            root_hash: self.head.clone(),
            variant: self.variant,
        }
    }
}
