// governor-core/src/core/receipt.rs
// ============================================================================
// Module: Governor Receipts
// Description: Decisions, receipt statuses, and the per-submission receipt.
// Purpose: Give callers a complete, auditable account of each submission.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Every ingress call returns a receipt. The status distinguishes "denied"
//! from "tool failed" from "kernel unusable"; the decision mirrors what was
//! committed to the ledger. A receipt carries a tool result only when the
//! corresponding ledger entry was durably appended first.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::core::identifiers::RequestId;
use crate::core::state::KernelState;

// ============================================================================
// SECTION: Decision
// ============================================================================

/// Arbitration outcome committed to the ledger.
///
/// # Invariants
/// - Variants are stable for serialization and contract matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Decision {
    /// The request is permitted.
    Allow,
    /// The request is refused.
    Deny,
    /// The kernel halts; terminal.
    Halt,
}

impl Decision {
    /// Returns the stable uppercase name of the decision.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Allow => "ALLOW",
            Self::Deny => "DENY",
            Self::Halt => "HALT",
        }
    }
}

// ============================================================================
// SECTION: Receipt Status
// ============================================================================

/// Caller-facing status of a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReceiptStatus {
    /// The request was allowed and, when applicable, executed.
    Accepted,
    /// The request was refused by validation, policy, or contract.
    Rejected,
    /// Execution or auditing failed.
    Failed,
}

// ============================================================================
// SECTION: Receipt
// ============================================================================

/// Receipt returned by the kernel for each ingress call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Receipt {
    /// Echoed request identifier.
    pub request_id: RequestId,
    /// Caller-facing status.
    pub status: ReceiptStatus,
    /// Committed decision.
    pub decision: Decision,
    /// Kernel state when the submission began.
    pub state_from: KernelState,
    /// Kernel state after the submission completed.
    pub state_to: KernelState,
    /// Kernel clock reading for the submission.
    pub timestamp_ms: i64,
    /// Tool result, present only after a durable ledger append.
    pub tool_result: Option<Value>,
    /// Error description for denied or failed submissions.
    pub error_message: Option<String>,
    /// Hash of the committed ledger entry, when one was appended.
    pub evidence_hash: Option<String>,
}
