// governor-core/src/core/mod.rs
// ============================================================================
// Module: Governor Core Types
// Description: Canonical governor schema: requests, receipts, entries, policy.
// Purpose: Provide stable, serializable types for submissions and audit logs.
// Dependencies: serde, serde_jcs, sha2, subtle, thiserror
// ============================================================================

//! ## Overview
//! Core types define the submission schema, the arbitration policy, the
//! lifecycle states, and the hash-chained audit records. These types are the
//! canonical source of truth for any derived API surfaces.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod audit;
pub mod hashing;
pub mod identifiers;
pub mod policy;
pub mod receipt;
pub mod request;
pub mod state;
pub mod variant;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::AuditEntry;
pub use audit::EntryDraft;
pub use audit::EvidenceBundle;
pub use hashing::GENESIS_HASH;
pub use hashing::HashError;
pub use identifiers::ActorId;
pub use identifiers::KernelId;
pub use identifiers::RequestId;
pub use identifiers::ToolName;
pub use policy::CustomRule;
pub use policy::DEFAULT_MAX_INTENT_LENGTH;
pub use policy::DEFAULT_MAX_PARAMS_BYTES;
pub use policy::Policy;
pub use policy::PolicyError;
pub use policy::RuleOutcome;
pub use policy::WILDCARD;
pub use receipt::Decision;
pub use receipt::Receipt;
pub use receipt::ReceiptStatus;
pub use request::Request;
pub use request::ToolCall;
pub use state::KernelState;
pub use variant::Posture;
pub use variant::REQUIRED_CONSTRAINT_KEYS;
pub use variant::Variant;
