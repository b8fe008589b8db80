// governor-core/src/core/request.rs
// ============================================================================
// Module: Governor Requests
// Description: Caller-supplied submission payloads and tool invocations.
// Purpose: Capture the full ingress surface of a kernel submission.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! A request names an actor, an intent, and optionally a tool invocation,
//! supporting evidence identifiers, and operating constraints. Requests are
//! consumed on submission; the kernel never mutates or retains them beyond
//! the receipt and the committed ledger entry.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

use crate::core::identifiers::ActorId;
use crate::core::identifiers::RequestId;
use crate::core::identifiers::ToolName;

// ============================================================================
// SECTION: Tool Call
// ============================================================================

/// Specification of a tool invocation.
///
/// # Invariants
/// - `params` is always a mapping; an absent mapping is the empty mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Tool name resolved through the registry.
    pub name: ToolName,
    /// Parameters handed to the tool handler.
    #[serde(default)]
    pub params: Map<String, Value>,
}

impl ToolCall {
    /// Creates a tool call with the given name and parameters.
    #[must_use]
    pub fn new(name: impl Into<ToolName>, params: Map<String, Value>) -> Self {
        Self {
            name: name.into(),
            params,
        }
    }

    /// Creates a tool call with no parameters.
    #[must_use]
    pub fn named(name: impl Into<ToolName>) -> Self {
        Self::new(name, Map::new())
    }
}

// ============================================================================
// SECTION: Request
// ============================================================================

/// A request submitted to the kernel for arbitration.
///
/// # Invariants
/// - `timestamp_ms` is caller-supplied and validated for non-negativity only;
///   monotonicity is a caller responsibility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    /// Opaque request identifier; uniqueness is the caller's responsibility.
    pub request_id: RequestId,
    /// Actor submitting the request.
    pub actor: ActorId,
    /// Natural-language intent, bounded by policy.
    pub intent: String,
    /// Optional tool invocation.
    #[serde(default)]
    pub tool_call: Option<ToolCall>,
    /// Optional ordered evidence identifiers.
    #[serde(default)]
    pub evidence: Option<Vec<String>>,
    /// Optional operating constraints.
    #[serde(default)]
    pub constraints: Option<Map<String, Value>>,
    /// Caller-supplied submission time in milliseconds.
    pub timestamp_ms: i64,
}

impl Request {
    /// Creates a minimal request with no tool call, evidence, or constraints.
    #[must_use]
    pub fn new(
        request_id: impl Into<RequestId>,
        actor: impl Into<ActorId>,
        intent: impl Into<String>,
        timestamp_ms: i64,
    ) -> Self {
        Self {
            request_id: request_id.into(),
            actor: actor.into(),
            intent: intent.into(),
            tool_call: None,
            evidence: None,
            constraints: None,
            timestamp_ms,
        }
    }

    /// Attaches a tool call to the request.
    #[must_use]
    pub fn with_tool_call(mut self, tool_call: ToolCall) -> Self {
        self.tool_call = Some(tool_call);
        self
    }

    /// Attaches evidence identifiers to the request.
    #[must_use]
    pub fn with_evidence(mut self, evidence: Vec<String>) -> Self {
        self.evidence = Some(evidence);
        self
    }

    /// Attaches operating constraints to the request.
    #[must_use]
    pub fn with_constraints(mut self, constraints: Map<String, Value>) -> Self {
        self.constraints = Some(constraints);
        self
    }
}
