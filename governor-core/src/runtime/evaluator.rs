// governor-core/src/runtime/evaluator.rs
// ============================================================================
// Module: Governor Policy Evaluator
// Description: Deterministic rule pipeline over requests and policy.
// Purpose: Report every violation; fail closed on any ambiguity.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! The evaluator is a pure function over `(request, policy, posture)`: no
//! I/O, no clock, no randomness. The pipeline order is fixed and every rule
//! always runs so that all violations are reported together. The kernel
//! splits the pipeline across its lifecycle: structural rules during
//! validation, jurisdiction and custom rules during arbitration.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::hashing::canonical_json_bytes;
use crate::core::policy::Policy;
use crate::core::policy::RuleOutcome;
use crate::core::request::Request;
use crate::core::variant::Posture;

// ============================================================================
// SECTION: Verdicts
// ============================================================================

/// Aggregate result of a full policy evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyVerdict {
    /// True when no rule reported a violation.
    pub allowed: bool,
    /// Every violation, in pipeline order.
    pub violations: Vec<String>,
}

/// Result of the arbitration-phase rules, including custom rule outcomes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArbitrationOutcome {
    /// Violations reported by jurisdiction, ambiguity, and custom rules.
    pub violations: Vec<String>,
    /// Halt reason when a custom rule demanded a halt.
    pub halt_reason: Option<String>,
}

// ============================================================================
// SECTION: Structural Rules
// ============================================================================

/// Runs the structural rules: required fields, intent bounds, tool-call
/// presence and shape, and parameter size.
#[must_use]
pub fn structural_violations(request: &Request, policy: &Policy) -> Vec<String> {
    let mut violations = Vec::new();

    if request.request_id.is_empty() {
        violations.push("request_id is required".to_string());
    }
    if request.actor.is_empty() {
        violations.push("actor is required".to_string());
    }
    if request.intent.is_empty() {
        violations.push("intent is required".to_string());
    }
    if request.timestamp_ms < 0 {
        violations.push("timestamp_ms must be non-negative".to_string());
    }

    if request.intent.len() > policy.max_intent_length {
        violations.push(format!(
            "intent length ({}) exceeds maximum ({})",
            request.intent.len(),
            policy.max_intent_length
        ));
    }
    if !request.intent.is_empty() && request.intent.trim().is_empty() {
        violations.push("intent must not be whitespace only".to_string());
    }

    if policy.require_tool_call && request.tool_call.is_none() {
        violations.push("tool_call is required by policy".to_string());
    }

    if let Some(tool_call) = &request.tool_call {
        if tool_call.name.is_empty() {
            violations.push("tool call name is empty".to_string());
        }
        match canonical_json_bytes(&tool_call.params) {
            Ok(bytes) => {
                if bytes.len() > policy.max_params_bytes {
                    violations.push(format!(
                        "params size ({} bytes) exceeds maximum ({} bytes)",
                        bytes.len(),
                        policy.max_params_bytes
                    ));
                }
            }
            Err(err) => violations.push(format!("failed to canonicalize params: {err}")),
        }
    }

    violations
}

// ============================================================================
// SECTION: Jurisdiction Rules
// ============================================================================

/// Runs the jurisdiction and ambiguity rules for the given posture.
#[must_use]
pub fn jurisdiction_violations(
    request: &Request,
    policy: &Policy,
    posture: Posture,
) -> Vec<String> {
    let mut violations = Vec::new();

    if !policy.allows_actor(request.actor.as_str()) {
        violations.push(format!("actor '{}' is not in allowed actors", request.actor));
    }

    if let Some(tool_call) = &request.tool_call {
        if !policy.allows_tool(tool_call.name.as_str()) {
            violations.push(format!("tool '{}' is not in allowed tools", tool_call.name));
        }
    }

    violations.extend(ambiguity_violations(request, policy, posture));
    violations
}

/// Runs the ambiguity heuristics.
///
/// The empty-intent heuristic is high severity and applies in both postures;
/// the remaining heuristics apply only under the strict posture.
#[must_use]
pub fn ambiguity_violations(request: &Request, policy: &Policy, posture: Posture) -> Vec<String> {
    let mut violations = Vec::new();

    if request.intent.trim().is_empty() {
        violations.push("empty intent is ambiguous".to_string());
    }

    if matches!(posture, Posture::Strict) {
        if request.intent.len() > policy.max_intent_length {
            violations.push(format!(
                "intent exceeds maximum length of {}",
                policy.max_intent_length
            ));
        }
        if let Some(tool_call) = &request.tool_call {
            if tool_call.name.is_empty() {
                violations.push("tool call with empty name is ambiguous".to_string());
            }
        }
    }

    violations
}

// ============================================================================
// SECTION: Custom Rules
// ============================================================================

/// Runs every custom rule in policy order.
///
/// All rules execute even after a halt demand so that every violation is
/// reported; the first halt reason wins.
#[must_use]
pub fn custom_rule_outcome(request: &Request, policy: &Policy) -> ArbitrationOutcome {
    let mut violations = Vec::new();
    let mut halt_reason = None;

    for rule in &policy.custom_rules {
        match rule.check(request) {
            RuleOutcome::Pass => {}
            RuleOutcome::Deny {
                reason,
            } => violations.push(reason),
            RuleOutcome::Halt {
                reason,
            } => {
                violations.push(format!("custom rule '{}' demanded halt: {reason}", rule.name()));
                if halt_reason.is_none() {
                    halt_reason = Some(reason);
                }
            }
        }
    }

    ArbitrationOutcome {
        violations,
        halt_reason,
    }
}

// ============================================================================
// SECTION: Full Evaluation
// ============================================================================

/// Runs the complete pipeline and aggregates every violation.
///
/// The result is pure: repeated evaluation of the same inputs yields an
/// identical verdict.
#[must_use]
pub fn evaluate(request: &Request, policy: &Policy, posture: Posture) -> PolicyVerdict {
    let mut violations = structural_violations(request, policy);
    violations.extend(jurisdiction_violations(request, policy, posture));
    violations.extend(custom_rule_outcome(request, policy).violations);

    PolicyVerdict {
        allowed: violations.is_empty(),
        violations,
    }
}
