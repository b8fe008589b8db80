// governor-core/src/core/variant.rs
// ============================================================================
// Module: Governor Posture Variants
// Description: Posture selectors that tighten the submission contract.
// Purpose: Add pre-policy contract checks without weakening any invariant.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Variants share the whole kernel pipeline and differ only in a pre-policy
//! predicate over the request plus the ambiguity posture. Failing the
//! predicate yields DENY with a reason naming the missing requirement.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::core::request::Request;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Constraint keys every dual-channel submission must carry.
pub const REQUIRED_CONSTRAINT_KEYS: [&str; 3] = ["scope", "non_goals", "success_criteria"];

// ============================================================================
// SECTION: Ambiguity Posture
// ============================================================================

/// Ambiguity posture applied during arbitration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Posture {
    /// Apply every ambiguity heuristic.
    Strict,
    /// Apply only high-severity ambiguity heuristics.
    Relaxed,
}

// ============================================================================
// SECTION: Variant
// ============================================================================

/// Posture variant of a kernel instance.
///
/// # Invariants
/// - Tags are stable for serialization and contract matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    /// Maximum enforcement; no additional contract check.
    Strict,
    /// Relaxed ambiguity posture; intent-only submissions are acceptable.
    Permissive,
    /// Requires non-empty supporting evidence on every submission.
    EvidenceFirst,
    /// Requires scope, non-goals, and success criteria constraints.
    DualChannel,
}

impl Variant {
    /// Returns the stable tag of the variant.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Strict => "strict",
            Self::Permissive => "permissive",
            Self::EvidenceFirst => "evidence_first",
            Self::DualChannel => "dual_channel",
        }
    }

    /// Parses a stable tag into a variant.
    #[must_use]
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "strict" => Some(Self::Strict),
            "permissive" => Some(Self::Permissive),
            "evidence_first" => Some(Self::EvidenceFirst),
            "dual_channel" => Some(Self::DualChannel),
            _ => None,
        }
    }

    /// Returns the ambiguity posture of the variant.
    #[must_use]
    pub const fn posture(self) -> Posture {
        match self {
            Self::Permissive => Posture::Relaxed,
            Self::Strict | Self::EvidenceFirst | Self::DualChannel => Posture::Strict,
        }
    }

    /// Evaluates the variant's pre-policy contract over a request.
    ///
    /// Returns one violation per missing requirement; an empty vector means
    /// the contract holds.
    #[must_use]
    pub fn contract_violations(self, request: &Request) -> Vec<String> {
        match self {
            Self::Strict | Self::Permissive => Vec::new(),
            Self::EvidenceFirst => evidence_violations(request),
            Self::DualChannel => constraint_violations(request),
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Contract Checks
// ============================================================================

/// Checks the evidence-first contract: evidence present and non-empty.
fn evidence_violations(request: &Request) -> Vec<String> {
    let mut violations = Vec::new();
    match &request.evidence {
        None => violations.push("evidence required for this kernel variant".to_string()),
        Some(items) if items.is_empty() => {
            violations.push("evidence required for this kernel variant".to_string());
        }
        Some(items) => {
            if items.iter().any(|item| item.trim().is_empty()) {
                violations.push("evidence identifiers cannot be empty".to_string());
            }
        }
    }
    violations
}

/// Checks the dual-channel contract: constraints with non-empty values.
fn constraint_violations(request: &Request) -> Vec<String> {
    let Some(constraints) = &request.constraints else {
        return vec!["constraints mapping is required for this kernel variant".to_string()];
    };

    let mut violations = Vec::new();
    let mut missing: Vec<&str> = REQUIRED_CONSTRAINT_KEYS
        .iter()
        .copied()
        .filter(|key| !constraints.contains_key(*key))
        .collect();
    missing.sort_unstable();
    if !missing.is_empty() {
        violations.push(format!("missing required constraint keys: {}", missing.join(", ")));
    }

    for key in REQUIRED_CONSTRAINT_KEYS {
        if let Some(value) = constraints.get(key) {
            if constraint_value_is_empty(value) {
                violations.push(format!("constraint '{key}' cannot be empty"));
            }
        }
    }
    violations
}

/// Returns true when a constraint value carries no usable content.
fn constraint_value_is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(text) => text.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(fields) => fields.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}
