// governor-core/src/core/policy.rs
// ============================================================================
// Module: Governor Policy
// Description: Immutable jurisdiction policy and custom rule values.
// Purpose: Define what actors and tools are admissible and under what bounds.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! A policy is constructed once and never mutated. Allowlists accept the `*`
//! wildcard sentinel. Custom rules are pure functions evaluated during
//! arbitration; they are the only source of HALT decisions. Fail-closed
//! ambiguity yields DENY, never HALT.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::core::request::Request;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Wildcard sentinel admitting every actor or tool.
pub const WILDCARD: &str = "*";

/// Default bound on intent length in bytes.
pub const DEFAULT_MAX_INTENT_LENGTH: usize = 4096;

/// Default bound on canonical parameter bytes.
pub const DEFAULT_MAX_PARAMS_BYTES: usize = 65536;

// ============================================================================
// SECTION: Custom Rules
// ============================================================================

/// Outcome of a custom rule evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleOutcome {
    /// The rule is satisfied.
    Pass,
    /// The rule denies the request.
    Deny {
        /// Reason recorded as a violation.
        reason: String,
    },
    /// The rule demands a kernel halt.
    Halt {
        /// Reason recorded in the halt entry.
        reason: String,
    },
}

/// A named, pure rule evaluated during arbitration.
///
/// # Invariants
/// - The check performs no I/O and reads no clock; repeated evaluation of the
///   same request yields the same outcome.
#[derive(Clone)]
pub struct CustomRule {
    /// Rule name used in violation messages.
    name: String,
    /// Pure predicate over the request.
    check: Arc<dyn Fn(&Request) -> RuleOutcome + Send + Sync>,
}

impl CustomRule {
    /// Creates a named custom rule from a pure check function.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        check: impl Fn(&Request) -> RuleOutcome + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            check: Arc::new(check),
        }
    }

    /// Returns the rule name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Evaluates the rule against a request.
    #[must_use]
    pub fn check(&self, request: &Request) -> RuleOutcome {
        (self.check)(request)
    }
}

impl fmt::Debug for CustomRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomRule").field("name", &self.name).finish_non_exhaustive()
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised when a policy fails construction-time validation.
#[derive(Debug, Error)]
pub enum PolicyError {
    /// The intent length bound is zero.
    #[error("max_intent_length must be positive")]
    NonPositiveIntentBound,
    /// The parameter size bound is zero.
    #[error("max_params_bytes must be positive")]
    NonPositiveParamsBound,
}

// ============================================================================
// SECTION: Policy
// ============================================================================

/// Immutable jurisdiction policy evaluated on every submission.
#[derive(Clone)]
pub struct Policy {
    /// Admissible actors; may contain the wildcard sentinel.
    pub allowed_actors: BTreeSet<String>,
    /// Admissible tools; may contain the wildcard sentinel.
    pub allowed_tools: BTreeSet<String>,
    /// Whether submissions must carry a tool call.
    pub require_tool_call: bool,
    /// Maximum intent length in bytes.
    pub max_intent_length: usize,
    /// Maximum canonical parameter size in bytes.
    pub max_params_bytes: usize,
    /// Ordered custom rules evaluated after the built-in pipeline.
    pub custom_rules: Vec<CustomRule>,
}

impl Policy {
    /// Creates a policy admitting every actor and tool.
    #[must_use]
    pub fn permit_all() -> Self {
        Self {
            allowed_actors: BTreeSet::from([WILDCARD.to_string()]),
            allowed_tools: BTreeSet::from([WILDCARD.to_string()]),
            require_tool_call: false,
            max_intent_length: DEFAULT_MAX_INTENT_LENGTH,
            max_params_bytes: DEFAULT_MAX_PARAMS_BYTES,
            custom_rules: Vec::new(),
        }
    }

    /// Creates a policy with empty allowlists, denying every actor and tool.
    #[must_use]
    pub fn deny_all() -> Self {
        Self {
            allowed_actors: BTreeSet::new(),
            allowed_tools: BTreeSet::new(),
            require_tool_call: false,
            max_intent_length: DEFAULT_MAX_INTENT_LENGTH,
            max_params_bytes: DEFAULT_MAX_PARAMS_BYTES,
            custom_rules: Vec::new(),
        }
    }

    /// Appends a custom rule, preserving evaluation order.
    #[must_use]
    pub fn with_rule(mut self, rule: CustomRule) -> Self {
        self.custom_rules.push(rule);
        self
    }

    /// Validates construction-time bounds.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError`] when a bound is not positive.
    pub fn validate(&self) -> Result<(), PolicyError> {
        if self.max_intent_length == 0 {
            return Err(PolicyError::NonPositiveIntentBound);
        }
        if self.max_params_bytes == 0 {
            return Err(PolicyError::NonPositiveParamsBound);
        }
        Ok(())
    }

    /// Returns true when the actor is admissible.
    #[must_use]
    pub fn allows_actor(&self, actor: &str) -> bool {
        self.allowed_actors.contains(WILDCARD) || self.allowed_actors.contains(actor)
    }

    /// Returns true when the tool is admissible.
    #[must_use]
    pub fn allows_tool(&self, tool: &str) -> bool {
        self.allowed_tools.contains(WILDCARD) || self.allowed_tools.contains(tool)
    }
}

impl Default for Policy {
    fn default() -> Self {
        Self::permit_all()
    }
}

impl fmt::Debug for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Policy")
            .field("allowed_actors", &self.allowed_actors)
            .field("allowed_tools", &self.allowed_tools)
            .field("require_tool_call", &self.require_tool_call)
            .field("max_intent_length", &self.max_intent_length)
            .field("max_params_bytes", &self.max_params_bytes)
            .field(
                "custom_rules",
                &self.custom_rules.iter().map(CustomRule::name).collect::<Vec<_>>(),
            )
            .finish()
    }
}
