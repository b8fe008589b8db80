// governor-core/tests/kernel.rs
// ============================================================================
// Module: Kernel Tests
// Description: End-to-end submission tests through the kernel orchestrator.
// ============================================================================
//! ## Overview
//! Validates the full submit pipeline: arbitration outcomes, execution
//! failures, commit-before-surface ordering, halt semantics, and the
//! fatal-state rejection path.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::cell::Cell;
use std::collections::BTreeSet;
use std::rc::Rc;

use governor_core::CustomRule;
use governor_core::Decision;
use governor_core::KernelConfig;
use governor_core::KernelState;
use governor_core::Policy;
use governor_core::ReceiptStatus;
use governor_core::Request;
use governor_core::RuleOutcome;
use governor_core::ToolCall;
use governor_core::ToolError;
use governor_core::ToolHandler;
use governor_core::ToolRegistry;
use governor_core::Variant;
use governor_core::hashing;
use governor_core::runtime::InMemoryToolRegistry;
use governor_core::runtime::Kernel;
use governor_core::runtime::VirtualClock;
use governor_core::runtime::replay_and_verify;
use serde_json::Map;
use serde_json::Value;
use serde_json::json;

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Builds a policy admitting actor `a` and the test tools.
fn test_policy() -> Policy {
    Policy {
        allowed_actors: BTreeSet::from(["a".to_string()]),
        allowed_tools: BTreeSet::from(["echo".to_string(), "boom".to_string()]),
        require_tool_call: false,
        max_intent_length: 4096,
        max_params_bytes: 65536,
        custom_rules: Vec::new(),
    }
}

/// Builds a registry with an echoing tool and a failing tool.
fn test_registry() -> InMemoryToolRegistry {
    let mut registry = InMemoryToolRegistry::new();
    registry.register("echo", |params: &Map<String, Value>| {
        let message = params
            .get("message")
            .cloned()
            .ok_or_else(|| ToolError::handler("missing 'message' parameter"))?;
        Ok(json!({ "echoed": message }))
    });
    registry.register("boom", |_: &Map<String, Value>| {
        Err::<Value, ToolError>(ToolError::handler("kaboom"))
    });
    registry
}

/// Boots a strict kernel over the test registry and a stepping clock.
fn boot_kernel(policy: Policy) -> Kernel<InMemoryToolRegistry, VirtualClock> {
    let config = KernelConfig::new("k1", Variant::Strict, policy);
    Kernel::boot(config, test_registry(), VirtualClock::with_step(1000, 1))
}

/// Builds the echo request from the seed scenario.
fn echo_request(request_id: &str) -> Request {
    let mut params = Map::new();
    params.insert("message".to_string(), json!("hi"));
    Request::new(request_id, "a", "say hi", 1000).with_tool_call(ToolCall::new("echo", params))
}

/// Registry wrapper that counts lookups.
struct CountingRegistry {
    inner: InMemoryToolRegistry,
    lookups: Rc<Cell<usize>>,
}

impl ToolRegistry for CountingRegistry {
    fn lookup(&self, name: &str) -> Option<&dyn ToolHandler> {
        self.lookups.set(self.lookups.get() + 1);
        self.inner.lookup(name)
    }

    fn tool_names(&self) -> Vec<String> {
        self.inner.tool_names()
    }
}

// ============================================================================
// SECTION: Boot
// ============================================================================

/// Tests a kernel boots to idle and exposes its identity.
#[test]
fn test_boot_to_idle() {
    let kernel = boot_kernel(test_policy());

    assert_eq!(kernel.state(), KernelState::Idle);
    assert_eq!(kernel.kernel_id().as_str(), "k1");
    assert_eq!(kernel.variant(), Variant::Strict);
    assert!(kernel.ledger().is_empty());
}

/// Tests a kernel with an invalid policy boots halted and stays unusable.
#[test]
fn test_boot_failure_halts() {
    let mut policy = test_policy();
    policy.max_intent_length = 0;
    let mut kernel = boot_kernel(policy);

    assert_eq!(kernel.state(), KernelState::Halted);

    let receipt = kernel.submit(echo_request("r1"));
    assert_eq!(receipt.status, ReceiptStatus::Rejected);
    assert_eq!(receipt.decision, Decision::Halt);
    assert_eq!(receipt.error_message.as_deref(), Some("kernel is halted"));
    assert!(kernel.ledger().is_empty());
}

// ============================================================================
// SECTION: Seed Scenarios
// ============================================================================

/// Tests the happy path: allowed actor, allowed tool, echoed result.
#[test]
fn test_happy_path_echo() {
    let mut kernel = boot_kernel(test_policy());

    let receipt = kernel.submit(echo_request("r1"));

    assert_eq!(receipt.status, ReceiptStatus::Accepted);
    assert_eq!(receipt.decision, Decision::Allow);
    assert_eq!(receipt.tool_result, Some(json!({ "echoed": "hi" })));
    assert_eq!(receipt.timestamp_ms, 1000);
    assert_eq!(kernel.state(), KernelState::Idle);
    assert_eq!(kernel.ledger().len(), 1);

    let bundle = kernel.export_evidence();
    assert_eq!(bundle.root_hash, bundle.entries[0].entry_hash);
    assert_eq!(receipt.evidence_hash.as_deref(), Some(bundle.entries[0].entry_hash.as_str()));
}

/// Tests an unknown actor is denied and the denial is chained.
#[test]
fn test_unknown_actor_denied() {
    let mut kernel = boot_kernel(test_policy());

    let mut request = echo_request("r2");
    request.actor = "b".into();
    let receipt = kernel.submit(request);

    assert_eq!(receipt.status, ReceiptStatus::Rejected);
    assert_eq!(receipt.decision, Decision::Deny);
    assert!(receipt.error_message.unwrap_or_default().contains("actor"));
    assert_eq!(kernel.ledger().len(), 1);

    let report = replay_and_verify(&kernel.export_evidence(), None);
    assert!(report.is_valid());
}

/// Tests a tool outside the allowlist is denied before any handler lookup.
#[test]
fn test_unknown_tool_denied_without_lookup() {
    let lookups = Rc::new(Cell::new(0));
    let registry = CountingRegistry {
        inner: test_registry(),
        lookups: Rc::clone(&lookups),
    };
    let config = KernelConfig::new("k1", Variant::Strict, test_policy());
    let mut kernel = Kernel::boot(config, registry, VirtualClock::with_step(1000, 1));

    let request =
        Request::new("r3", "a", "try a tool", 1000).with_tool_call(ToolCall::named("nope"));
    let receipt = kernel.submit(request);

    assert_eq!(receipt.decision, Decision::Deny);
    assert_eq!(lookups.get(), 0);
    assert_eq!(kernel.ledger().len(), 1);
}

/// Tests a handler error surfaces as a recoverable execution failure.
#[test]
fn test_execution_error_is_recoverable() {
    let mut kernel = boot_kernel(test_policy());

    let request =
        Request::new("r4", "a", "x", 1000).with_tool_call(ToolCall::named("boom"));
    let receipt = kernel.submit(request);

    assert_eq!(receipt.status, ReceiptStatus::Failed);
    assert_eq!(receipt.decision, Decision::Deny);
    assert_eq!(receipt.error_message.as_deref(), Some("kaboom"));
    assert_eq!(kernel.state(), KernelState::Idle);
    assert_eq!(kernel.ledger().len(), 1);
    assert_eq!(kernel.ledger().entries()[0].error.as_deref(), Some("kaboom"));
}

/// Tests a registered-tool miss is an execution failure, not a halt.
#[test]
fn test_missing_handler_is_execution_failure() {
    let mut policy = test_policy();
    policy.allowed_tools.insert("ghost".to_string());
    let mut kernel = boot_kernel(policy);

    let request =
        Request::new("r5", "a", "call a ghost", 1000).with_tool_call(ToolCall::named("ghost"));
    let receipt = kernel.submit(request);

    assert_eq!(receipt.status, ReceiptStatus::Failed);
    assert_eq!(receipt.decision, Decision::Deny);
    assert!(receipt.error_message.unwrap_or_default().contains("not registered"));
    assert_eq!(kernel.state(), KernelState::Idle);
}

// ============================================================================
// SECTION: Commit Ordering
// ============================================================================

/// Tests a surfaced tool result always has a committed entry behind it.
#[test]
fn test_result_implies_committed_entry() {
    let mut kernel = boot_kernel(test_policy());

    let receipt = kernel.submit(echo_request("r1"));

    assert!(receipt.tool_result.is_some());
    let entry_hash = receipt.evidence_hash.unwrap_or_default();
    assert!(
        kernel.ledger().entries().iter().any(|entry| entry.entry_hash == entry_hash),
        "receipt must reference a committed entry"
    );
}

/// Tests the ledger grows by exactly one entry per non-fatal submission.
#[test]
fn test_ledger_grows_one_entry_per_submit() {
    let mut kernel = boot_kernel(test_policy());

    for (index, actor) in ["a", "b", "a"].iter().enumerate() {
        let mut request = echo_request(&format!("r{index}"));
        request.actor = (*actor).into();
        let receipt = kernel.submit(request);
        assert_ne!(receipt.decision, Decision::Halt);
        assert_eq!(kernel.ledger().len(), index + 1);
    }
}

/// Tests entry digests cover the request params and evidence.
#[test]
fn test_entry_digests_recorded() {
    let mut kernel = boot_kernel(test_policy());

    let request = echo_request("r1").with_evidence(vec!["e1".to_string()]);
    let params = request.tool_call.clone().map(|tool_call| tool_call.params).unwrap_or_default();
    let receipt = kernel.submit(request);
    assert_eq!(receipt.decision, Decision::Allow);

    let entry = &kernel.ledger().entries()[0];
    assert_eq!(entry.params_hash.as_deref(), hashing::params_hash(&params).ok().as_deref());
    assert_eq!(
        entry.evidence_hash.as_deref(),
        hashing::evidence_hash(&["e1".to_string()]).ok().as_deref()
    );
}

// ============================================================================
// SECTION: Halt Semantics
// ============================================================================

/// Tests halting commits a final entry and is idempotent.
#[test]
fn test_halt_commits_and_is_idempotent() {
    let mut kernel = boot_kernel(test_policy());
    kernel.submit(echo_request("r1"));

    let receipt = kernel.halt("maintenance");
    assert_eq!(receipt.decision, Decision::Halt);
    assert_eq!(receipt.state_to, KernelState::Halted);
    assert_eq!(kernel.state(), KernelState::Halted);
    assert_eq!(kernel.ledger().len(), 2);

    let entry = &kernel.ledger().entries()[1];
    assert_eq!(entry.decision, Decision::Halt);
    assert_eq!(entry.state_to, KernelState::Halted);
    assert_eq!(entry.error.as_deref(), Some("maintenance"));

    let again = kernel.halt("again");
    assert_eq!(again, receipt);
    assert_eq!(kernel.ledger().len(), 2);
}

/// Tests submissions after a halt are rejected without new entries.
#[test]
fn test_submit_after_halt_rejected() {
    let mut kernel = boot_kernel(test_policy());
    kernel.halt("done");
    let before = kernel.ledger().len();

    let receipt = kernel.submit(echo_request("r1"));

    assert_eq!(receipt.status, ReceiptStatus::Rejected);
    assert_eq!(receipt.decision, Decision::Halt);
    assert_eq!(receipt.state_from, KernelState::Halted);
    assert_eq!(receipt.state_to, KernelState::Halted);
    assert!(receipt.evidence_hash.is_none());
    assert_eq!(kernel.ledger().len(), before);
    assert_eq!(kernel.state(), KernelState::Halted);
}

/// Tests a custom rule can demand a terminal halt during arbitration.
#[test]
fn test_custom_rule_halt_is_terminal() {
    let policy = test_policy().with_rule(CustomRule::new("dead-switch", |request: &Request| {
        if request.intent.contains("forbidden") {
            RuleOutcome::Halt {
                reason: "forbidden intent".to_string(),
            }
        } else {
            RuleOutcome::Pass
        }
    }));
    let mut kernel = boot_kernel(policy);

    let receipt = kernel.submit(Request::new("r1", "a", "forbidden move", 1000));

    assert_eq!(receipt.status, ReceiptStatus::Rejected);
    assert_eq!(receipt.decision, Decision::Halt);
    assert_eq!(receipt.state_to, KernelState::Halted);
    assert_eq!(kernel.state(), KernelState::Halted);

    let entry = &kernel.ledger().entries()[0];
    assert_eq!(entry.decision, Decision::Halt);
    assert_eq!(entry.state_from, KernelState::Arbitrating);
    assert_eq!(entry.state_to, KernelState::Halted);

    let next = kernel.submit(Request::new("r2", "a", "anything", 1001));
    assert_eq!(next.decision, Decision::Halt);
}

/// Tests the ledger stays exportable after a halt.
#[test]
fn test_export_after_halt() {
    let mut kernel = boot_kernel(test_policy());
    kernel.submit(echo_request("r1"));
    kernel.halt("rotate");

    let bundle = kernel.export_evidence();

    assert_eq!(bundle.entries.len(), 2);
    assert!(replay_and_verify(&bundle, None).is_valid());
}

// ============================================================================
// SECTION: Boundaries
// ============================================================================

/// Tests the intent boundary at exactly the policy maximum.
#[test]
fn test_intent_boundary_through_kernel() {
    let mut policy = test_policy();
    policy.max_intent_length = 8;
    let mut kernel = boot_kernel(policy);

    let at_limit = kernel.submit(Request::new("r1", "a", "12345678", 1000));
    assert_eq!(at_limit.decision, Decision::Allow);

    let past_limit = kernel.submit(Request::new("r2", "a", "123456789", 1001));
    assert_eq!(past_limit.decision, Decision::Deny);
}

/// Tests the clock steps once per audited submission.
#[test]
fn test_clock_steps_per_submission() {
    let mut kernel = boot_kernel(test_policy());

    let first = kernel.submit(echo_request("r1"));
    let second = kernel.submit(echo_request("r2"));

    assert_eq!(first.timestamp_ms, 1000);
    assert_eq!(second.timestamp_ms, 1001);
    assert_eq!(kernel.ledger().entries()[0].timestamp_ms, 1000);
    assert_eq!(kernel.ledger().entries()[1].timestamp_ms, 1001);
}
