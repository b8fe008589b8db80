// governor-core/tests/replay.rs
// ============================================================================
// Module: Replay Verifier Tests
// Description: Tests for offline bundle verification and tamper detection.
// ============================================================================
//! ## Overview
//! Validates that the verifier accepts honest exports, detects any tampering,
//! and reports every failure with its entry index.

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

use std::collections::BTreeSet;

use governor_core::Decision;
use governor_core::EvidenceBundle;
use governor_core::KernelConfig;
use governor_core::KernelId;
use governor_core::Policy;
use governor_core::Request;
use governor_core::ToolCall;
use governor_core::Variant;
use governor_core::hashing::GENESIS_HASH;
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

/// Boots a strict kernel and submits three allowed echo requests.
fn bundle_of_three() -> EvidenceBundle {
    let mut registry = InMemoryToolRegistry::new();
    registry.register("echo", |params: &Map<String, Value>| {
        Ok(json!({ "echoed": params.get("message").cloned() }))
    });
    let policy = Policy {
        allowed_actors: BTreeSet::from(["a".to_string()]),
        allowed_tools: BTreeSet::from(["echo".to_string()]),
        require_tool_call: false,
        max_intent_length: 4096,
        max_params_bytes: 65536,
        custom_rules: Vec::new(),
    };
    let config = KernelConfig::new("k1", Variant::Strict, policy);
    let mut kernel = Kernel::boot(config, registry, VirtualClock::with_step(1000, 1));

    for index in 0 .. 3 {
        let mut params = Map::new();
        params.insert("message".to_string(), json!("hi"));
        let receipt = kernel.submit(
            Request::new(format!("r{index}"), "a", "say hi", 1000)
                .with_tool_call(ToolCall::new("echo", params)),
        );
        assert_eq!(receipt.decision, Decision::Allow);
    }
    kernel.export_evidence()
}

// ============================================================================
// SECTION: Honest Bundles
// ============================================================================

/// Tests an honest export verifies cleanly against its own root.
#[test]
fn test_honest_bundle_passes() {
    let bundle = bundle_of_three();

    let report = replay_and_verify(&bundle, Some(&bundle.root_hash));

    assert!(report.is_valid());
    assert!(report.errors.is_empty());
    assert_eq!(report.entries_checked, 3);
    assert_eq!(report.computed_root_hash, bundle.root_hash);
}

/// Tests the empty bundle verifies against the genesis root.
#[test]
fn test_empty_bundle_passes() {
    let bundle = EvidenceBundle {
        entries: Vec::new(),
        exported_at_ms: 0,
        kernel_id: KernelId::new("k1"),
        root_hash: GENESIS_HASH.to_string(),
        variant: Variant::Strict,
    };

    let report = replay_and_verify(&bundle, None);

    assert!(report.is_valid());
    assert_eq!(report.computed_root_hash, GENESIS_HASH);
}

// ============================================================================
// SECTION: Tamper Detection
// ============================================================================

/// Tests flipping one character of an intent is detected at its index.
#[test]
fn test_tampered_intent_detected() {
    let mut bundle = bundle_of_three();
    bundle.entries[1].intent = "say hI".to_string();

    let report = replay_and_verify(&bundle, Some(&bundle.root_hash));

    assert!(!report.is_valid());
    assert!(report.errors.iter().any(|error| error.contains("entry 1")));
}

/// Tests a tampered link is reported as a prev-hash mismatch.
#[test]
fn test_tampered_prev_hash_detected() {
    let mut bundle = bundle_of_three();
    bundle.entries[2].prev_hash = GENESIS_HASH.to_string();

    let report = replay_and_verify(&bundle, Some(&bundle.root_hash));

    assert!(!report.is_valid());
    assert!(
        report
            .errors
            .iter()
            .any(|error| error.contains("entry 2") && error.contains("prev_hash"))
    );
}

/// Tests a tampered entry hash breaks the entry and the chain after it.
#[test]
fn test_tampered_entry_hash_detected() {
    let mut bundle = bundle_of_three();
    bundle.entries[0].entry_hash = GENESIS_HASH.to_string();

    let report = replay_and_verify(&bundle, Some(&bundle.root_hash));

    assert!(!report.is_valid());
    assert!(report.errors.len() >= 2);
    assert!(report.errors.iter().any(|error| error.contains("entry 0")));
    assert!(report.errors.iter().any(|error| error.contains("entry 1")));
}

/// Tests a wrong expected root is reported even when the chain is intact.
#[test]
fn test_root_mismatch_detected() {
    let bundle = bundle_of_three();

    let report = replay_and_verify(&bundle, Some(GENESIS_HASH));

    assert!(!report.is_valid());
    assert!(report.errors.iter().any(|error| error.contains("root hash mismatch")));
}

/// Tests tampering each declared field of an entry is always detected.
#[test]
fn test_every_field_tamper_detected() {
    let honest = bundle_of_three();

    let mut tampered: Vec<EvidenceBundle> = Vec::new();
    let mut with_actor = honest.clone();
    with_actor.entries[0].actor = "b".into();
    tampered.push(with_actor);
    let mut with_decision = honest.clone();
    with_decision.entries[0].decision = Decision::Deny;
    tampered.push(with_decision);
    let mut with_timestamp = honest.clone();
    with_timestamp.entries[0].timestamp_ms += 1;
    tampered.push(with_timestamp);
    let mut with_error = honest.clone();
    with_error.entries[0].error = Some("injected".to_string());
    tampered.push(with_error);
    let mut with_tool = honest;
    with_tool.entries[0].tool_name = None;
    tampered.push(with_tool);

    for bundle in tampered {
        let report = replay_and_verify(&bundle, Some(&bundle.root_hash));
        assert!(!report.is_valid());
    }
}
