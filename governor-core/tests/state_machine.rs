// governor-core/tests/state_machine.rs
// ============================================================================
// Module: State Machine Tests
// Description: Tests for the lifecycle transition table and machine.
// ============================================================================
//! ## Overview
//! Validates the exhaustive transition table, fail-closed rejection of
//! undefined moves, and the terminal halted state.

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

use governor_core::KernelState;
use governor_core::StateMachine;
use governor_core::core::state::can_transition;
use governor_core::core::state::is_terminal;
use governor_core::core::state::next_states;
use governor_core::runtime::validate_transition_path;

// ============================================================================
// SECTION: Transition Table
// ============================================================================

/// Tests every defined transition is accepted and nothing else.
#[test]
fn test_transition_table_is_exhaustive() {
    use KernelState::{Arbitrating, Auditing, Booting, Executing, Halted, Idle, Validating};

    let all = [Booting, Idle, Validating, Arbitrating, Executing, Auditing, Halted];
    let defined = [
        (Booting, Idle),
        (Booting, Halted),
        (Idle, Validating),
        (Idle, Halted),
        (Validating, Arbitrating),
        (Validating, Auditing),
        (Validating, Halted),
        (Arbitrating, Executing),
        (Arbitrating, Auditing),
        (Arbitrating, Halted),
        (Executing, Auditing),
        (Executing, Halted),
        (Auditing, Idle),
        (Auditing, Halted),
    ];

    for from in all {
        for to in all {
            let expected = defined.contains(&(from, to));
            assert_eq!(can_transition(from, to), expected, "{from} -> {to}");
        }
    }
}

/// Tests reachable-state listings agree with the table.
#[test]
fn test_next_states_agree_with_table() {
    use KernelState::{Arbitrating, Auditing, Executing, Halted};

    assert_eq!(next_states(Arbitrating), &[Executing, Auditing, Halted]);
    assert!(next_states(Halted).is_empty());
}

/// Tests only the halted state is terminal.
#[test]
fn test_terminal_states() {
    use KernelState::{Arbitrating, Auditing, Booting, Executing, Halted, Idle, Validating};

    assert!(is_terminal(Halted));
    for state in [Booting, Idle, Validating, Arbitrating, Executing, Auditing] {
        assert!(!is_terminal(state), "{state} must not be terminal");
    }
}

// ============================================================================
// SECTION: Machine Semantics
// ============================================================================

/// Tests the machine walks a full submission cycle.
#[test]
fn test_full_cycle() {
    let mut machine = StateMachine::new();
    assert_eq!(machine.state(), KernelState::Booting);

    for to in [
        KernelState::Idle,
        KernelState::Validating,
        KernelState::Arbitrating,
        KernelState::Executing,
        KernelState::Auditing,
        KernelState::Idle,
    ] {
        machine.transition(to).unwrap();
    }

    assert_eq!(machine.state(), KernelState::Idle);
    assert_eq!(machine.transition_count(), 6);
}

/// Tests undefined moves are rejected without changing state.
#[test]
fn test_undefined_move_rejected() {
    let mut machine = StateMachine::new();
    machine.transition(KernelState::Idle).unwrap();

    let result = machine.transition(KernelState::Executing);

    assert!(result.is_err());
    assert_eq!(machine.state(), KernelState::Idle);
}

/// Tests halting is possible from any non-terminal state and is terminal.
#[test]
fn test_halt_is_terminal() {
    let mut machine = StateMachine::new();
    machine.transition(KernelState::Idle).unwrap();
    machine.halt().unwrap();

    assert!(machine.is_halted());
    assert!(machine.transition(KernelState::Idle).is_err());
    assert!(machine.halt().is_err());
    assert_eq!(machine.state(), KernelState::Halted);
}

// ============================================================================
// SECTION: Path Validation
// ============================================================================

/// Tests transition paths validate as chains of defined moves.
#[test]
fn test_validate_transition_path() {
    let valid = [
        KernelState::Booting,
        KernelState::Idle,
        KernelState::Validating,
        KernelState::Auditing,
        KernelState::Idle,
    ];
    assert!(validate_transition_path(&valid).is_ok());

    let invalid = [KernelState::Idle, KernelState::Executing];
    assert!(validate_transition_path(&invalid).is_err());

    assert!(validate_transition_path(&[KernelState::Idle]).is_ok());
    assert!(validate_transition_path(&[]).is_ok());
}
