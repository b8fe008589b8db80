// governor-core/src/runtime/machine.rs
// ============================================================================
// Module: Governor State Machine
// Description: Fail-closed lifecycle machine over the kernel states.
// Purpose: Enforce the transition table; undefined moves are fatal.
// Dependencies: crate::core, thiserror
// ============================================================================

//! ## Overview
//! The machine starts in `BOOTING` and refuses any move the transition table
//! does not define. A rejected move surfaces as [`StateError`], which the
//! kernel treats as fatal and answers by halting.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::core::state::KernelState;
use crate::core::state::can_transition;
use crate::core::state::is_terminal;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// State machine errors.
#[derive(Debug, Error)]
pub enum StateError {
    /// The requested move is not in the transition table.
    #[error("invalid transition: {from} -> {to}")]
    InvalidTransition {
        /// State the machine was in.
        from: KernelState,
        /// Requested target state.
        to: KernelState,
    },
    /// The machine is in a terminal state.
    #[error("cannot transition from terminal state {state}")]
    Terminal {
        /// The terminal state.
        state: KernelState,
    },
}

// ============================================================================
// SECTION: State Machine
// ============================================================================

/// Deterministic lifecycle machine with fail-closed semantics.
#[derive(Debug, Clone)]
pub struct StateMachine {
    /// Current state.
    state: KernelState,
    /// Number of completed transitions.
    transition_count: u64,
}

impl StateMachine {
    /// Creates a machine in the `BOOTING` state.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: KernelState::Booting,
            transition_count: 0,
        }
    }

    /// Returns the current state.
    #[must_use]
    pub const fn state(&self) -> KernelState {
        self.state
    }

    /// Returns the number of completed transitions.
    #[must_use]
    pub const fn transition_count(&self) -> u64 {
        self.transition_count
    }

    /// Returns true when the machine is halted.
    #[must_use]
    pub const fn is_halted(&self) -> bool {
        matches!(self.state, KernelState::Halted)
    }

    /// Moves to the target state and returns the previous state.
    ///
    /// # Errors
    ///
    /// Returns [`StateError`] when the machine is terminal or the move is not
    /// in the transition table; the machine is left unchanged.
    pub fn transition(&mut self, to: KernelState) -> Result<KernelState, StateError> {
        if is_terminal(self.state) {
            return Err(StateError::Terminal {
                state: self.state,
            });
        }
        if !can_transition(self.state, to) {
            return Err(StateError::InvalidTransition {
                from: self.state,
                to,
            });
        }
        let from = self.state;
        self.state = to;
        self.transition_count += 1;
        Ok(from)
    }

    /// Moves to `HALTED` from any non-terminal state.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::Terminal`] when already halted.
    pub fn halt(&mut self) -> Result<KernelState, StateError> {
        self.transition(KernelState::Halted)
    }
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// SECTION: Path Validation
// ============================================================================

/// Validates a sequence of states as a chain of defined transitions.
///
/// # Errors
///
/// Returns [`StateError::InvalidTransition`] at the first undefined move.
pub fn validate_transition_path(path: &[KernelState]) -> Result<(), StateError> {
    for pair in path.windows(2) {
        if !can_transition(pair[0], pair[1]) {
            return Err(StateError::InvalidTransition {
                from: pair[0],
                to: pair[1],
            });
        }
    }
    Ok(())
}
