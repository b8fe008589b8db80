// governor-core/src/core/state.rs
// ============================================================================
// Module: Governor Kernel States
// Description: Kernel lifecycle states and the allowed transition table.
// Purpose: Make every legal state move explicit; everything else is rejected.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! The kernel holds exactly one state at any instant. The transition table
//! below is exhaustive: a move not listed here is a fatal condition that
//! drives the kernel to `HALTED`. `HALTED` is terminal and has no outgoing
//! transitions.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Kernel State
// ============================================================================

/// Kernel lifecycle state.
///
/// # Invariants
/// - Variants are stable for serialization and contract matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum KernelState {
    /// Kernel is booting and not yet accepting requests.
    Booting,
    /// Kernel is idle and ready for a submission.
    Idle,
    /// Structural validation of a request is in progress.
    Validating,
    /// Policy arbitration of a request is in progress.
    Arbitrating,
    /// A tool handler is being invoked.
    Executing,
    /// A decision is being committed to the audit ledger.
    Auditing,
    /// Terminal state; the kernel is unusable.
    Halted,
}

impl KernelState {
    /// Returns the stable uppercase name of the state.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Booting => "BOOTING",
            Self::Idle => "IDLE",
            Self::Validating => "VALIDATING",
            Self::Arbitrating => "ARBITRATING",
            Self::Executing => "EXECUTING",
            Self::Auditing => "AUDITING",
            Self::Halted => "HALTED",
        }
    }
}

impl fmt::Display for KernelState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Transition Table
// ============================================================================

/// Returns true when the move between the two states is defined.
#[must_use]
pub const fn can_transition(from: KernelState, to: KernelState) -> bool {
    use KernelState::{Arbitrating, Auditing, Booting, Executing, Halted, Idle, Validating};
    matches!(
        (from, to),
        (Booting, Idle | Halted)
            | (Idle, Validating | Halted)
            | (Validating, Arbitrating | Auditing | Halted)
            | (Arbitrating, Executing | Auditing | Halted)
            | (Executing, Auditing | Halted)
            | (Auditing, Idle | Halted)
    )
}

/// Returns the states reachable from the given state.
#[must_use]
pub const fn next_states(from: KernelState) -> &'static [KernelState] {
    use KernelState::{Arbitrating, Auditing, Booting, Executing, Halted, Idle, Validating};
    match from {
        Booting => &[Idle, Halted],
        Idle => &[Validating, Halted],
        Validating => &[Arbitrating, Auditing, Halted],
        Arbitrating => &[Executing, Auditing, Halted],
        Executing => &[Auditing, Halted],
        Auditing => &[Idle, Halted],
        Halted => &[],
    }
}

/// Returns true when the state has no outgoing transitions.
#[must_use]
pub const fn is_terminal(state: KernelState) -> bool {
    next_states(state).is_empty()
}
