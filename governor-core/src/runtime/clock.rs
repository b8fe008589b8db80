// governor-core/src/runtime/clock.rs
// ============================================================================
// Module: Governor Clocks
// Description: Virtual and wall-clock implementations of the clock interface.
// Purpose: Keep kernel time injectable and replay deterministic.
// Dependencies: crate::interfaces
// ============================================================================

//! ## Overview
//! The kernel reads time only through the [`Clock`] interface. A virtual
//! clock makes two kernels fed the same requests produce byte-identical
//! ledgers; the system clock exists for hosts that accept wall-clock entries.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::atomic::AtomicI64;
use std::sync::atomic::Ordering;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use crate::interfaces::Clock;

// ============================================================================
// SECTION: Virtual Clock
// ============================================================================

/// Deterministic clock for replayable kernels.
///
/// # Invariants
/// - Time never moves backward: `advance` takes a non-negative delta and
///   `set` ignores values earlier than the current time.
#[derive(Debug)]
pub struct VirtualClock {
    /// Current time in milliseconds.
    current_ms: AtomicI64,
    /// Milliseconds added after each read.
    step_ms: i64,
}

impl VirtualClock {
    /// Creates a clock frozen at the given time.
    #[must_use]
    pub const fn new(initial_ms: i64) -> Self {
        Self {
            current_ms: AtomicI64::new(initial_ms),
            step_ms: 0,
        }
    }

    /// Creates a clock that advances by `step_ms` after every read.
    #[must_use]
    pub const fn with_step(initial_ms: i64, step_ms: i64) -> Self {
        Self {
            current_ms: AtomicI64::new(initial_ms),
            step_ms,
        }
    }

    /// Advances the clock by the given number of milliseconds.
    pub fn advance(&self, delta_ms: u64) {
        let delta = i64::try_from(delta_ms).unwrap_or(i64::MAX);
        self.current_ms.fetch_add(delta, Ordering::SeqCst);
    }

    /// Sets the clock to a specific time; earlier values are ignored.
    pub fn set(&self, ts_ms: i64) {
        self.current_ms.fetch_max(ts_ms, Ordering::SeqCst);
    }
}

impl Clock for VirtualClock {
    fn now_ms(&self) -> i64 {
        if self.step_ms == 0 {
            self.current_ms.load(Ordering::SeqCst)
        } else {
            self.current_ms.fetch_add(self.step_ms, Ordering::SeqCst)
        }
    }
}

// ============================================================================
// SECTION: System Clock
// ============================================================================

/// Wall-clock implementation for non-replayed hosts.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        SystemTime::now().duration_since(UNIX_EPOCH).map_or(0, |elapsed| {
            i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX)
        })
    }
}
