// governor-core/src/interfaces/mod.rs
// ============================================================================
// Module: Governor Interfaces
// Description: Collaborator interfaces for tools and time.
// Purpose: Define the contract surfaces the kernel depends on.
// Dependencies: serde_json, thiserror
// ============================================================================

//! ## Overview
//! Interfaces define how the kernel integrates with external systems without
//! embedding backend-specific details. Implementations must be deterministic
//! given their inputs; the kernel never reads wall-clock time or performs I/O
//! except through these collaborators.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Map;
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// SECTION: Tool Handler
// ============================================================================

/// Tool handler errors.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Tool handler reported an error.
    #[error("{0}")]
    Handler(String),
}

impl ToolError {
    /// Creates a handler error from a message.
    #[must_use]
    pub fn handler(message: impl Into<String>) -> Self {
        Self::Handler(message.into())
    }
}

/// Synchronous, deterministic tool handler.
///
/// Handlers must be deterministic given their parameters; non-determinism is
/// a contract violation. Handler errors are recoverable and never halt the
/// kernel.
pub trait ToolHandler {
    /// Invokes the handler with the given parameters.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError`] when the tool fails; the message is surfaced
    /// verbatim in the receipt and ledger entry.
    fn invoke(&self, params: &Map<String, Value>) -> Result<Value, ToolError>;
}

impl<F> ToolHandler for F
where
    F: Fn(&Map<String, Value>) -> Result<Value, ToolError>,
{
    fn invoke(&self, params: &Map<String, Value>) -> Result<Value, ToolError> {
        self(params)
    }
}

// ============================================================================
// SECTION: Tool Registry
// ============================================================================

/// Name-to-handler mapping consulted during execution.
pub trait ToolRegistry {
    /// Resolves a tool name into a handler, if registered.
    fn lookup(&self, name: &str) -> Option<&dyn ToolHandler>;

    /// Returns the registered tool names in deterministic order.
    fn tool_names(&self) -> Vec<String>;
}

// ============================================================================
// SECTION: Clock
// ============================================================================

/// Millisecond clock collaborator.
///
/// Implementations may be wall-clock or virtual; virtual clocks make replay
/// fully deterministic.
pub trait Clock {
    /// Returns the current time in milliseconds.
    fn now_ms(&self) -> i64;
}

impl<T: Clock + ?Sized> Clock for &T {
    fn now_ms(&self) -> i64 {
        (**self).now_ms()
    }
}

impl<T: Clock + ?Sized> Clock for std::sync::Arc<T> {
    fn now_ms(&self) -> i64 {
        (**self).now_ms()
    }
}
