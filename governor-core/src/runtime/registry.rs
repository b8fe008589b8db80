// governor-core/src/runtime/registry.rs
// ============================================================================
// Module: Governor In-Memory Tool Registry
// Description: Simple name-to-handler registry for tests and embedders.
// Purpose: Provide a deterministic registry implementation without external deps.
// Dependencies: crate::interfaces
// ============================================================================

//! ## Overview
//! Tools must be explicitly registered; there is no dynamic discovery or
//! import-by-name. A `BTreeMap` keeps iteration order deterministic.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use crate::interfaces::ToolHandler;
use crate::interfaces::ToolRegistry;

// ============================================================================
// SECTION: In-Memory Registry
// ============================================================================

/// In-memory tool registry keyed by tool name.
#[derive(Default)]
pub struct InMemoryToolRegistry {
    /// Registered handlers in name order.
    tools: BTreeMap<String, Box<dyn ToolHandler + Send + Sync>>,
}

impl InMemoryToolRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tools: BTreeMap::new(),
        }
    }

    /// Registers a handler under a name, replacing any previous handler.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        handler: impl ToolHandler + Send + Sync + 'static,
    ) {
        self.tools.insert(name.into(), Box::new(handler));
    }

    /// Returns true when a handler is registered under the name.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }
}

impl ToolRegistry for InMemoryToolRegistry {
    fn lookup(&self, name: &str) -> Option<&dyn ToolHandler> {
        self.tools.get(name).map(|handler| -> &dyn ToolHandler { handler.as_ref() })
    }

    fn tool_names(&self) -> Vec<String> {
        self.tools.keys().cloned().collect()
    }
}

impl std::fmt::Debug for InMemoryToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryToolRegistry")
            .field("tools", &self.tools.keys().collect::<Vec<_>>())
            .finish()
    }
}
