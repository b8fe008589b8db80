// governor-core/examples/minimal.rs
// ============================================================================
// Module: Governor Minimal Example
// Description: Minimal end-to-end governor run using in-memory collaborators.
// Purpose: Demonstrate submit, export, and offline replay verification.
// Dependencies: governor-core
// ============================================================================

//! ## Overview
//! Boots a strict kernel with a permit-all policy and an echo tool, submits a
//! few requests, exports the evidence bundle, and verifies the chain offline.

use governor_core::KernelConfig;
use governor_core::Policy;
use governor_core::Request;
use governor_core::ToolCall;
use governor_core::ToolError;
use governor_core::Variant;
use governor_core::runtime::InMemoryToolRegistry;
use governor_core::runtime::Kernel;
use governor_core::runtime::VirtualClock;
use governor_core::runtime::replay_and_verify;
use serde_json::Map;
use serde_json::Value;
use serde_json::json;

/// Error type for example preconditions.
#[derive(Debug)]
struct ExampleError(&'static str);

impl std::fmt::Display for ExampleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::error::Error for ExampleError {}

/// Builds the echo tool parameters.
fn echo_params(message: &str) -> Map<String, Value> {
    let mut params = Map::new();
    params.insert("message".to_string(), json!(message));
    params
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut registry = InMemoryToolRegistry::new();
    registry.register("echo", |params: &Map<String, Value>| {
        let message = params
            .get("message")
            .cloned()
            .ok_or_else(|| ToolError::handler("missing 'message' parameter"))?;
        Ok(json!({ "echoed": message }))
    });

    let clock = VirtualClock::with_step(1000, 1);
    let config = KernelConfig::new("example-kernel", Variant::Strict, Policy::permit_all());
    let mut kernel = Kernel::boot(config, registry, clock);

    let first = kernel.submit(
        Request::new("r1", "alice", "say hi", 1000)
            .with_tool_call(ToolCall::new("echo", echo_params("hi"))),
    );
    if first.tool_result.is_none() {
        return Err(Box::new(ExampleError("echo result missing")));
    }

    let second = kernel.submit(Request::new("r2", "alice", "note without a tool", 1001));
    let _ = (first, second);

    let bundle = kernel.export_evidence();
    let report = replay_and_verify(&bundle, Some(&bundle.root_hash));
    if !report.is_valid() {
        return Err(Box::new(ExampleError("exported bundle failed verification")));
    }

    Ok(())
}
