// governor-core/src/runtime/kernel.rs
// ============================================================================
// Module: Governor Kernel
// Description: The orchestrator: validate, arbitrate, execute, audit, return.
// Purpose: Guarantee that no visible effect exists without a committed entry.
// Dependencies: crate::{core, interfaces, runtime}, thiserror
// ============================================================================

//! ## Overview
//! The kernel is the single canonical execution path for every submission.
//! The per-submission sequence is strictly: state transitions, clock read,
//! ledger append, receipt construction, return. A tool's result is surfaced
//! only once the append succeeds; if the append fails the kernel halts and
//! the result is withheld.
//!
//! Recoverable conditions (validation, policy, execution failures) fold into
//! the receipt and are recorded in the ledger. Fatal conditions (audit
//! failures, undefined state moves) drive the kernel to `HALTED`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::core::audit::EntryDraft;
use crate::core::audit::EvidenceBundle;
use crate::core::hashing;
use crate::core::identifiers::ActorId;
use crate::core::identifiers::KernelId;
use crate::core::identifiers::RequestId;
use crate::core::policy::Policy;
use crate::core::receipt::Decision;
use crate::core::receipt::Receipt;
use crate::core::receipt::ReceiptStatus;
use crate::core::request::Request;
use crate::core::state::KernelState;
use crate::core::variant::Variant;
use crate::interfaces::Clock;
use crate::interfaces::ToolRegistry;
use crate::runtime::evaluator::custom_rule_outcome;
use crate::runtime::evaluator::jurisdiction_violations;
use crate::runtime::evaluator::structural_violations;
use crate::runtime::ledger::AuditLedger;
use crate::runtime::ledger::LedgerError;
use crate::runtime::machine::StateError;
use crate::runtime::machine::StateMachine;

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Configuration for a kernel instance.
#[derive(Debug, Clone)]
pub struct KernelConfig {
    /// Kernel instance identifier, stamped into exported bundles.
    pub kernel_id: KernelId,
    /// Posture variant applied to every submission.
    pub variant: Variant,
    /// Immutable arbitration policy.
    pub policy: Policy,
}

impl KernelConfig {
    /// Creates a configuration for the given identifier, variant, and policy.
    #[must_use]
    pub fn new(kernel_id: impl Into<KernelId>, variant: Variant, policy: Policy) -> Self {
        Self {
            kernel_id: kernel_id.into(),
            variant,
            policy,
        }
    }
}

// ============================================================================
// SECTION: Fatal Conditions
// ============================================================================

/// Conditions that make the kernel unusable.
#[derive(Debug, Error)]
enum FatalCondition {
    /// The ledger rejected an append.
    #[error("audit append failed: {0}")]
    Audit(LedgerError),
    /// The state machine rejected a move.
    #[error("state machine failure: {0}")]
    State(StateError),
}

// ============================================================================
// SECTION: Kernel
// ============================================================================

/// Deterministic governor kernel over a tool registry and a clock.
///
/// # Invariants
/// - Exactly one lifecycle state is held at any instant.
/// - After `submit` returns, the state is `IDLE` or `HALTED`.
/// - Ledger order equals submission order.
pub struct Kernel<R, C> {
    /// Kernel instance identifier.
    kernel_id: KernelId,
    /// Posture variant.
    variant: Variant,
    /// Immutable arbitration policy.
    policy: Policy,
    /// Tool registry consulted during execution.
    registry: R,
    /// Clock collaborator; the only time source.
    clock: C,
    /// Lifecycle state machine.
    machine: StateMachine,
    /// Append-only audit ledger; single-writer through this kernel.
    ledger: AuditLedger,
    /// Receipt of the halt, replayed by idempotent halt calls.
    halt_receipt: Option<Receipt>,
}

impl<R, C> Kernel<R, C>
where
    R: ToolRegistry,
    C: Clock,
{
    /// Boots a kernel from its configuration and collaborators.
    ///
    /// A kernel whose policy fails validation boots into `HALTED`; every
    /// subsequent submission is rejected with a fatal-state error.
    #[must_use]
    pub fn boot(config: KernelConfig, registry: R, clock: C) -> Self {
        let mut machine = StateMachine::new();
        let ledger = AuditLedger::new(config.kernel_id.clone(), config.variant);
        let boot_target = if config.policy.validate().is_ok() {
            KernelState::Idle
        } else {
            KernelState::Halted
        };
        machine.transition(boot_target).ok();
        Self {
            kernel_id: config.kernel_id,
            variant: config.variant,
            policy: config.policy,
            registry,
            clock,
            machine,
            ledger,
            halt_receipt: None,
        }
    }

    /// Returns the kernel identifier.
    #[must_use]
    pub fn kernel_id(&self) -> &KernelId {
        &self.kernel_id
    }

    /// Returns the posture variant.
    #[must_use]
    pub fn variant(&self) -> Variant {
        self.variant
    }

    /// Returns the arbitration policy.
    #[must_use]
    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    /// Returns the current lifecycle state.
    #[must_use]
    pub fn state(&self) -> KernelState {
        self.machine.state()
    }

    /// Returns a read-only view of the audit ledger.
    #[must_use]
    pub fn ledger(&self) -> &AuditLedger {
        &self.ledger
    }

    /// Submits a request for arbitration and optional execution.
    ///
    /// This is the only ingress. Every outcome other than a fatal-state
    /// rejection commits exactly one ledger entry before the receipt is
    /// returned.
    pub fn submit(&mut self, request: Request) -> Receipt {
        let current = self.machine.state();
        if current != KernelState::Idle {
            let timestamp_ms = self.clock.now_ms();
            let (decision, error) = if self.machine.is_halted() {
                (Decision::Halt, "kernel is halted".to_string())
            } else {
                (Decision::Deny, format!("kernel is {current}, not IDLE"))
            };
            return Receipt {
                request_id: request.request_id,
                status: ReceiptStatus::Rejected,
                decision,
                state_from: current,
                state_to: current,
                timestamp_ms,
                tool_result: None,
                error_message: Some(error),
                evidence_hash: None,
            };
        }

        match self.process(&request) {
            Ok(receipt) => receipt,
            Err(fatal) => self.halt_on_failure(&request, &fatal),
        }
    }

    /// Halts the kernel, committing a final HALT entry.
    ///
    /// Idempotent: halting an already halted kernel appends nothing and
    /// returns the previous halt receipt, or a synthetic one.
    pub fn halt(&mut self, reason: impl Into<String>) -> Receipt {
        let reason = reason.into();
        if self.machine.is_halted() {
            return match &self.halt_receipt {
                Some(receipt) => receipt.clone(),
                None => self.synthetic_halt_receipt(),
            };
        }

        let state_from = self.machine.state();
        let timestamp_ms = self.clock.now_ms();
        let draft = EntryDraft {
            request_id: RequestId::new("halt"),
            actor: ActorId::new("system"),
            intent: "halt".to_string(),
            decision: Decision::Halt,
            state_from,
            state_to: KernelState::Halted,
            timestamp_ms,
            tool_name: None,
            params_hash: None,
            evidence_hash: None,
            error: Some(reason.clone()),
        };
        let appended = self.ledger.append(draft);
        self.machine.halt().ok();

        let receipt = match appended {
            Ok(entry_hash) => Receipt {
                request_id: RequestId::new("halt"),
                status: ReceiptStatus::Accepted,
                decision: Decision::Halt,
                state_from,
                state_to: KernelState::Halted,
                timestamp_ms,
                tool_result: None,
                error_message: Some(reason),
                evidence_hash: Some(entry_hash),
            },
            Err(err) => Receipt {
                request_id: RequestId::new("halt"),
                status: ReceiptStatus::Failed,
                decision: Decision::Halt,
                state_from,
                state_to: KernelState::Halted,
                timestamp_ms,
                tool_result: None,
                error_message: Some(err.to_string()),
                evidence_hash: None,
            },
        };
        self.halt_receipt = Some(receipt.clone());
        receipt
    }

    /// Exports a deep-copied evidence bundle; permitted from any state.
    #[must_use]
    pub fn export_evidence(&self) -> EvidenceBundle {
        self.ledger.export(self.clock.now_ms())
    }

    // ------------------------------------------------------------------
    // Submission pipeline
    // ------------------------------------------------------------------

    /// Runs one submission through the full lifecycle.
    fn process(&mut self, request: &Request) -> Result<Receipt, FatalCondition> {
        self.machine.transition(KernelState::Validating).map_err(FatalCondition::State)?;
        let structural = structural_violations(request, &self.policy);
        if !structural.is_empty() {
            return self.commit_denied(request, KernelState::Validating, structural);
        }

        self.machine.transition(KernelState::Arbitrating).map_err(FatalCondition::State)?;
        let mut violations = self.variant.contract_violations(request);
        violations.extend(jurisdiction_violations(request, &self.policy, self.variant.posture()));
        let custom = custom_rule_outcome(request, &self.policy);
        violations.extend(custom.violations);

        if let Some(reason) = custom.halt_reason {
            return self.commit_halt_decision(request, reason);
        }
        if !violations.is_empty() {
            return self.commit_denied(request, KernelState::Arbitrating, violations);
        }

        let mut concluded_in = KernelState::Arbitrating;
        let mut tool_result = None;
        let mut execution_error: Option<String> = None;
        if let Some(tool_call) = &request.tool_call {
            self.machine.transition(KernelState::Executing).map_err(FatalCondition::State)?;
            concluded_in = KernelState::Executing;
            match self.registry.lookup(tool_call.name.as_str()) {
                None => {
                    execution_error =
                        Some(format!("tool '{}' is not registered", tool_call.name));
                }
                Some(handler) => match handler.invoke(&tool_call.params) {
                    Ok(value) => tool_result = Some(value),
                    Err(err) => execution_error = Some(err.to_string()),
                },
            }
        }

        let decision = if execution_error.is_some() { Decision::Deny } else { Decision::Allow };
        let (params_hash, evidence_hash) = request_hashes(request);
        let timestamp_ms = self.clock.now_ms();
        let draft = EntryDraft {
            request_id: request.request_id.clone(),
            actor: request.actor.clone(),
            intent: request.intent.clone(),
            decision,
            state_from: concluded_in,
            state_to: KernelState::Auditing,
            timestamp_ms,
            tool_name: request.tool_call.as_ref().map(|tool_call| tool_call.name.clone()),
            params_hash,
            evidence_hash,
            error: execution_error.clone(),
        };

        self.machine.transition(KernelState::Auditing).map_err(FatalCondition::State)?;
        let entry_hash = self.ledger.append(draft).map_err(FatalCondition::Audit)?;
        self.machine.transition(KernelState::Idle).map_err(FatalCondition::State)?;

        let status = if execution_error.is_some() {
            ReceiptStatus::Failed
        } else {
            ReceiptStatus::Accepted
        };
        Ok(Receipt {
            request_id: request.request_id.clone(),
            status,
            decision,
            state_from: KernelState::Idle,
            state_to: KernelState::Idle,
            timestamp_ms,
            tool_result,
            error_message: execution_error,
            evidence_hash: Some(entry_hash),
        })
    }

    /// Commits a DENY entry and returns the rejection receipt.
    fn commit_denied(
        &mut self,
        request: &Request,
        concluded_in: KernelState,
        violations: Vec<String>,
    ) -> Result<Receipt, FatalCondition> {
        let error = violations.join("; ");
        let (params_hash, evidence_hash) = request_hashes(request);
        let timestamp_ms = self.clock.now_ms();
        let draft = EntryDraft {
            request_id: request.request_id.clone(),
            actor: request.actor.clone(),
            intent: request.intent.clone(),
            decision: Decision::Deny,
            state_from: concluded_in,
            state_to: KernelState::Auditing,
            timestamp_ms,
            tool_name: request.tool_call.as_ref().map(|tool_call| tool_call.name.clone()),
            params_hash,
            evidence_hash,
            error: Some(error.clone()),
        };

        self.machine.transition(KernelState::Auditing).map_err(FatalCondition::State)?;
        let entry_hash = self.ledger.append(draft).map_err(FatalCondition::Audit)?;
        self.machine.transition(KernelState::Idle).map_err(FatalCondition::State)?;

        Ok(Receipt {
            request_id: request.request_id.clone(),
            status: ReceiptStatus::Rejected,
            decision: Decision::Deny,
            state_from: KernelState::Idle,
            state_to: KernelState::Idle,
            timestamp_ms,
            tool_result: None,
            error_message: Some(error),
            evidence_hash: Some(entry_hash),
        })
    }

    /// Commits a HALT entry demanded by a custom rule and halts terminally.
    fn commit_halt_decision(
        &mut self,
        request: &Request,
        reason: String,
    ) -> Result<Receipt, FatalCondition> {
        let (params_hash, evidence_hash) = request_hashes(request);
        let timestamp_ms = self.clock.now_ms();
        let draft = EntryDraft {
            request_id: request.request_id.clone(),
            actor: request.actor.clone(),
            intent: request.intent.clone(),
            decision: Decision::Halt,
            state_from: KernelState::Arbitrating,
            state_to: KernelState::Halted,
            timestamp_ms,
            tool_name: request.tool_call.as_ref().map(|tool_call| tool_call.name.clone()),
            params_hash,
            evidence_hash,
            error: Some(reason.clone()),
        };

        // Commit before the transition becomes observable.
        let entry_hash = self.ledger.append(draft).map_err(FatalCondition::Audit)?;
        self.machine.transition(KernelState::Halted).map_err(FatalCondition::State)?;

        let receipt = Receipt {
            request_id: request.request_id.clone(),
            status: ReceiptStatus::Rejected,
            decision: Decision::Halt,
            state_from: KernelState::Idle,
            state_to: KernelState::Halted,
            timestamp_ms,
            tool_result: None,
            error_message: Some(reason),
            evidence_hash: Some(entry_hash),
        };
        self.halt_receipt = Some(receipt.clone());
        Ok(receipt)
    }

    /// Handles a fatal condition: best-effort HALT entry, terminal state,
    /// FAILED receipt. Any tool result is withheld.
    fn halt_on_failure(&mut self, request: &Request, fatal: &FatalCondition) -> Receipt {
        let timestamp_ms = self.clock.now_ms();
        let mut evidence_hash = None;
        if !matches!(fatal, FatalCondition::Audit(_)) {
            // The ledger is still usable; record the halt.
            let draft = EntryDraft {
                request_id: request.request_id.clone(),
                actor: request.actor.clone(),
                intent: request.intent.clone(),
                decision: Decision::Halt,
                state_from: self.machine.state(),
                state_to: KernelState::Halted,
                timestamp_ms,
                tool_name: None,
                params_hash: None,
                evidence_hash: None,
                error: Some(fatal.to_string()),
            };
            if let Ok(entry_hash) = self.ledger.append(draft) {
                evidence_hash = Some(entry_hash);
            }
        }
        if !self.machine.is_halted() {
            self.machine.halt().ok();
        }

        let receipt = Receipt {
            request_id: request.request_id.clone(),
            status: ReceiptStatus::Failed,
            decision: Decision::Halt,
            state_from: KernelState::Idle,
            state_to: KernelState::Halted,
            timestamp_ms,
            tool_result: None,
            error_message: Some(fatal.to_string()),
            evidence_hash,
        };
        self.halt_receipt = Some(receipt.clone());
        receipt
    }

    /// Builds the receipt returned by idempotent halt calls with no history.
    fn synthetic_halt_receipt(&self) -> Receipt {
        Receipt {
            request_id: RequestId::new("halt"),
            status: ReceiptStatus::Rejected,
            decision: Decision::Halt,
            state_from: KernelState::Halted,
            state_to: KernelState::Halted,
            timestamp_ms: self.clock.now_ms(),
            tool_result: None,
            error_message: Some("kernel is halted".to_string()),
            evidence_hash: None,
        }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Derives the optional request digests recorded in ledger entries.
///
/// Hash failures were already reported as structural violations by the
/// evaluator; an entry on the deny path simply omits the digest.
fn request_hashes(request: &Request) -> (Option<String>, Option<String>) {
    let params_hash = request
        .tool_call
        .as_ref()
        .and_then(|tool_call| hashing::params_hash(&tool_call.params).ok());
    let evidence_hash =
        request.evidence.as_ref().and_then(|evidence| hashing::evidence_hash(evidence).ok());
    (params_hash, evidence_hash)
}
