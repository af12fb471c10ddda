//! # Approval Gate
//!
//! The state machine between a validated proposal and its execution.
//! Every action passes through here exactly once; nothing runs without
//! an explicit Accept, and an edited action re-enters as a fresh proposal.

use tracing::{debug, info};

use crate::application::validator::ActionValidator;
use crate::domain::action::{Action, ApprovalDecision};
use crate::domain::traits::ApprovalPrompt;

/// Where one proposal currently stands.
#[derive(Debug, Clone, PartialEq)]
pub enum GateState {
    Proposed,
    Accepted,
    Rejected,
    Editing,
}

/// Terminal outcome of one pass through the gate.
#[derive(Debug, Clone, PartialEq)]
pub enum GateOutcome {
    /// Run this action. It may differ from the proposal if edits occurred;
    /// the decision records the final replacement text when they did.
    Approved {
        action: Action,
        decision: ApprovalDecision,
    },
    /// Do not run anything for this proposal.
    Skipped,
}

/// Drives one proposed action to Accepted or Rejected via the prompt.
pub struct ApprovalGate;

impl ApprovalGate {
    /// Present `action` for approval. Loops through edit rounds until the
    /// user accepts, rejects, or cancels out of an edit.
    pub async fn resolve(
        prompt: &mut (impl ApprovalPrompt + ?Sized),
        action: Action,
    ) -> Result<GateOutcome, String> {
        let mut state = GateState::Proposed;
        let mut current = action;
        let mut edited = false;

        loop {
            debug!(action = current.name(), ?state, "awaiting approval");
            let decision = prompt.decide(&current).await?;

            match decision {
                ApprovalDecision::Accept => {
                    info!(action = %current.summary(), state = ?GateState::Accepted, "action accepted");
                    let decision = if edited {
                        ApprovalDecision::Edit {
                            replacement: current.editable_text().to_string(),
                        }
                    } else {
                        ApprovalDecision::Accept
                    };
                    return Ok(GateOutcome::Approved {
                        action: current,
                        decision,
                    });
                }
                ApprovalDecision::Reject => {
                    info!(action = %current.summary(), state = ?GateState::Rejected, "action rejected");
                    return Ok(GateOutcome::Skipped);
                }
                ApprovalDecision::Edit { replacement } => {
                    state = GateState::Editing;
                    debug!(action = current.name(), ?state, "collecting edit");
                    match Self::apply_edit(prompt, &current, replacement).await? {
                        Some(updated) => {
                            // the edited action is a new proposal; it still
                            // needs its own Accept before it runs
                            edited = true;
                            current = updated;
                            state = GateState::Proposed;
                        }
                        None => {
                            info!(action = %current.summary(), state = ?GateState::Rejected, "edit cancelled, action rejected");
                            return Ok(GateOutcome::Skipped);
                        }
                    }
                }
            }
        }
    }

    /// Re-validate an edit, re-prompting while the replacement is invalid.
    /// Empty replacement text cancels.
    async fn apply_edit(
        prompt: &mut (impl ApprovalPrompt + ?Sized),
        action: &Action,
        replacement: String,
    ) -> Result<Option<Action>, String> {
        let mut replacement = replacement;
        loop {
            if replacement.trim().is_empty() {
                return Ok(None);
            }
            let candidate = action.apply_edit(&replacement);
            match ActionValidator::validate(&candidate) {
                Ok(()) => return Ok(Some(candidate)),
                Err(error) => match prompt.collect_edit(action, &error).await? {
                    Some(next) => replacement = next,
                    None => return Ok(None),
                },
            }
        }
    }
}
