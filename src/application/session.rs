//! # Session
//!
//! The core loop that drives one approval-gated session: fetch a proposal,
//! validate, check for loops, gate, execute, record, feed the result back.
//! A single task owns all mutable state; there is no shared-state locking.

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;
use std::path::Path;
use tracing::{info, warn};

use crate::application::approval::{ApprovalGate, GateOutcome};
use crate::application::loop_guard::LoopGuard;
use crate::application::validator::ActionValidator;
use crate::domain::action::{Action, ApprovalDecision};
use crate::domain::errors::LoopDetected;
use crate::domain::result::ActionResult;
use crate::domain::traits::{ApprovalPrompt, ConversationBridge};
use crate::infrastructure::tools::executor::ActionExecutor;

/// One ruled-on action and what came of it.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryRecord {
    pub turn: usize,
    pub action: Action,
    pub decision: ApprovalDecision,
    /// `None` when the action was rejected and never ran.
    pub result: Option<ActionResult>,
    pub truncated: bool,
    pub timestamp: String,
}

/// Chronological record of the session.
#[derive(Debug, Default)]
pub struct SessionState {
    records: Vec<HistoryRecord>,
    turn: usize,
}

impl SessionState {
    fn record(
        &mut self,
        action: Action,
        decision: ApprovalDecision,
        result: Option<ActionResult>,
        truncated: bool,
    ) {
        self.turn += 1;
        self.records.push(HistoryRecord {
            turn: self.turn,
            action,
            decision,
            result,
            truncated,
            timestamp: Utc::now().to_rfc3339(),
        });
    }

    pub fn records(&self) -> &[HistoryRecord] {
        &self.records
    }

    /// Write the history as JSON lines. One record per line, chronological.
    pub fn dump(&self, path: &Path) -> Result<()> {
        let mut out = String::new();
        for record in &self.records {
            let line = serde_json::to_string(record).context("Failed to serialize record")?;
            out.push_str(&line);
            out.push('\n');
        }
        std::fs::write(path, out)
            .with_context(|| format!("Failed to write history to {}", path.display()))?;
        Ok(())
    }
}

/// How the session ended.
#[derive(Debug, PartialEq)]
pub enum SessionEnd {
    /// The bridge had no further proposals.
    Finished,
    /// The repetition guard tripped; automatic acceptance must stop.
    LoopDetected(LoopDetected),
}

/// Owns the per-session pipeline and drives it until the bridge runs dry
/// or the guard halts it.
pub struct Session {
    executor: ActionExecutor,
    guard: LoopGuard,
    state: SessionState,
}

impl Session {
    pub fn new(executor: ActionExecutor, guard: LoopGuard) -> Self {
        Self {
            executor,
            guard,
            state: SessionState::default(),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Primary session loop.
    pub async fn run(
        &mut self,
        bridge: &mut (impl ConversationBridge + ?Sized),
        prompt: &mut (impl ApprovalPrompt + ?Sized),
    ) -> Result<SessionEnd> {
        let mut last: Option<ActionResult> = None;

        loop {
            let proposal = match bridge.next_proposal(last.as_ref()).await {
                Ok(Some(value)) => value,
                Ok(None) => {
                    info!(turns = self.state.turn, "session finished");
                    return Ok(SessionEnd::Finished);
                }
                Err(e) => anyhow::bail!("Bridge error: {}", e),
            };

            // 1. Parse. A malformed proposal becomes a failed result fed
            // straight back; nothing was proposed to the user.
            let action = match Action::from_proposal(&proposal) {
                Ok(action) => action,
                Err(error) => {
                    warn!(%error, "unparseable proposal");
                    last = Some(ActionResult::fail("unknown", error.to_string()));
                    continue;
                }
            };

            // 2. Validate before anything is shown for approval.
            if let Err(error) = ActionValidator::validate(&action) {
                warn!(action = action.name(), %error, "invalid proposal");
                last = Some(ActionResult::fail(action.name(), error.to_string()));
                continue;
            }

            // 3. Loop check on the proposal stream, accepted or not.
            if let Err(detected) = self.guard.observe(&action) {
                return Ok(SessionEnd::LoopDetected(detected));
            }

            // 4. Gate.
            match ApprovalGate::resolve(prompt, action.clone())
                .await
                .map_err(|e| anyhow::anyhow!("Prompt error: {}", e))?
            {
                GateOutcome::Skipped => {
                    bridge
                        .notify_skipped(&action)
                        .await
                        .map_err(|e| anyhow::anyhow!("Bridge error: {}", e))?;
                    self.state
                        .record(action, ApprovalDecision::Reject, None, false);
                    // a rejection is not an outcome; the next proposal gets
                    // no result echo
                    last = None;
                }
                GateOutcome::Approved {
                    action: approved,
                    decision,
                } => {
                    // 5. Execute. Total: failures come back as data.
                    let mut result = self.executor.execute(&approved).await;
                    let (message, truncated) = self.guard.clamp_response(&result.message);
                    result.message = message;
                    self.state
                        .record(approved, decision, Some(result.clone()), truncated);
                    last = Some(result);
                }
            }
        }
    }
}
