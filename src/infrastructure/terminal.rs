//! # Terminal Frontend
//!
//! Line-oriented stdin implementations of the approval prompt and the
//! conversation bridge. Proposals arrive as one JSON object per line;
//! rulings are single keystrokes followed by Enter.

use async_trait::async_trait;
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::warn;

use crate::domain::action::{Action, ApprovalDecision};
use crate::domain::errors::ValidationError;
use crate::domain::result::ActionResult;
use crate::domain::traits::{ApprovalPrompt, ConversationBridge};

fn stdin_lines() -> Lines<BufReader<Stdin>> {
    BufReader::new(tokio::io::stdin()).lines()
}

/// Interactive y/n/e prompt on the terminal.
pub struct TerminalPrompt {
    input: Lines<BufReader<Stdin>>,
}

impl TerminalPrompt {
    pub fn new() -> Self {
        Self {
            input: stdin_lines(),
        }
    }

    async fn read_line(&mut self) -> Result<Option<String>, String> {
        self.input
            .next_line()
            .await
            .map_err(|e| format!("Failed to read input: {}", e))
    }
}

impl Default for TerminalPrompt {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ApprovalPrompt for TerminalPrompt {
    async fn decide(&mut self, action: &Action) -> Result<ApprovalDecision, String> {
        println!("\nProposed action: {}", action.summary());
        loop {
            match action {
                Action::RunCommand { .. } => {
                    println!("Press Y to run, N to skip, E to edit command");
                }
                _ => println!("Approve? [y/n/e]"),
            }
            let line = match self.read_line().await? {
                Some(line) => line,
                // input closed mid-session, never run anything unattended
                None => return Ok(ApprovalDecision::Reject),
            };
            match line.trim().to_lowercase().as_str() {
                "y" | "yes" => return Ok(ApprovalDecision::Accept),
                "n" | "no" => return Ok(ApprovalDecision::Reject),
                "e" | "edit" => {
                    println!("New value (empty to cancel):");
                    let replacement = self.read_line().await?.unwrap_or_default();
                    return Ok(ApprovalDecision::Edit { replacement });
                }
                other => println!("Unrecognized answer '{}', expected y, n or e", other),
            }
        }
    }

    async fn collect_edit(
        &mut self,
        action: &Action,
        error: &ValidationError,
    ) -> Result<Option<String>, String> {
        println!("Edit of {} is invalid: {}", action.name(), error);
        println!("New value (empty to cancel):");
        let line = self.read_line().await?.unwrap_or_default();
        if line.trim().is_empty() {
            Ok(None)
        } else {
            Ok(Some(line))
        }
    }
}

/// Bridge that reads JSON proposal lines from stdin and echoes results to
/// stdout. EOF ends the session.
pub struct StdinBridge {
    input: Lines<BufReader<Stdin>>,
}

impl StdinBridge {
    pub fn new() -> Self {
        Self {
            input: stdin_lines(),
        }
    }
}

impl Default for StdinBridge {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConversationBridge for StdinBridge {
    async fn next_proposal(
        &mut self,
        last: Option<&ActionResult>,
    ) -> Result<Option<Value>, String> {
        if let Some(result) = last {
            let marker = if result.success { "[ok]" } else { "[failed]" };
            println!("{} {}: {}", marker, result.action, result.message);
        }

        loop {
            let line = self
                .input
                .next_line()
                .await
                .map_err(|e| format!("Failed to read proposal: {}", e))?;
            let line = match line {
                Some(line) => line,
                None => return Ok(None),
            };
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<Value>(&line) {
                Ok(value) => return Ok(Some(value)),
                Err(e) => {
                    warn!(%e, "discarding malformed proposal line");
                    println!("[failed] proposal: not valid JSON ({})", e);
                }
            }
        }
    }

    async fn notify_skipped(&mut self, action: &Action) -> Result<(), String> {
        println!("Skipped: {}", action.summary());
        Ok(())
    }
}
