//! # Domain Traits
//!
//! Abstract interfaces for the collaborators around the action core
//! (conversation source, approval surface, web access, analysis).
//! Allows for pluggable implementations in the Infrastructure layer.

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::action::{Action, ApprovalDecision};
use crate::domain::errors::ValidationError;
use crate::domain::result::ActionResult;

/// Abstract interface for the conversation side of the session:
/// where proposals come from and where results are reported.
#[async_trait]
pub trait ConversationBridge: Send {
    /// Fetch the next raw proposal object, feeding back the result of the
    /// previous turn. `None` ends the session.
    async fn next_proposal(
        &mut self,
        last: Option<&ActionResult>,
    ) -> Result<Option<Value>, String>;

    /// Report that an action was rejected and will not run.
    async fn notify_skipped(&mut self, action: &Action) -> Result<(), String>;
}

/// Abstract interface for the approval surface (e.g. a terminal prompt).
#[async_trait]
pub trait ApprovalPrompt: Send {
    /// Present one proposed action and collect the user's ruling.
    async fn decide(&mut self, action: &Action) -> Result<ApprovalDecision, String>;

    /// An edit produced an invalid action; collect a corrected replacement.
    /// `None` cancels the edit.
    async fn collect_edit(
        &mut self,
        action: &Action,
        error: &ValidationError,
    ) -> Result<Option<String>, String>;
}

/// Abstract interface for outbound web access (browse_url, search_web).
#[async_trait]
pub trait WebGateway: Send + Sync {
    /// Fetch a URL and return a one-line outcome summary.
    async fn open_url(&self, url: &str) -> Result<String, String>;

    /// Run a web search for the query and return a one-line outcome summary.
    async fn search(&self, query: &str) -> Result<String, String>;
}

/// Abstract interface for source analysis (analyze_code).
#[async_trait]
pub trait CodeAnalyst: Send + Sync {
    /// Produce an analysis of the file content.
    async fn analyze(&self, path: &str, content: &str) -> Result<String, String>;
}
