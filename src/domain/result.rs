//! # Action Results
//!
//! Structured outcome of executing an action. Exactly one of the payload
//! or `error` is populated; callers above the executor only branch on
//! `success` and never catch faults.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Outcome of one execution attempt.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActionResult {
    pub success: bool,
    /// Echo of the action type name.
    pub action: String,
    /// Human-readable summary for the approval surface and the bridge.
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Payload::is_none")]
    pub payload: Payload,
}

impl ActionResult {
    pub fn ok(action: &str, message: impl Into<String>, payload: Payload) -> Self {
        Self {
            success: true,
            action: action.to_string(),
            message: message.into(),
            error: None,
            payload,
        }
    }

    pub fn fail(action: &str, error: impl Into<String>) -> Self {
        let error = error.into();
        Self {
            success: false,
            action: action.to_string(),
            message: error.clone(),
            error: Some(error),
            payload: Payload::None,
        }
    }
}

/// Type-specific result data.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum Payload {
    #[default]
    None,
    /// read_file
    Content { content: String },
    /// run_command
    Command {
        command: String,
        exit_code: Option<i32>,
        stdout: String,
        stderr: String,
    },
    /// list_directory
    Tree { structure: DirNode },
    /// find_files: paths relative to the project root, traversal order
    Files { files: Vec<String> },
    /// search_code
    Matches { results: Vec<FileMatches> },
    /// explore_codebase
    Exploration {
        files: Vec<String>,
        files_found: usize,
        structure: BTreeMap<String, DirSummary>,
    },
    /// browse_url
    Url { url: String },
    /// search_web
    Query { query: String },
    /// analyze_code
    Analysis { analysis: String },
}

impl Payload {
    pub fn is_none(&self) -> bool {
        matches!(self, Payload::None)
    }
}

/// One node of a bounded-depth directory walk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DirNode {
    pub name: String,
    pub path: String,
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<DirNode>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    File,
    Directory,
}

/// All matches for a pattern within one file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FileMatches {
    /// Path relative to the searched root.
    pub file: String,
    pub matches: Vec<MatchLine>,
}

/// One matching line with surrounding context.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchLine {
    pub line_number: usize,
    pub line: String,
    /// Up to two lines before and after the match.
    pub context: Vec<String>,
}

/// Per-directory file-type census used by explore_codebase.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DirSummary {
    pub file_count: usize,
    pub file_types: BTreeMap<String, usize>,
}
