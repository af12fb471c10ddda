//! # Actions
//!
//! Typed proposals emitted by the model. The action set is closed: adding a
//! new kind of action is a compile-time change, not a runtime string match.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::errors::ValidationError;

fn default_path() -> String {
    ".".to_string()
}

fn default_pattern() -> String {
    "*".to_string()
}

fn default_depth() -> usize {
    2
}

/// A structured proposal for one side-effecting operation.
///
/// All parameters are defaulted at the deserialization layer so a proposal
/// with missing fields still parses; emptiness is the validator's concern.
/// Immutable once validated. A user edit produces a new `Action` via
/// [`Action::apply_edit`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    CreateFile {
        #[serde(default)]
        path: String,
        #[serde(default)]
        content: String,
    },
    ReadFile {
        #[serde(default)]
        path: String,
    },
    EditFile {
        #[serde(default)]
        path: String,
        #[serde(default)]
        content: Option<String>,
    },
    RunCommand {
        #[serde(default)]
        command: String,
    },
    BrowseUrl {
        #[serde(default)]
        url: String,
    },
    SearchWeb {
        #[serde(default)]
        query: String,
    },
    AnalyzeCode {
        #[serde(default)]
        path: String,
    },
    ListDirectory {
        #[serde(default = "default_path")]
        path: String,
        #[serde(default = "default_depth")]
        max_depth: usize,
    },
    FindFiles {
        #[serde(default = "default_path")]
        path: String,
        #[serde(default = "default_pattern")]
        pattern: String,
    },
    SearchCode {
        #[serde(default = "default_path")]
        path: String,
        #[serde(default)]
        pattern: String,
    },
    ExploreCodebase {
        #[serde(default)]
        query: String,
    },
}

impl Action {
    /// Parse a raw proposal object. Unknown `type` values are reported as
    /// a validation failure, never a panic.
    pub fn from_proposal(value: &Value) -> Result<Action, ValidationError> {
        match serde_json::from_value::<Action>(value.clone()) {
            Ok(action) => Ok(action),
            Err(_) => {
                let kind = value
                    .get("type")
                    .and_then(|t| t.as_str())
                    .unwrap_or("(none)")
                    .to_string();
                Err(ValidationError::UnknownType(kind))
            }
        }
    }

    /// Wire name of the action type.
    pub fn name(&self) -> &'static str {
        match self {
            Action::CreateFile { .. } => "create_file",
            Action::ReadFile { .. } => "read_file",
            Action::EditFile { .. } => "edit_file",
            Action::RunCommand { .. } => "run_command",
            Action::BrowseUrl { .. } => "browse_url",
            Action::SearchWeb { .. } => "search_web",
            Action::AnalyzeCode { .. } => "analyze_code",
            Action::ListDirectory { .. } => "list_directory",
            Action::FindFiles { .. } => "find_files",
            Action::SearchCode { .. } => "search_code",
            Action::ExploreCodebase { .. } => "explore_codebase",
        }
    }

    /// Canonical serialization used for fingerprinting. serde_json's default
    /// map keeps keys sorted, so identical parameter sets always serialize
    /// identically.
    pub fn fingerprint(&self) -> String {
        match serde_json::to_value(self) {
            Ok(value) => value.to_string(),
            Err(_) => format!("{:?}", self),
        }
    }

    /// The user-editable text field of this action.
    pub fn editable_text(&self) -> &str {
        match self {
            Action::RunCommand { command } => command,
            Action::BrowseUrl { url } => url,
            Action::SearchWeb { query } | Action::ExploreCodebase { query } => query,
            Action::FindFiles { pattern, .. } | Action::SearchCode { pattern, .. } => pattern,
            Action::CreateFile { path, .. }
            | Action::ReadFile { path }
            | Action::EditFile { path, .. }
            | Action::AnalyzeCode { path }
            | Action::ListDirectory { path, .. } => path,
        }
    }

    /// Produce a new action with the editable text field replaced.
    /// For `run_command` this is the command string; other actions expose
    /// their primary text parameter the same way.
    pub fn apply_edit(&self, replacement: &str) -> Action {
        let replacement = replacement.to_string();
        match self.clone() {
            Action::RunCommand { .. } => Action::RunCommand {
                command: replacement,
            },
            Action::BrowseUrl { .. } => Action::BrowseUrl { url: replacement },
            Action::SearchWeb { .. } => Action::SearchWeb { query: replacement },
            Action::ExploreCodebase { .. } => Action::ExploreCodebase { query: replacement },
            Action::FindFiles { path, .. } => Action::FindFiles {
                path,
                pattern: replacement,
            },
            Action::SearchCode { path, .. } => Action::SearchCode {
                path,
                pattern: replacement,
            },
            Action::CreateFile { content, .. } => Action::CreateFile {
                path: replacement,
                content,
            },
            Action::ReadFile { .. } => Action::ReadFile { path: replacement },
            Action::EditFile { content, .. } => Action::EditFile {
                path: replacement,
                content,
            },
            Action::AnalyzeCode { .. } => Action::AnalyzeCode { path: replacement },
            Action::ListDirectory { max_depth, .. } => Action::ListDirectory {
                path: replacement,
                max_depth,
            },
        }
    }

    /// One-line summary for the approval surface and logs.
    pub fn summary(&self) -> String {
        match self {
            Action::CreateFile { path, .. } => format!("create_file `{}`", path),
            Action::ReadFile { path } => format!("read_file `{}`", path),
            Action::EditFile { path, .. } => format!("edit_file `{}`", path),
            Action::RunCommand { command } => format!("run_command `{}`", command),
            Action::BrowseUrl { url } => format!("browse_url `{}`", url),
            Action::SearchWeb { query } => format!("search_web `{}`", query),
            Action::AnalyzeCode { path } => format!("analyze_code `{}`", path),
            Action::ListDirectory { path, max_depth } => {
                format!("list_directory `{}` (depth {})", path, max_depth)
            }
            Action::FindFiles { path, pattern } => {
                format!("find_files `{}` in `{}`", pattern, path)
            }
            Action::SearchCode { path, pattern } => {
                format!("search_code `{}` in `{}`", pattern, path)
            }
            Action::ExploreCodebase { query } => format!("explore_codebase `{}`", query),
        }
    }
}

/// The user's ruling on a proposed action.
/// An edit carries the replacement text for the action's editable field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum ApprovalDecision {
    Accept,
    Reject,
    Edit { replacement: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_known_proposal() {
        let value = json!({"type": "run_command", "command": "ls -la"});
        let action = Action::from_proposal(&value).unwrap();
        assert_eq!(
            action,
            Action::RunCommand {
                command: "ls -la".into()
            }
        );
        assert_eq!(action.name(), "run_command");
    }

    #[test]
    fn unknown_type_is_a_validation_error() {
        let value = json!({"type": "format_disk"});
        let err = Action::from_proposal(&value).unwrap_err();
        assert_eq!(err, ValidationError::UnknownType("format_disk".into()));
    }

    #[test]
    fn missing_fields_default_to_empty() {
        let value = json!({"type": "search_code"});
        let action = Action::from_proposal(&value).unwrap();
        assert_eq!(
            action,
            Action::SearchCode {
                path: ".".into(),
                pattern: String::new()
            }
        );
    }

    #[test]
    fn find_files_defaults_to_star() {
        let value = json!({"type": "find_files"});
        let action = Action::from_proposal(&value).unwrap();
        assert_eq!(
            action,
            Action::FindFiles {
                path: ".".into(),
                pattern: "*".into()
            }
        );
    }

    #[test]
    fn edit_replaces_the_command_verbatim() {
        let action = Action::RunCommand {
            command: "ls".into(),
        };
        let edited = action.apply_edit("ls -la");
        assert_eq!(
            edited,
            Action::RunCommand {
                command: "ls -la".into()
            }
        );
        // the original is untouched
        assert_eq!(action.editable_text(), "ls");
    }

    #[test]
    fn fingerprints_are_stable_for_identical_parameters() {
        let a = Action::RunCommand {
            command: "cargo test".into(),
        };
        let b = Action::RunCommand {
            command: "cargo test".into(),
        };
        assert_eq!(a.fingerprint(), b.fingerprint());
    }
}
