//! # Action Validation
//!
//! Required-field checks that run before any action is shown for approval.
//! Parsing already defaulted missing fields to empty strings; here an empty
//! required field becomes an explicit validation failure.

use crate::domain::action::Action;
use crate::domain::errors::ValidationError;

/// Stateless per-variant validator. Checks presence only; path containment
/// and filesystem state are the executor's concern.
pub struct ActionValidator;

impl ActionValidator {
    /// Check one action for completeness. `Ok` means the action may be
    /// proposed to the user; `Err` names the first missing field.
    pub fn validate(action: &Action) -> Result<(), ValidationError> {
        match action {
            Action::CreateFile { path, .. } => Self::require("file path", path),
            Action::ReadFile { path } => Self::require("file path", path),
            Action::EditFile { path, content } => {
                Self::require("file path", path)?;
                match content {
                    Some(text) if !text.is_empty() => Ok(()),
                    _ => Err(ValidationError::MissingField("content or changes")),
                }
            }
            Action::RunCommand { command } => Self::require("command", command),
            Action::BrowseUrl { url } => Self::require("URL", url),
            Action::SearchWeb { query } => Self::require("search query", query),
            Action::AnalyzeCode { path } => Self::require("file path", path),
            // path defaults to "." at parse time, so these are always complete
            Action::ListDirectory { .. } | Action::FindFiles { .. } => Ok(()),
            Action::SearchCode { pattern, .. } => Self::require("search pattern", pattern),
            Action::ExploreCodebase { query } => Self::require("query", query),
        }
    }

    fn require(field: &'static str, value: &str) -> Result<(), ValidationError> {
        if value.is_empty() {
            Err(ValidationError::MissingField(field))
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_command_is_rejected() {
        let action = Action::RunCommand {
            command: String::new(),
        };
        let err = ActionValidator::validate(&action).unwrap_err();
        assert_eq!(err.to_string(), "No command provided");
    }

    #[test]
    fn empty_search_pattern_is_rejected() {
        let action = Action::SearchCode {
            path: ".".into(),
            pattern: String::new(),
        };
        let err = ActionValidator::validate(&action).unwrap_err();
        assert_eq!(err.to_string(), "No search pattern provided");
    }

    #[test]
    fn edit_without_content_is_rejected() {
        let action = Action::EditFile {
            path: "src/lib.rs".into(),
            content: None,
        };
        let err = ActionValidator::validate(&action).unwrap_err();
        assert_eq!(err.to_string(), "No content or changes provided");
    }

    #[test]
    fn defaulted_listing_actions_are_complete() {
        assert!(ActionValidator::validate(&Action::ListDirectory {
            path: ".".into(),
            max_depth: 2,
        })
        .is_ok());
        assert!(ActionValidator::validate(&Action::FindFiles {
            path: ".".into(),
            pattern: "*".into(),
        })
        .is_ok());
    }

    #[test]
    fn every_required_field_has_a_message() {
        let cases: Vec<(Action, &str)> = vec![
            (
                Action::CreateFile {
                    path: String::new(),
                    content: String::new(),
                },
                "No file path provided",
            ),
            (
                Action::BrowseUrl { url: String::new() },
                "No URL provided",
            ),
            (
                Action::SearchWeb {
                    query: String::new(),
                },
                "No search query provided",
            ),
            (
                Action::ExploreCodebase {
                    query: String::new(),
                },
                "No query provided",
            ),
        ];
        for (action, message) in cases {
            let err = ActionValidator::validate(&action).unwrap_err();
            assert_eq!(err.to_string(), message);
        }
    }
}
