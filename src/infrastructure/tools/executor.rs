//! # Action Executor
//!
//! One handler per action type. Execution is total: every failure inside a
//! handler is converted into a failed `ActionResult`, so the session loop
//! never sees a per-action fault. Commands run with no hard timeout; a
//! hanging child hangs the turn until the user kills it.

use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;
use tracing::{debug, info};

use crate::domain::action::Action;
use crate::domain::errors::ExecutionError;
use crate::domain::result::{ActionResult, Payload};
use crate::domain::traits::{CodeAnalyst, WebGateway};
use crate::infrastructure::paths::PathResolver;
use crate::infrastructure::tools::walker;

/// explore_codebase never reports more than this many files.
const EXPLORE_LIMIT: usize = 15;

/// Executes approved actions against the project root.
pub struct ActionExecutor {
    resolver: PathResolver,
    web: Option<Arc<dyn WebGateway>>,
    analyst: Option<Arc<dyn CodeAnalyst>>,
}

impl ActionExecutor {
    pub fn new(resolver: PathResolver) -> Self {
        Self {
            resolver,
            web: None,
            analyst: None,
        }
    }

    pub fn with_web(mut self, web: Arc<dyn WebGateway>) -> Self {
        self.web = Some(web);
        self
    }

    pub fn with_analyst(mut self, analyst: Arc<dyn CodeAnalyst>) -> Self {
        self.analyst = Some(analyst);
        self
    }

    /// Run one approved action. Never returns an error; failures come back
    /// as a failed result with `error` set.
    pub async fn execute(&self, action: &Action) -> ActionResult {
        debug!(action = %action.summary(), "executing");
        let outcome = match action {
            Action::CreateFile { path, content } => self.create_file(path, content).await,
            Action::ReadFile { path } => self.read_file(path).await,
            Action::EditFile { path, content } => {
                // the validator guarantees content is present
                let content = content.as_deref().unwrap_or_default();
                self.edit_file(path, content).await
            }
            Action::RunCommand { command } => self.run_command(command).await,
            Action::BrowseUrl { url } => self.browse_url(url).await,
            Action::SearchWeb { query } => self.search_web(query).await,
            Action::AnalyzeCode { path } => self.analyze_code(path).await,
            Action::ListDirectory { path, max_depth } => self.list_directory(path, *max_depth),
            Action::FindFiles { path, pattern } => self.find_files(path, pattern),
            Action::SearchCode { path, pattern } => self.search_code(path, pattern),
            Action::ExploreCodebase { query } => self.explore_codebase(query),
        };

        match outcome {
            Ok(result) => result,
            Err(e) => ActionResult::fail(action.name(), e.to_string()),
        }
    }

    async fn create_file(&self, path: &str, content: &str) -> Result<ActionResult, ExecutionError> {
        let target = self.resolver.resolve(path)?;
        if let Some(parent) = target.parent() {
            if !parent.exists() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        tokio::fs::write(&target, content).await?;
        info!(path, "file created");
        Ok(ActionResult::ok(
            "create_file",
            format!("File created: {}", path),
            Payload::None,
        ))
    }

    async fn read_file(&self, path: &str) -> Result<ActionResult, ExecutionError> {
        let target = self.resolver.resolve(path)?;
        if !target.exists() {
            return Ok(ActionResult::fail(
                "read_file",
                format!("File not found: {}", path),
            ));
        }
        let content = tokio::fs::read_to_string(&target).await?;
        Ok(ActionResult::ok(
            "read_file",
            format!("Read file: {}", path),
            Payload::Content { content },
        ))
    }

    async fn edit_file(&self, path: &str, content: &str) -> Result<ActionResult, ExecutionError> {
        let target = self.resolver.resolve(path)?;
        if !target.exists() {
            return Ok(ActionResult::fail(
                "edit_file",
                format!("File not found: {}", path),
            ));
        }
        tokio::fs::write(&target, content).await?;
        info!(path, "file edited");
        Ok(ActionResult::ok(
            "edit_file",
            format!("File edited: {}", path),
            Payload::None,
        ))
    }

    /// The command string runs verbatim under `sh -c` with the project root
    /// as working directory. A nonzero exit is an unsuccessful result, not
    /// an error; the captured output is still returned.
    async fn run_command(&self, command: &str) -> Result<ActionResult, ExecutionError> {
        let mut cmd = tokio::process::Command::new("sh");
        cmd.args(["-c", command]);
        cmd.current_dir(self.resolver.root());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        let child = cmd.spawn()?;
        let output = child.wait_with_output().await?;

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        let exit_code = output.status.code();

        // the message echoes the executed (possibly edited) command string
        let mut message = format!("$ {}", command);
        if !stdout.is_empty() {
            message.push('\n');
            message.push_str(&stdout);
        }
        if !stderr.is_empty() {
            message.push_str("\n--- STDERR ---\n");
            message.push_str(&stderr);
        }
        if !output.status.success() {
            message.push('\n');
            message.push_str(&format!(
                "[Exit Code: {}]",
                exit_code.map_or_else(|| "signal".to_string(), |c| c.to_string())
            ));
        }

        info!(command, ?exit_code, "command finished");
        Ok(ActionResult {
            success: output.status.success(),
            action: "run_command".to_string(),
            message,
            error: None,
            payload: Payload::Command {
                command: command.to_string(),
                exit_code,
                stdout,
                stderr,
            },
        })
    }

    async fn browse_url(&self, url: &str) -> Result<ActionResult, ExecutionError> {
        let web = self
            .web
            .as_ref()
            .ok_or_else(|| ExecutionError::External("Web access is not configured".to_string()))?;
        let url = if url.contains("://") {
            url.to_string()
        } else {
            format!("https://{}", url)
        };
        web.open_url(&url).await.map_err(ExecutionError::External)?;
        Ok(ActionResult::ok(
            "browse_url",
            format!("Opened URL: {}", url),
            Payload::Url { url },
        ))
    }

    async fn search_web(&self, query: &str) -> Result<ActionResult, ExecutionError> {
        let web = self
            .web
            .as_ref()
            .ok_or_else(|| ExecutionError::External("Web access is not configured".to_string()))?;
        web.search(query).await.map_err(ExecutionError::External)?;
        Ok(ActionResult::ok(
            "search_web",
            format!("Searched for: {}", query),
            Payload::Query {
                query: query.to_string(),
            },
        ))
    }

    async fn analyze_code(&self, path: &str) -> Result<ActionResult, ExecutionError> {
        let analyst = self.analyst.as_ref().ok_or_else(|| {
            ExecutionError::External("Code analysis is not configured".to_string())
        })?;
        let target = self.resolver.resolve(path)?;
        if !target.exists() {
            return Ok(ActionResult::fail(
                "analyze_code",
                format!("File not found: {}", path),
            ));
        }
        let content = tokio::fs::read_to_string(&target).await?;
        let analysis = analyst
            .analyze(path, &content)
            .await
            .map_err(ExecutionError::External)?;
        Ok(ActionResult::ok(
            "analyze_code",
            format!("Code analysis for {}", path),
            Payload::Analysis { analysis },
        ))
    }

    fn list_directory(&self, path: &str, max_depth: usize) -> Result<ActionResult, ExecutionError> {
        let target = self.resolver.resolve(path)?;
        if !target.is_dir() {
            return Ok(ActionResult::fail(
                "list_directory",
                format!("Directory not found: {}", path),
            ));
        }
        let structure = walker::directory_tree(&target, max_depth)?;
        Ok(ActionResult::ok(
            "list_directory",
            format!("Listed directory: {}", path),
            Payload::Tree { structure },
        ))
    }

    fn find_files(&self, path: &str, pattern: &str) -> Result<ActionResult, ExecutionError> {
        let target = self.resolver.resolve(path)?;
        if !target.is_dir() {
            return Ok(ActionResult::fail(
                "find_files",
                format!("Directory not found: {}", path),
            ));
        }
        let files = walker::find_files(&target, pattern)?;
        Ok(ActionResult::ok(
            "find_files",
            format!("Found {} files matching '{}' in {}", files.len(), pattern, path),
            Payload::Files { files },
        ))
    }

    fn search_code(&self, path: &str, pattern: &str) -> Result<ActionResult, ExecutionError> {
        let target = self.resolver.resolve(path)?;
        if !target.is_dir() {
            return Ok(ActionResult::fail(
                "search_code",
                format!("Directory not found: {}", path),
            ));
        }
        let results = walker::search_code(&target, pattern)?;
        Ok(ActionResult::ok(
            "search_code",
            format!(
                "Found matches in {} files for pattern '{}'",
                results.len(),
                pattern
            ),
            Payload::Matches { results },
        ))
    }

    fn explore_codebase(&self, query: &str) -> Result<ActionResult, ExecutionError> {
        let exploration = walker::explore(self.resolver.root(), query, EXPLORE_LIMIT)?;
        Ok(ActionResult::ok(
            "explore_codebase",
            format!("Explored codebase with {} relevant files", exploration.files.len()),
            Payload::Exploration {
                files: exploration.files,
                files_found: exploration.files_found,
                structure: exploration.structure,
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::result::NodeKind;

    fn executor(dir: &tempfile::TempDir) -> ActionExecutor {
        ActionExecutor::new(PathResolver::new(dir.path()).unwrap())
    }

    #[tokio::test]
    async fn create_then_read_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let executor = executor(&dir);

        let created = executor
            .execute(&Action::CreateFile {
                path: "notes/todo.md".into(),
                content: "remember".into(),
            })
            .await;
        assert!(created.success);
        assert_eq!(created.message, "File created: notes/todo.md");

        let read = executor
            .execute(&Action::ReadFile {
                path: "notes/todo.md".into(),
            })
            .await;
        assert!(read.success);
        assert_eq!(
            read.payload,
            Payload::Content {
                content: "remember".into()
            }
        );
    }

    #[tokio::test]
    async fn reading_a_missing_file_fails_as_data() {
        let dir = tempfile::tempdir().unwrap();
        let executor = executor(&dir);
        let result = executor
            .execute(&Action::ReadFile {
                path: "missing.txt".into(),
            })
            .await;
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("File not found: missing.txt"));
    }

    #[tokio::test]
    async fn path_escape_fails_as_data() {
        let dir = tempfile::tempdir().unwrap();
        let executor = executor(&dir);
        let result = executor
            .execute(&Action::ReadFile {
                path: "../outside.txt".into(),
            })
            .await;
        assert!(!result.success);
        assert_eq!(
            result.error.as_deref(),
            Some("Path '../outside.txt' escapes the project root")
        );
    }

    #[tokio::test]
    async fn edit_requires_an_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let executor = executor(&dir);
        let result = executor
            .execute(&Action::EditFile {
                path: "ghost.rs".into(),
                content: Some("fn main() {}".into()),
            })
            .await;
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("File not found: ghost.rs"));
    }

    #[tokio::test]
    async fn command_output_is_captured() {
        let dir = tempfile::tempdir().unwrap();
        let executor = executor(&dir);
        let result = executor
            .execute(&Action::RunCommand {
                command: "echo hello".into(),
            })
            .await;
        assert!(result.success);
        assert!(result.message.starts_with("$ echo hello"));
        match &result.payload {
            Payload::Command {
                exit_code, stdout, ..
            } => {
                assert_eq!(*exit_code, Some(0));
                assert_eq!(stdout, "hello\n");
            }
            other => panic!("unexpected payload: {:?}", other),
        }
    }

    #[tokio::test]
    async fn failing_command_keeps_its_output() {
        let dir = tempfile::tempdir().unwrap();
        let executor = executor(&dir);
        let result = executor
            .execute(&Action::RunCommand {
                command: "echo oops >&2; exit 3".into(),
            })
            .await;
        assert!(!result.success);
        assert!(result.error.is_none());
        assert!(result.message.contains("oops"));
        assert!(result.message.contains("[Exit Code: 3]"));
        match &result.payload {
            Payload::Command {
                exit_code, stderr, ..
            } => {
                assert_eq!(*exit_code, Some(3));
                assert_eq!(stderr, "oops\n");
            }
            other => panic!("unexpected payload: {:?}", other),
        }
    }

    #[tokio::test]
    async fn command_runs_in_the_project_root() {
        let dir = tempfile::tempdir().unwrap();
        let executor = executor(&dir);
        let result = executor
            .execute(&Action::RunCommand {
                command: "touch made_here.txt".into(),
            })
            .await;
        assert!(result.success);
        assert!(dir.path().join("made_here.txt").exists());
    }

    #[tokio::test]
    async fn list_directory_returns_a_tree() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("src")).unwrap();
        std::fs::write(dir.path().join("src/lib.rs"), "").unwrap();
        let executor = executor(&dir);
        let result = executor
            .execute(&Action::ListDirectory {
                path: ".".into(),
                max_depth: 2,
            })
            .await;
        assert!(result.success);
        match &result.payload {
            Payload::Tree { structure } => {
                assert_eq!(structure.kind, NodeKind::Directory);
                assert_eq!(structure.children[0].name, "src");
                assert_eq!(structure.children[0].children[0].name, "lib.rs");
            }
            other => panic!("unexpected payload: {:?}", other),
        }
    }

    #[tokio::test]
    async fn find_files_in_a_missing_directory_fails_as_data() {
        let dir = tempfile::tempdir().unwrap();
        let executor = executor(&dir);
        let result = executor
            .execute(&Action::FindFiles {
                path: "no_such_dir".into(),
                pattern: "*.rs".into(),
            })
            .await;
        assert!(!result.success);
        assert_eq!(
            result.error.as_deref(),
            Some("Directory not found: no_such_dir")
        );
    }

    #[tokio::test]
    async fn empty_search_is_a_success() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("lib.rs"), "fn lib() {}\n").unwrap();
        let executor = executor(&dir);
        let result = executor
            .execute(&Action::SearchCode {
                path: ".".into(),
                pattern: "nothing_matches_this".into(),
            })
            .await;
        assert!(result.success);
        assert_eq!(
            result.message,
            "Found matches in 0 files for pattern 'nothing_matches_this'"
        );
        assert_eq!(result.payload, Payload::Matches { results: vec![] });
    }

    #[tokio::test]
    async fn web_actions_without_a_gateway_fail_as_data() {
        let dir = tempfile::tempdir().unwrap();
        let executor = executor(&dir);
        let result = executor
            .execute(&Action::BrowseUrl {
                url: "example.com".into(),
            })
            .await;
        assert!(!result.success);
        assert_eq!(
            result.error.as_deref(),
            Some("Web access is not configured")
        );
    }
}
