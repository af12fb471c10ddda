//! # Configuration
//!
//! Explicit configuration for the session core. Loaded from a YAML file
//! when one exists, otherwise every field falls back to its default.
//! Nothing here is global; the loaded struct is passed down at wiring time.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main application configuration structure.
/// Matches the layout of `config.yaml`.
#[derive(Debug, Default, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub guard: GuardConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Session-level settings.
#[derive(Debug, Default, Deserialize, Clone)]
pub struct SessionConfig {
    /// Root directory all file actions are confined to. The CLI argument
    /// wins when both are given.
    #[serde(default)]
    pub project_root: Option<String>,
}

/// Knobs for the repetition guard.
#[derive(Debug, Deserialize, Clone)]
pub struct GuardConfig {
    /// Window of recent proposals considered for loop detection.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
    /// Similarity at or above which two proposals count as near-duplicates.
    #[serde(default = "default_pattern_threshold")]
    pub pattern_threshold: f64,
    /// Cap on stored result text, in characters.
    #[serde(default = "default_max_response_size")]
    pub max_response_size: usize,
}

/// Where session logs go.
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_dir")]
    pub dir: String,
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_max_iterations() -> usize {
    5
}

fn default_pattern_threshold() -> f64 {
    0.8
}

fn default_max_response_size() -> usize {
    10000
}

fn default_log_dir() -> String {
    "data".to_string()
}

fn default_log_file() -> String {
    "session.log".to_string()
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            pattern_threshold: default_pattern_threshold(),
            max_response_size: default_max_response_size(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: default_log_dir(),
            file: default_log_file(),
        }
    }
}

impl AppConfig {
    /// Load configuration. An explicit path must exist and parse; the
    /// well-known path is optional and silently skipped when absent.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            let config: AppConfig = serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse config file {}", path.display()))?;
            return Ok(config);
        }

        if let Some(path) = Self::default_path() {
            if path.exists() {
                let content = std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read config file {}", path.display()))?;
                let config: AppConfig = serde_yaml::from_str(&content)
                    .with_context(|| format!("Failed to parse config file {}", path.display()))?;
                return Ok(config);
            }
        }

        Ok(AppConfig::default())
    }

    fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("foreman").join("config.yaml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_sections_are_missing() {
        let config: AppConfig = serde_yaml::from_str("session:\n  project_root: /tmp/work\n")
            .expect("minimal config should parse");
        assert_eq!(config.session.project_root.as_deref(), Some("/tmp/work"));
        assert_eq!(config.guard.max_iterations, 5);
        assert_eq!(config.guard.pattern_threshold, 0.8);
        assert_eq!(config.guard.max_response_size, 10000);
        assert_eq!(config.logging.dir, "data");
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let err = AppConfig::load(Some(Path::new("/nonexistent/config.yaml"))).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn guard_knobs_override() {
        let config: AppConfig =
            serde_yaml::from_str("guard:\n  max_iterations: 8\n  pattern_threshold: 0.9\n")
                .expect("guard override should parse");
        assert_eq!(config.guard.max_iterations, 8);
        assert_eq!(config.guard.pattern_threshold, 0.9);
        assert_eq!(config.guard.max_response_size, 10000);
    }
}
