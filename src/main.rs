//! # Main Entry Point
//!
//! Wires the layered architecture together:
//! - Domain: actions, results, errors, collaborator traits
//! - Application: validation, approval gate, loop guard, session loop
//! - Infrastructure: path resolver, executor, web gateway, terminal
//!
//! Proposals are read as JSON lines on stdin; every action is gated behind
//! an interactive approval prompt before it runs.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use foreman::application::loop_guard::LoopGuard;
use foreman::application::session::{Session, SessionEnd};
use foreman::config::AppConfig;
use foreman::infrastructure::paths::PathResolver;
use foreman::infrastructure::terminal::{StdinBridge, TerminalPrompt};
use foreman::infrastructure::tools::executor::ActionExecutor;
use foreman::infrastructure::web::HttpGateway;

#[derive(Debug, Parser)]
#[command(name = "foreman", about = "Approval-gated action runner for coding sessions")]
struct Cli {
    /// Project root all actions are confined to. Overrides the config file.
    #[arg(long)]
    project_root: Option<PathBuf>,

    /// Explicit config file (YAML). Defaults to the platform config dir.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Where to write the session history as JSON lines.
    #[arg(long)]
    history: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1. Load Configuration
    let config = AppConfig::load(cli.config.as_deref())?;

    // 2. Logging Setup
    let log_dir = PathBuf::from(&config.logging.dir);
    if !log_dir.exists() {
        std::fs::create_dir_all(&log_dir).context("Failed to create log directory")?;
    }

    // Clear previous session log
    let log_path = log_dir.join(&config.logging.file);
    if log_path.exists() {
        let _ = std::fs::remove_file(&log_path);
    }

    let file_appender = tracing_appender::rolling::never(&config.logging.dir, &config.logging.file);
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,hyper=warn,reqwest=warn"));

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false);
    let console_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .init();

    tracing::info!("Starting Foreman...");

    // 3. Initialize Infrastructure
    let root = cli
        .project_root
        .or_else(|| config.session.project_root.as_ref().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("."));
    let resolver = PathResolver::new(&root)
        .with_context(|| format!("Invalid project root {}", root.display()))?;
    tracing::info!(root = %resolver.root().display(), "project root resolved");

    let web = Arc::new(HttpGateway::new()?);
    let executor = ActionExecutor::new(resolver).with_web(web);
    let guard = LoopGuard::new(&config.guard);

    // 4. Run the Session
    let mut session = Session::new(executor, guard);
    let mut bridge = StdinBridge::new();
    let mut prompt = TerminalPrompt::new();

    let end = session.run(&mut bridge, &mut prompt).await?;
    match end {
        SessionEnd::Finished => tracing::info!("session finished cleanly"),
        SessionEnd::LoopDetected(detected) => {
            tracing::warn!("session halted: {}", detected);
            println!("{}", detected);
        }
    }

    // 5. Persist History
    let history_path = cli
        .history
        .unwrap_or_else(|| log_dir.join("history.jsonl"));
    session.state().dump(&history_path)?;
    tracing::info!(path = %history_path.display(), "session history written");

    Ok(())
}
