/*!
 * nlshell - interactive shell with natural-language command translation.
 *
 * Wires the real capabilities (local filesystem, sysinfo metrics) into the
 * session loop and runs it over stdin/stdout. With --json, each command
 * result is emitted as one JSON object per line for automation pipelines.
 */

use anyhow::{Context, Result};
use clap::Parser;
use nlshell::config::Config;
use nlshell::dispatcher::Dispatcher;
use nlshell::fs_cap::LocalFileSystem;
use nlshell::history::{History, HistoryStore};
use nlshell::metrics::SystemMetrics;
use nlshell::patterns::RuleSet;
use nlshell::session::{Session, SessionOptions};
use nlshell::translator::Translator;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "nlshell", version)]
#[command(about = "Interactive shell with natural-language command translation", long_about = None)]
struct Cli {
    /// Config file (YAML). Missing file means defaults.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// History file location (overrides config and the default
    /// ~/.nlshell_history)
    #[arg(long)]
    history_file: Option<PathBuf>,

    /// Emit results as JSON lines instead of plain text
    #[arg(short, long)]
    json: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

async fn run(cli: Cli) -> Result<i32> {
    let home = home_dir();
    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::load(&home.join(".nlshell.yaml"))?,
    };

    let history_path = cli
        .history_file
        .clone()
        .unwrap_or_else(|| config.history_path(&home));
    let store = HistoryStore::new(history_path);

    let mut history = History::new(config.history_limit);
    for line in store.load().await? {
        history.record(&line);
    }

    let cwd = std::env::current_dir().context("failed to resolve working directory")?;
    let interrupt = Arc::new(AtomicBool::new(false));
    let dispatcher = Dispatcher::new(
        Box::new(LocalFileSystem::new()),
        Box::new(SystemMetrics::new()),
        cwd,
        home,
        interrupt.clone(),
    );
    let translator = Translator::new(RuleSet::builtin()?, config.max_suggestions);

    let user = std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string());
    let host = SystemMetrics::host_name().unwrap_or_else(|| "localhost".to_string());

    let mut session = Session::new(
        dispatcher,
        translator,
        history,
        store,
        interrupt,
        user,
        host,
        SessionOptions {
            json_output: cli.json,
        },
    );
    session.run().await
}

fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("/"))
}
