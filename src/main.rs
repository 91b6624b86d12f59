use anyhow::{Context, Result};
use clap::Parser;
use std::io::{IsTerminal, Read};
use std::path::Path;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use truelens::api::ApiClient;
use truelens::app::App;
use truelens::cli::{self, Cli, Command};
use truelens::config::{self, Config, API_BASE_URL_ENV};
use truelens::keybindings::KeybindingRegistry;
use truelens::session::{AnalysisSession, SessionEvent, Surface};
use truelens::ui;

/// Capacity of the session event channel.
const EVENT_CHANNEL_CAPACITY: usize = 32;

/// Route logs to a file while the TUI owns the terminal, stderr otherwise.
fn init_tracing(interactive: bool, config_dir: Option<&Path>) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if interactive {
        if let Some(dir) = config_dir {
            let log_file = std::fs::create_dir_all(dir).and_then(|_| {
                std::fs::OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(dir.join("truelens.log"))
            });
            if let Ok(file) = log_file {
                tracing_subscriber::fmt()
                    .with_env_filter(filter)
                    .with_ansi(false)
                    .with_writer(std::sync::Mutex::new(file))
                    .init();
                return;
            }
        }
        // No writable log file: stay silent rather than draw over the TUI
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::new("off"))
            .init();
        return;
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Text for `analyze`: the argument, else all of stdin.
fn read_analyze_text(text: Option<String>) -> Result<String> {
    if let Some(text) = text {
        return Ok(text);
    }
    let mut stdin = std::io::stdin();
    if stdin.is_terminal() {
        anyhow::bail!("No text given: pass TEXT or pipe it on stdin");
    }
    let mut buf = String::new();
    stdin
        .read_to_string(&mut buf)
        .context("Failed to read text from stdin")?;
    Ok(buf)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    let command = args.command.clone().unwrap_or(Command::Dashboard);

    let config_dir = config::config_dir().ok();
    init_tracing(command.is_interactive(), config_dir.as_deref());

    let config_path = match (&args.config, &config_dir) {
        (Some(path), _) => Some(path.clone()),
        (None, Some(dir)) => Some(dir.join("config.toml")),
        (None, None) => None,
    };
    let config = match &config_path {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::default(),
    };

    let env_url = std::env::var(API_BASE_URL_ENV).ok();
    let base_url = config
        .resolve_base_url(args.api_url.as_deref(), env_url.as_deref())
        .context("Invalid backend URL")?;
    tracing::info!(base_url = %base_url, command = ?command, "Starting");

    let client = ApiClient::new(&base_url).context("Failed to create HTTP client")?;
    let mut stdout = std::io::stdout().lock();

    let surface = match command {
        Command::Dashboard => Surface::Dashboard,
        Command::Panel => Surface::Panel,
        Command::Analyze { text, json } => {
            let text = read_analyze_text(text)?;
            return cli::analyze(&client, &text, json, &mut stdout).await;
        }
        Command::Trends => return cli::trends(&client, &mut stdout).await,
        Command::Articles => return cli::articles(&client, &mut stdout).await,
        Command::Scan => return cli::scan(&client, &mut stdout).await,
        Command::Health => return cli::health(&client, &mut stdout).await,
    };
    drop(stdout);

    let mut keybindings = KeybindingRegistry::new();
    for warning in keybindings.apply_overrides(&config.keybindings) {
        tracing::warn!("{}", warning);
    }

    let (event_tx, event_rx) = mpsc::channel::<SessionEvent>(EVENT_CHANNEL_CAPACITY);
    let mut session = AnalysisSession::new(client, event_tx, surface, config.response_order);
    if surface == Surface::Dashboard {
        session.load_dashboard();
    }

    let mut app = App::new(session, keybindings);
    ui::run(&mut app, event_rx).await?;

    Ok(())
}
