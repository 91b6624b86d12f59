//! Command-line surface: argument parsing and the one-shot commands.
//!
//! The interactive surfaces live in [`crate::ui`]; everything here talks to
//! the backend once, prints, and exits.

use crate::api::ApiClient;
use crate::ui::{format_relative_time, plain_result_lines};
use crate::util::{sanitize, single_line, truncate_to_width};
use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;

/// Width used when printing reports outside the TUI.
const PRINT_WIDTH: usize = 100;

#[derive(Debug, Parser)]
#[command(
    name = "truelens",
    version,
    about = "Terminal client for the TrueLens misinformation analysis backend"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Backend base URL (overrides TRUELENS_API_BASE_URL and the config file)
    #[arg(long, global = true, value_name = "URL")]
    pub api_url: Option<String>,

    /// Config file path (default: ~/.config/truelens/config.toml)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Full dashboard: analysis, trending narratives and latest articles (default).
    Dashboard,
    /// Standalone analysis panel.
    Panel,
    /// Analyze TEXT once and print the report; reads stdin when TEXT is omitted.
    Analyze {
        text: Option<String>,
        /// Print the raw JSON response
        #[arg(long)]
        json: bool,
    },
    /// Print trending narratives.
    Trends,
    /// Print the latest ingested articles.
    Articles,
    /// Ask the backend to scan its sources.
    Scan,
    /// Check that the backend is reachable.
    Health,
}

impl Command {
    /// True for commands that take over the terminal.
    pub fn is_interactive(&self) -> bool {
        matches!(self, Command::Dashboard | Command::Panel)
    }
}

// ============================================================================
// One-shot commands
// ============================================================================

pub async fn analyze(client: &ApiClient, text: &str, json: bool, out: &mut impl Write) -> Result<()> {
    let result = client
        .analyze_text(text)
        .await
        .context("Analysis failed")?;

    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(&result)?)?;
        return Ok(());
    }

    for line in plain_result_lines(&result, PRINT_WIDTH) {
        writeln!(out, "{}", line.trim_end())?;
    }
    Ok(())
}

pub async fn trends(client: &ApiClient, out: &mut impl Write) -> Result<()> {
    let trends = client
        .get_trends()
        .await
        .context("Failed to fetch trends")?;

    if trends.is_empty() {
        writeln!(out, "No trending narratives")?;
    }
    for trend in &trends {
        writeln!(out, "{:>5}  {}", trend.count, single_line(&sanitize(&trend.topic)))?;
    }
    Ok(())
}

pub async fn articles(client: &ApiClient, out: &mut impl Write) -> Result<()> {
    let articles = client
        .get_articles()
        .await
        .context("Failed to fetch articles")?;

    if articles.is_empty() {
        writeln!(out, "No articles yet")?;
    }
    let now = Utc::now();
    for article in &articles {
        let title = single_line(&sanitize(&article.display_title()));
        let age = format_relative_time(article.published_at.as_deref(), now);
        writeln!(out, "{:>6}  {:<4}  {}", article.id, age, title)?;
        if let Some(url) = article.url.as_deref().filter(|u| !u.is_empty()) {
            let url = single_line(&sanitize(url));
            writeln!(out, "              {}", truncate_to_width(&url, PRINT_WIDTH))?;
        }
    }
    Ok(())
}

pub async fn scan(client: &ApiClient, out: &mut impl Write) -> Result<()> {
    let status = client.trigger_scan().await.context("Scan failed")?;
    let message = if status.status.trim().is_empty() {
        crate::session::SCAN_COMPLETED
    } else {
        status.status.as_str()
    };
    writeln!(out, "{}", sanitize(message))?;
    Ok(())
}

pub async fn health(client: &ApiClient, out: &mut impl Write) -> Result<()> {
    let health = client
        .health()
        .await
        .with_context(|| format!("Backend at {} is not reachable", client.base_url()))?;
    writeln!(out, "{}: {}", client.base_url(), sanitize(&health.status))?;
    Ok(())
}
