//! The `shelf` binary: bootstrap for the terminal catalog browser.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use url::Url;

use examshelf::client::ShelfClient;
use examshelf::config::{Config, Settings};
use examshelf::services::DownloadService;
use examshelf::ui::App;

/// Browse a remote exam-sheet catalog from the terminal.
#[derive(Debug, Parser)]
#[command(name = "shelf", version, about)]
struct Cli {
    /// Base URL of the catalog host (expects catalog.json, sheets/, solutions/).
    #[arg(long)]
    base_url: Option<String>,

    /// Directory downloads are saved into.
    #[arg(long)]
    downloads: Option<PathBuf>,

    /// Path to a TOML config file (default: platform config dir).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log file path (default: platform cache dir).
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref())?;
    let base = cli
        .base_url
        .clone()
        .or_else(|| config.base_url.clone())
        .context("no base url configured; pass --base-url or set base_url in examshelf.toml")?;
    let base = Url::parse(&base).context("invalid base url")?;

    let mut settings = Settings::from_base(base)?;
    config.apply_to_settings(&mut settings);
    if let Some(dir) = cli.downloads {
        settings.downloads_dir = dir;
    }
    if let Some(path) = cli.log_file {
        settings.log_file = path;
    }
    settings.ensure_directories()?;

    // The TUI owns the terminal, so log output goes to a file sink.
    init_tracing(&settings.log_file)?;
    tracing::info!(catalog = %settings.catalog_url, "starting shelf");

    let client = ShelfClient::new(
        Duration::from_secs(settings.request_timeout),
        settings.user_agent.as_deref(),
    )?;
    let downloads = DownloadService::new(
        client.clone(),
        settings.sheets_root.clone(),
        settings.solutions_root.clone(),
        settings.downloads_dir.clone(),
    );

    let mut terminal = ratatui::init();
    let result = App::new(settings, client, downloads).run(&mut terminal).await;
    ratatui::restore();
    result
}

fn init_tracing(path: &Path) -> anyhow::Result<()> {
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("cannot open log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}
