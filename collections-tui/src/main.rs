mod api;
mod config;
mod tui;

use anyhow::{Context, Result};
use clap::Parser;
use once_cell::sync::OnceCell;

use api::ApiClient;
use config::Config;

static API: OnceCell<ApiClient> = OnceCell::new();

/// Process-wide API client handle. Set once in `main`, before the runtime
/// starts; the client itself is stateless per call.
pub fn api_client() -> &'static ApiClient {
    API.get().expect("API client is initialized before the runtime starts")
}

#[derive(Parser)]
#[command(
    name = "collections-tui",
    about = "Terminal dashboard for tracking loan-collection calls",
    version
)]
struct Cli {
    /// Backend base URL (overrides BACKEND_URL and the config file)
    #[arg(long)]
    base_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_logging().context("failed to initialize logging")?;

    let config = Config::load(cli.base_url)?;
    API.set(ApiClient::new(&config.base_url)).ok();
    log::info!("starting against {}", config.base_url);

    tui::run().await
}

/// The terminal belongs to the dashboard, so logs go to a file instead of
/// stderr. Level is controlled with RUST_LOG, destination with
/// COLLECTIONS_TUI_LOG.
fn init_logging() -> Result<()> {
    let path = std::env::var("COLLECTIONS_TUI_LOG")
        .unwrap_or_else(|_| "collections-tui.log".to_string());
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("failed to open log file {path}"))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}
