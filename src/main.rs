use kstreet::cli::{Cli, Command};
use kstreet::client::sheets::Sheets;
use kstreet::config::Settings;
use kstreet::core::dashboard::{AppState, Dashboard};
use kstreet::core::templates;
use kstreet::error::{BoardError, BoardResult};
use kstreet::offline::{AssetWorker, CacheStorage, HttpNetwork, RoutingRules};
use kstreet::storage::FileStore;

use chrono::Utc;
use clap::Parser;
use reqwest::Url;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let settings = match Settings::new(&cli) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(settings.get_trace_level())
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Setting default subscriber failed. {e}");
    }

    let result = match cli.command.clone().unwrap_or_default() {
        Command::Board { top, html } => board(&settings, top, html).await,
        Command::Precache => precache(&settings).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn board(settings: &Settings, top: Option<usize>, html: bool) -> BoardResult<()> {
    let store = FileStore::new(&settings.snapshot_dir)?;
    let sheets = Sheets::new(
        settings.sheets_base_url.clone(),
        settings.http_timeout(),
        settings.sheet_id.clone(),
        settings.cache_ttl(),
        Arc::new(store),
    )?;

    info!("Loading challenge feeds.");
    let state = match AppState::load(&sheets).await {
        Ok(state) => state,
        Err(e) => {
            println!("{}", templates::load_error(&e.to_string())?);
            return Err(e);
        }
    };

    let dashboard = Dashboard::derive(&state, settings.total_residents, Utc::now());
    let rendered = match html {
        true => templates::rankings_html(&dashboard.standings)?,
        false => templates::dashboard_text(&dashboard, top)?,
    };
    println!("{rendered}");
    Ok(())
}

async fn precache(settings: &Settings) -> BoardResult<()> {
    let origin = settings
        .site_origin
        .as_deref()
        .ok_or_else(|| BoardError::Config("site_origin is required to pre-cache assets".to_string()))?;
    let origin = Url::parse(origin)
        .map_err(|e| BoardError::Config(format!("Invalid site_origin. {e}")))?;

    let worker = AssetWorker::new(
        origin,
        &settings.asset_cache_version,
        RoutingRules::default(),
        CacheStorage::new(),
        Arc::new(HttpNetwork::new(settings.http_timeout())?),
    );

    info!("Installing asset cache {}.", worker.cache_name());
    worker.install().await?;
    let purged = worker.activate();
    println!(
        "Asset cache {} installed, {} stale cache(s) purged.",
        worker.cache_name(),
        purged.len()
    );
    Ok(())
}
