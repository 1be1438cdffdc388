// In app/src/main.rs

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use core_types::{TimePeriod, Trade, TradeRecord};
use database::{CachedTradeStore, InMemoryTradeStore, TradeStore};
use engine::{AnalyticsRequest, AnalyticsService, EngineConfig, EVENT_CHANNEL_SIZE};
use events::EngineEvent;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;
use tracing_subscriber::prelude::*;
use web_server::{AppState, WsCache, WS_CACHE_SIZE};

use self::tracing_layer::WsBroadcastLayer;
mod tracing_layer;

// --- Command-Line Interface Definition ---

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = "Performance analytics for a trading journal.")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Serves the analytics API and the live WebSocket feed.
    Serve,

    /// Calculates a performance report and prints it as JSON.
    Report {
        /// The calendar (journal) to report on.
        #[arg(short, long)]
        calendar: String,

        /// The aggregation window: month, year or all.
        #[arg(short, long, default_value = "month")]
        period: TimePeriod,

        /// The reference date in YYYY-MM-DD format. Defaults to today.
        #[arg(short, long)]
        date: Option<NaiveDate>,

        /// Read trades from a JSON file instead of the database.
        #[arg(long)]
        trades_file: Option<PathBuf>,
    },

    /// Imports trades from a JSON file into a calendar.
    Import {
        #[arg(short, long)]
        calendar: String,

        /// A JSON array of trade records.
        #[arg(short, long)]
        file: PathBuf,
    },
}

// --- Main Application Entry Point ---

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // --- WebSocket and Tracing Setup ---
    let (ws_tx, _) = broadcast::channel::<EngineEvent>(EVENT_CHANNEL_SIZE);
    let ws_cache: WsCache = Arc::new(Mutex::new(VecDeque::with_capacity(WS_CACHE_SIZE)));
    let ws_layer = WsBroadcastLayer::new(ws_tx.clone(), ws_cache.clone());
    // Logs go to stderr so `report` output stays valid JSON.
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(
            tracing_subscriber::filter::Targets::new()
                .with_target("sqlx::query", tracing::Level::WARN)
                .with_default(tracing::Level::INFO),
        );
    tracing_subscriber::registry().with(fmt_layer).with(ws_layer).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve => {
            handle_serve(ws_tx, ws_cache).await?;
        }
        Commands::Report {
            calendar,
            period,
            date,
            trades_file,
        } => {
            handle_report(calendar, period, date, trades_file).await?;
        }
        Commands::Import { calendar, file } => {
            handle_import(calendar, file).await?;
        }
    }

    Ok(())
}

// --- "Serve" Subcommand Logic ---

/// Connects to the database and runs the web server until it terminates.
async fn handle_serve(ws_tx: broadcast::Sender<EngineEvent>, ws_cache: WsCache) -> Result<()> {
    let settings = app_config::load_settings()?;
    tracing::info!(environment = %settings.app.environment, "Application settings loaded successfully.");

    let db = database::connect(&settings.database).await?;
    tracing::info!("Database connection established and migrations are up-to-date.");

    let app_state = AppState {
        store: Arc::new(CachedTradeStore::new(db)),
        config: EngineConfig::from(&settings),
        ws_tx,
        ws_cache,
    };

    web_server::run(settings.server, app_state).await?;
    anyhow::bail!("Web server terminated unexpectedly.");
}

// --- "Report" Subcommand Logic ---

async fn handle_report(
    calendar: String,
    period: TimePeriod,
    date: Option<NaiveDate>,
    trades_file: Option<PathBuf>,
) -> Result<()> {
    let settings = app_config::load_settings()?;

    let store: Arc<dyn TradeStore> = match trades_file {
        Some(path) => {
            let trades = load_trades_file(&path).await?;
            tracing::info!(file = %path.display(), trades = trades.len(), "Loaded trades from file.");
            Arc::new(InMemoryTradeStore::with_trades(calendar.clone(), trades))
        }
        None => Arc::new(database::connect(&settings.database).await?),
    };

    let (tx, _) = broadcast::channel(EVENT_CHANNEL_SIZE);
    let service = AnalyticsService::new(store, EngineConfig::from(&settings), tx);

    let mut events = service.subscribe();
    let progress = tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            if let EngineEvent::Progress(p) = event {
                tracing::debug!(step = %p.step, current = p.current, total = p.total, "Progress.");
            }
        }
    });

    let request = AnalyticsRequest {
        calendar_id: calendar,
        time_period: period,
        reference_date: date.unwrap_or_else(engine::today),
        comparison: Default::default(),
    };
    let snapshot = service.refresh(request).await?;
    progress.abort();

    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}

// --- "Import" Subcommand Logic ---

async fn handle_import(calendar: String, file: PathBuf) -> Result<()> {
    let settings = app_config::load_settings()?;
    let trades = load_trades_file(&file).await?;

    let db = database::connect(&settings.database).await?;
    db.insert_trades(&calendar, &trades).await?;
    tracing::info!(calendar_id = %calendar, count = trades.len(), "Trades imported.");
    Ok(())
}

/// Reads a JSON array of trade records, validating every record.
async fn load_trades_file(path: &Path) -> Result<Vec<Trade>> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    parse_trades(&raw).with_context(|| format!("Invalid trades file {}", path.display()))
}

fn parse_trades(raw: &str) -> Result<Vec<Trade>> {
    let records: Vec<TradeRecord> = serde_json::from_str(raw)?;
    records
        .into_iter()
        .enumerate()
        .map(|(i, record)| Trade::try_from(record).with_context(|| format!("record #{i}")))
        .collect()
}
