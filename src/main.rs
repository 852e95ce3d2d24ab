use carrent::application::Stores;
use carrent::application::engine::RentalEngine;
use carrent::config::{
    AppConfig, CheckoutConfig, DEFAULT_CURRENCY, DEFAULT_PUBLIC_URL, StripeSettings,
    TelegramSettings,
};
use carrent::infrastructure::in_memory::in_memory_stores;
#[cfg(feature = "storage-rocksdb")]
use carrent::infrastructure::rocksdb::RocksDBStore;
use carrent::infrastructure::stripe::DEFAULT_STRIPE_API_BASE;
use carrent::interfaces::batch::dispatcher::Dispatcher;
use carrent::interfaces::batch::request::RequestReader;
use carrent::interfaces::csv::fleet_reader::FleetReader;
use carrent::interfaces::csv::fleet_writer::FleetWriter;
use chrono::NaiveDate;
use clap::Parser;
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input requests, one JSON object per line
    input: PathBuf,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long, env = "CARRENT_DB_PATH")]
    db_path: Option<PathBuf>,

    /// Fleet CSV (model, brand, type, inventory, daily_fee) loaded before the requests
    #[arg(long)]
    fleet: Option<PathBuf>,

    /// Writes the final fleet as CSV to this path
    #[arg(long)]
    fleet_report: Option<PathBuf>,

    /// Base URL the payment processor redirects back to
    #[arg(long, env = "CARRENT_PUBLIC_URL", default_value = DEFAULT_PUBLIC_URL)]
    public_url: String,

    #[arg(long, env = "CARRENT_CURRENCY", default_value = DEFAULT_CURRENCY)]
    currency: String,

    /// Stripe secret key. Without it, payments go through the sandbox processor.
    #[arg(long, env = "STRIPE_API_KEY", hide_env_values = true)]
    stripe_api_key: Option<String>,

    #[arg(long, env = "STRIPE_API_BASE", default_value = DEFAULT_STRIPE_API_BASE)]
    stripe_api_base: String,

    #[arg(long, env = "TELEGRAM_BOT_TOKEN", hide_env_values = true)]
    telegram_bot_token: Option<String>,

    #[arg(long, env = "TELEGRAM_CHAT_ID")]
    telegram_chat_id: Option<String>,

    /// Business date to run with (YYYY-MM-DD) instead of the system date
    #[arg(long, env = "CARRENT_TODAY")]
    today: Option<NaiveDate>,

    /// Timeout for outbound HTTP calls, in seconds
    #[arg(long, default_value_t = 30)]
    http_timeout: u64,
}

impl Cli {
    fn app_config(&self) -> AppConfig {
        let stripe = self.stripe_api_key.as_ref().map(|api_key| StripeSettings {
            api_key: api_key.clone(),
            api_base: self.stripe_api_base.clone(),
        });
        let telegram = match (&self.telegram_bot_token, &self.telegram_chat_id) {
            (Some(bot_token), Some(chat_id)) => Some(TelegramSettings {
                bot_token: bot_token.clone(),
                chat_id: chat_id.clone(),
            }),
            _ => None,
        };
        AppConfig {
            db_path: self.db_path.clone(),
            checkout: CheckoutConfig::new(&self.public_url, &self.currency),
            stripe,
            telegram,
            today: self.today,
            http_timeout: Duration::from_secs(self.http_timeout),
        }
    }
}

fn setup_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .compact()
        .init();
}

fn open_stores(db_path: Option<&Path>) -> Result<Stores> {
    match db_path {
        #[cfg(feature = "storage-rocksdb")]
        Some(path) => {
            // Use persistent storage (RocksDB)
            let store = RocksDBStore::open(path).into_diagnostic()?;
            Ok(store.stores())
        }
        #[cfg(not(feature = "storage-rocksdb"))]
        Some(_) => {
            eprintln!(
                "WARNING: Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
            );
            Ok(in_memory_stores())
        }
        None => Ok(in_memory_stores()),
    }
}

async fn seed_fleet(engine: &RentalEngine, path: &Path) -> Result<()> {
    let file = File::open(path).into_diagnostic()?;
    let mut loaded = 0;
    for (row, car) in FleetReader::new(file).cars().enumerate() {
        let outcome = match car {
            Ok(car) => engine.fleet.import_car(car).await,
            Err(e) => Err(e),
        };
        match outcome {
            Ok(_) => loaded += 1,
            Err(e) => warn!(row = row + 1, error = %e, "Skipping fleet row"),
        }
    }
    info!(loaded, "Fleet seeded");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_tracing();
    let cli = Cli::parse();
    let config = cli.app_config();

    let stores = open_stores(config.db_path.as_deref())?;
    let engine = RentalEngine::new(
        stores,
        config.payment_processor().into_diagnostic()?,
        config.notification_sink().into_diagnostic()?,
        config.clock(),
        config.checkout.clone(),
    );

    if let Some(fleet) = &cli.fleet {
        seed_fleet(&engine, fleet).await?;
    }

    // Process requests
    let dispatcher = Dispatcher::new(engine);
    let file = File::open(&cli.input).into_diagnostic()?;
    let mut stdout = io::stdout().lock();
    let (mut processed, mut failed) = (0usize, 0usize);
    for (line, request) in RequestReader::new(BufReader::new(file)).requests() {
        let response = dispatcher.dispatch(line, request).await;
        processed += 1;
        if !response.is_success() {
            failed += 1;
        }
        serde_json::to_writer(&mut stdout, &response).into_diagnostic()?;
        writeln!(stdout).into_diagnostic()?;
    }
    stdout.flush().into_diagnostic()?;
    info!(processed, failed, "Batch finished");

    if let Some(report) = cli.fleet_report {
        let cars = dispatcher.into_engine().into_fleet().await.into_diagnostic()?;
        let mut writer = FleetWriter::new(File::create(report).into_diagnostic()?);
        writer.write_fleet(cars).into_diagnostic()?;
    }

    Ok(())
}
