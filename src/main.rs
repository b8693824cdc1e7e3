//! Daily Verse CLI - Daily Bible verses in the terminal
//!
//! Shows a verse of the day, looks up passages by reference and browses
//! curated mood categories. Lookups are cached on disk so repeated reads
//! work offline.

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use dailyverse::app::{App, AppError};
use dailyverse::cli::{Cli, Command};
use dailyverse::clock::SystemClock;
use dailyverse::config::{resolve_data_dir, Preferences, Settings};
use dailyverse::data::BibleApiClient;
use dailyverse::storage::{FileStorage, Storage};

/// Sets up logging to stderr, filtered by `RUST_LOG` (default: warnings only)
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("dailyverse=warn"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .init();
}

/// Resolves configuration, builds the App once and runs the requested command
async fn run(cli: Cli) -> Result<String, AppError> {
    let data_dir = resolve_data_dir(cli.data_dir.clone())?;
    let storage: Arc<dyn Storage> = Arc::new(FileStorage::new(data_dir.clone()));
    let preferences = Preferences::new(storage.clone());
    let settings = Settings::load(data_dir, &preferences, cli.translation.as_deref())?;
    debug!(?settings, "Settings resolved");

    let fetcher = BibleApiClient::with_base_url(settings.api_base_url.clone());
    let app = App::new(fetcher, storage, Arc::new(SystemClock), &settings, cli.numbers);

    app.run(cli.command.unwrap_or(Command::Today)).await
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
