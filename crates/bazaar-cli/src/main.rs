//! Bazaar - a command-line client for the Bazaar classifieds marketplace.
//!
//! Browse and post ads, buy promotions, read messages, trade books and
//! manage the wallet from the terminal.

mod app;
mod cli;
mod commands;
mod render;

use std::io;
use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use bazaar_core::{ActionError, ApiError, Config};

use app::App;
use cli::Cli;

// ============================================================================
// Constants
// ============================================================================

/// File name prefix for the rolling log in the cache directory
const LOG_FILE: &str = "bazaar.log";

/// Initialize the tracing subscriber for logging.
///
/// Console output honours `RUST_LOG` (default `warn`); the log file in the
/// cache directory always records `info` and up.
fn init_tracing(log_dir: &Path) -> WorkerGuard {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::daily(log_dir, LOG_FILE));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr).with_filter(filter))
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_writer(file_writer)
                .with_filter(EnvFilter::new("info")),
        )
        .init();

    guard
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let cache_dir = match Config::default().cache_dir() {
        Ok(dir) => dir,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = std::fs::create_dir_all(&cache_dir) {
        eprintln!("Error: Failed to create {}: {}", cache_dir.display(), e);
        return ExitCode::FAILURE;
    }
    let _guard = init_tracing(&cache_dir);
    info!(command = ?cli.command, "Bazaar starting");

    let result = match App::new(cache_dir) {
        Ok(mut app) => commands::run(&mut app, cli.command).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report(&e);
            ExitCode::FAILURE
        }
    }
}

/// API failures were already shown by the notifier; everything else is
/// printed here.
fn report(error: &anyhow::Error) {
    if error.downcast_ref::<ApiError>().is_some() {
        return;
    }
    match error.downcast_ref::<ActionError>() {
        Some(ActionError::Api(_)) => {}
        Some(ActionError::Alert(alert)) => eprint!("{}", render::alert(alert)),
        _ => eprintln!("Error: {:#}", error),
    }
}
