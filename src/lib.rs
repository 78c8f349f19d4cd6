//! rs-record-trajectory - record depth and tracking cameras to `.bag` files.
//!
//! Finds connected depth (D400) and tracking (T200) cameras, records each
//! one to its own container file for a fixed time, then stops every
//! recording so the files are finalized.

pub mod capture;
pub mod cli;
pub mod commands;
pub mod recorder;
pub mod reporter;
pub mod utils;

use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Parse the command line, run it and map the outcome to an exit status
pub fn run() -> ExitCode {
    // Logs go to stderr; stdout carries the progress text.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rs_record_trajectory=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = cli::Args::parse();
    tracing::debug!("Starting rs-record-trajectory v{}", env!("CARGO_PKG_VERSION"));

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Failed to start runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(commands::execute(args)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let _ = reporter::report_failure(&e, &mut std::io::stderr());
            ExitCode::FAILURE
        }
    }
}
