//! NAV Cache - One-shot Lookup Binary
//!
//! Runs a single lookup and prints the JSON response to stdout. When the
//! lookup started a backfill, the process waits for it before exiting.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin nav-lookup -- --scheme-code 120503 --start 01-01-2020 --end 31-12-2020
//! ```
//!
//! Configuration is read from the same `NAV_*` environment variables as the
//! server. Logs go to stderr.

use std::io::Write;
use std::process::ExitCode;

use clap::Parser;

use interface_api::config::ApiConfig;
use interface_api::error::ApiError;
use interface_api::startup::{build_service, init_tracing, LogTarget};

/// Look up a mutual fund's NAV history
#[derive(Debug, Parser)]
#[command(name = "nav-lookup", version, about)]
struct Args {
    /// Scheme code (mutualFundID)
    #[arg(long)]
    scheme_code: String,

    /// Window start, dd-mm-yyyy
    #[arg(long)]
    start: Option<String>,

    /// Window end, dd-mm-yyyy
    #[arg(long)]
    end: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let config = ApiConfig::from_env()?;
    init_tracing(&config, LogTarget::Stderr);

    let service = build_service(&config).await?;
    let outcome = service
        .lookup(&args.scheme_code, args.start.as_deref(), args.end.as_deref())
        .await;

    let mut stdout = std::io::stdout().lock();
    let (body, backfill, code) = match outcome {
        Ok(lookup) => (
            serde_json::to_string(&lookup.response)?,
            lookup.backfill,
            ExitCode::SUCCESS,
        ),
        Err(e) => (
            serde_json::to_string(&ApiError::from(e).body())?,
            None,
            ExitCode::FAILURE,
        ),
    };
    writeln!(stdout, "{}", body)?;
    stdout.flush()?;
    drop(stdout);

    if let Some(handle) = backfill {
        let report = handle.wait().await;
        if !report.is_complete() {
            tracing::warn!(
                failed = report.failed_batches,
                written = report.records_written,
                "Backfill incomplete"
            );
        }
    }

    Ok(code)
}
