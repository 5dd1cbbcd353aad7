//! Command-line interface for dumpling-bench
//!
//! # Usage Examples
//!
//! ```bash
//! # Prepare 1M rows split into 32 regions, then dump them in 50k-row chunks
//! dumpling-bench --rows 1000000 --regions 32 --chk_rows 50000 --dumpling ./bin/dumpling
//!
//! # Only (re)build the table, with one skewed row at the end of the key space
//! dumpling-bench --action prepare --skewed
//!
//! # Re-run the export against an existing table
//! dumpling-bench --action run
//! ```

use anyhow::Context;
use clap::Parser;
use dumpling_bench::connect::masked_url;
use dumpling_bench::{prepare_table, run_dump, Cli, RunConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = parse_config();
    if let Err(e) = run(config).await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

/// Parse arguments, exiting 0 for help/version and 1 for anything invalid.
fn parse_config() -> RunConfig {
    match Cli::try_parse() {
        Ok(cli) => cli.into_config(),
        Err(e) => {
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            std::process::exit(code);
        }
    }
}

async fn run(config: RunConfig) -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    tracing::debug!(
        "Action: {}, target: {}, rows: {}",
        config.action,
        masked_url(&config.tidb),
        config.populate.rows
    );

    if config.action.prepares() {
        prepare_table(&config).await?;
    }
    if config.action.runs() {
        run_dump(&config).await.context("Dumpling run failed")?;
    }
    Ok(())
}
