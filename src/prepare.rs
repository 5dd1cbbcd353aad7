//! Benchmark table preparation.

use crate::config::RunConfig;
use crate::connect::{connect, masked_url, READ_TIMEOUT};
use anyhow::Context;
use loadtest_populate_tidb::insert::generate_use_database;
use loadtest_populate_tidb::{LoggedExecutor, PopulateMetrics, SqlExecutor, TidbPopulator};
use tracing::info;

/// Connect to TiDB and rebuild the benchmark table from scratch.
pub async fn prepare_table(config: &RunConfig) -> anyhow::Result<PopulateMetrics> {
    info!("Connecting to {}", masked_url(&config.tidb));
    let conn = connect(&config.tidb).await?;

    let mut executor = LoggedExecutor::new(conn, READ_TIMEOUT);
    executor
        .execute(&generate_use_database(&config.tidb.database))
        .await
        .with_context(|| format!("Failed to switch to database '{}'", config.tidb.database))?;

    let mut populator = TidbPopulator::new(executor, config.populate);
    let metrics = populator
        .prepare()
        .await
        .context("Failed to prepare benchmark table")?;

    populator
        .into_inner()
        .into_inner()
        .disconnect()
        .await
        .context("Failed to close TiDB connection")?;

    Ok(metrics)
}
