//! TiDB populator for dumpling benchmarks.

use crate::args::TidbPopulateArgs;
use crate::error::TidbPopulatorError;
use crate::executor::SqlExecutor;
use crate::insert::{
    generate_create_table, generate_drop_table, generate_skewed_row, generate_split_table,
    row_tuple, InsertBatcher, DEFAULT_BATCH_BYTES, TABLE_NAME,
};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// What to put into the benchmark table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PopulateConfig {
    /// Number of sequential rows.
    pub rows: u64,
    /// Number of regions to pre-split into; 0 skips the split.
    pub regions: u64,
    /// Append the skewed outlier row.
    pub skewed: bool,
}

impl From<&TidbPopulateArgs> for PopulateConfig {
    fn from(args: &TidbPopulateArgs) -> Self {
        Self {
            rows: args.rows,
            regions: args.regions,
            skewed: args.skewed,
        }
    }
}

/// Metrics from a populate operation.
#[derive(Debug, Clone, Default)]
pub struct PopulateMetrics {
    /// Number of rows inserted, including the skewed row.
    pub rows_inserted: u64,
    /// Number of INSERT statements executed.
    pub batch_count: u64,
    /// Total time taken.
    pub total_duration: Duration,
}

impl PopulateMetrics {
    /// Calculate rows per second.
    pub fn rows_per_second(&self) -> f64 {
        if self.total_duration.as_secs_f64() > 0.0 {
            self.rows_inserted as f64 / self.total_duration.as_secs_f64()
        } else {
            0.0
        }
    }
}

/// Prepares the benchmark table over a single borrowed connection.
///
/// Every statement runs to completion before the next one is issued. There
/// is no rollback: a failure part-way leaves the table partially populated.
pub struct TidbPopulator<E> {
    executor: E,
    config: PopulateConfig,
    batch_bytes: usize,
}

impl<E: SqlExecutor> TidbPopulator<E> {
    pub fn new(executor: E, config: PopulateConfig) -> Self {
        Self {
            executor,
            config,
            batch_bytes: DEFAULT_BATCH_BYTES,
        }
    }

    /// Set the VALUES size at which an INSERT batch is flushed.
    pub fn with_batch_bytes(mut self, batch_bytes: usize) -> Self {
        self.batch_bytes = batch_bytes;
        self
    }

    pub fn config(&self) -> &PopulateConfig {
        &self.config
    }

    /// Give back the executor, e.g. to return the connection to its pool.
    pub fn into_inner(self) -> E {
        self.executor
    }

    /// Drop and recreate the table.
    pub async fn recreate_table(&mut self) -> Result<(), TidbPopulatorError> {
        info!("Recreating table: {}", TABLE_NAME);
        self.executor
            .execute(&generate_drop_table(TABLE_NAME))
            .await?;
        self.executor
            .execute(&generate_create_table(TABLE_NAME))
            .await?;
        Ok(())
    }

    /// Pre-split the table into the configured number of regions.
    ///
    /// Returns `false` without touching the database when splitting is
    /// disabled.
    pub async fn split_table(&mut self) -> Result<bool, TidbPopulatorError> {
        if self.config.regions == 0 {
            debug!("Region pre-split disabled");
            return Ok(false);
        }
        let sql = generate_split_table(TABLE_NAME, self.config.rows, self.config.regions);
        self.executor.execute(&sql).await?;
        Ok(true)
    }

    /// Insert rows `1..=rows` in size-bounded batches.
    pub async fn insert_rows(&mut self) -> Result<PopulateMetrics, TidbPopulatorError> {
        let mut metrics = PopulateMetrics::default();
        let mut batcher = InsertBatcher::new(TABLE_NAME, self.batch_bytes);

        info!(
            "Populating table '{}' with {} rows (batch bytes: {})",
            TABLE_NAME, self.config.rows, self.batch_bytes
        );

        for i in 1..=self.config.rows {
            if let Some(sql) = batcher.push(&row_tuple(i, i)) {
                self.executor.execute(&sql).await?;
                metrics.batch_count += 1;
                debug!("Batch {} complete, next row {}", metrics.batch_count, i);
            }
            metrics.rows_inserted += 1;
        }
        if let Some(sql) = batcher.finish() {
            self.executor.execute(&sql).await?;
            metrics.batch_count += 1;
        }

        Ok(metrics)
    }

    /// Insert the outlier row keyed at the largest BIGINT value.
    pub async fn insert_skewed_row(&mut self) -> Result<(), TidbPopulatorError> {
        let sql = generate_skewed_row(TABLE_NAME, self.config.rows);
        self.executor.execute(&sql).await
    }

    /// Recreate, optionally split, and fill the table.
    pub async fn prepare(&mut self) -> Result<PopulateMetrics, TidbPopulatorError> {
        let start_time = Instant::now();

        self.recreate_table().await?;
        self.split_table().await?;
        let mut metrics = self.insert_rows().await?;
        if self.config.skewed {
            self.insert_skewed_row().await?;
            metrics.rows_inserted += 1;
            metrics.batch_count += 1;
        }

        metrics.total_duration = start_time.elapsed();
        info!(
            "Population complete: {} rows in {} batches, {:?} ({:.2} rows/sec)",
            metrics.rows_inserted,
            metrics.batch_count,
            metrics.total_duration,
            metrics.rows_per_second()
        );

        Ok(metrics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::RecordingExecutor;
    use crate::insert::{generate_insert, ROW_PAYLOAD, SKEWED_KEY};

    fn config(rows: u64, regions: u64, skewed: bool) -> PopulateConfig {
        PopulateConfig {
            rows,
            regions,
            skewed,
        }
    }

    /// Parse every `(a, b, c, 'd')` tuple out of the recorded INSERTs.
    fn inserted_rows(statements: &[String]) -> Vec<(u64, u64, u64)> {
        statements
            .iter()
            .filter_map(|s| s.strip_prefix("insert into t values "))
            .flat_map(|values| {
                values
                    .trim_end_matches(';')
                    .split("),(")
                    .map(|tuple| {
                        let tuple = tuple.trim_start_matches('(').trim_end_matches(')');
                        let fields: Vec<&str> = tuple.split(", ").collect();
                        assert_eq!(fields[3], format!("'{ROW_PAYLOAD}'"));
                        (
                            fields[0].parse().unwrap(),
                            fields[1].parse().unwrap(),
                            fields[2].parse().unwrap(),
                        )
                    })
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    #[tokio::test]
    async fn test_prepare_small_table_without_split() {
        let mut populator = TidbPopulator::new(RecordingExecutor::default(), config(3, 0, false));
        let metrics = populator.prepare().await.unwrap();
        let statements = populator.into_inner().statements;

        assert_eq!(
            statements,
            vec![
                generate_drop_table("t"),
                generate_create_table("t"),
                generate_insert(
                    "t",
                    "(1, 1, 1, 'string_payload_payload_payload'),\
                     (2, 2, 2, 'string_payload_payload_payload'),\
                     (3, 3, 3, 'string_payload_payload_payload')"
                ),
            ]
        );
        assert_eq!(metrics.rows_inserted, 3);
        assert_eq!(metrics.batch_count, 1);
    }

    #[tokio::test]
    async fn test_prepare_skewed() {
        let mut populator = TidbPopulator::new(RecordingExecutor::default(), config(2, 0, true));
        let metrics = populator.prepare().await.unwrap();
        let statements = populator.into_inner().statements;

        assert_eq!(
            inserted_rows(&statements),
            vec![(1, 1, 1), (2, 2, 2), (SKEWED_KEY, 3, 3)]
        );
        assert_eq!(
            statements.last().unwrap(),
            "insert into t values (9223372036854775807, 3, 3, 'string_payload_payload_payload');"
        );
        assert_eq!(metrics.rows_inserted, 3);
    }

    #[tokio::test]
    async fn test_prepare_splits_regions() {
        let mut populator =
            TidbPopulator::new(RecordingExecutor::default(), config(100, 16, false));
        populator.prepare().await.unwrap();
        let statements = populator.into_inner().statements;

        assert_eq!(
            statements[2],
            "split table t between (0) and (100) regions 16;"
        );
        assert_eq!(
            statements
                .iter()
                .filter(|s| s.starts_with("split table"))
                .count(),
            1
        );
    }

    #[tokio::test]
    async fn test_split_skipped_without_regions() {
        let mut populator = TidbPopulator::new(RecordingExecutor::default(), config(10, 0, false));
        assert!(!populator.split_table().await.unwrap());
        assert!(populator.into_inner().statements.is_empty());
    }

    #[tokio::test]
    async fn test_zero_rows_issues_no_insert() {
        let mut populator = TidbPopulator::new(RecordingExecutor::default(), config(0, 0, false));
        let metrics = populator.prepare().await.unwrap();
        let statements = populator.into_inner().statements;

        assert_eq!(statements.len(), 2);
        assert_eq!(metrics.rows_inserted, 0);
        assert_eq!(metrics.batch_count, 0);
    }

    #[tokio::test]
    async fn test_batches_respect_byte_limit() {
        let rows = 1000;
        let batch_bytes = 2048;
        let mut populator =
            TidbPopulator::new(RecordingExecutor::default(), config(rows, 0, false))
                .with_batch_bytes(batch_bytes);
        let metrics = populator.prepare().await.unwrap();
        let statements = populator.into_inner().statements;

        let inserts: Vec<&String> = statements
            .iter()
            .filter(|s| s.starts_with("insert"))
            .collect();
        assert!(inserts.len() > 1);
        assert_eq!(metrics.batch_count, inserts.len() as u64);
        for sql in &inserts {
            let values = sql
                .strip_prefix("insert into t values ")
                .unwrap()
                .strip_suffix(';')
                .unwrap();
            assert!(values.len() <= batch_bytes);
        }

        let keys: Vec<u64> = inserted_rows(&statements)
            .into_iter()
            .map(|(a, b, c)| {
                assert_eq!(a, b);
                assert_eq!(b, c);
                a
            })
            .collect();
        assert_eq!(keys, (1..=rows).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_failure_stops_preparation() {
        let executor = RecordingExecutor {
            // drop, create, split, then the first insert fails
            fail_at: Some(3),
            ..Default::default()
        };
        let mut populator = TidbPopulator::new(executor, config(1000, 4, true))
            .with_batch_bytes(256);

        assert!(populator.prepare().await.is_err());
        let statements = populator.into_inner().statements;
        assert_eq!(statements.len(), 3);
        assert!(statements[2].starts_with("split table"));
    }

    #[test]
    fn test_metrics() {
        let metrics = PopulateMetrics {
            rows_inserted: 1000,
            batch_count: 10,
            total_duration: Duration::from_secs(10),
        };

        assert_eq!(metrics.rows_per_second(), 100.0);
        assert_eq!(PopulateMetrics::default().rows_per_second(), 0.0);
    }
}
