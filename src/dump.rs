//! Dumpling invocation and timing.

use crate::config::{RunConfig, DEFAULT_USER};
use loadtest_populate_tidb::insert::TABLE_NAME;
use std::process::ExitStatus;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::process::Command;
use tracing::{error, info};

/// Log file dumpling writes into the working directory.
pub const DUMP_LOG_FILE: &str = "dump.log";

/// `--tidb-mem-quota-query` passed to dumpling: 8 GiB.
pub const TIDB_MEM_QUOTA_QUERY: u64 = 8 << 30;

pub const DUMP_LOG_LEVEL: &str = "debug";

pub const DUMP_THREADS: u32 = 32;

#[derive(Error, Debug)]
pub enum DumpError {
    /// The binary could not be started at all.
    #[error("failed to launch {binary}: {source}")]
    Launch {
        binary: String,
        #[source]
        source: std::io::Error,
    },

    /// The binary ran but exited unsuccessfully.
    #[error("{binary} exited with {status}")]
    Failed {
        binary: String,
        status: ExitStatus,
        stderr: String,
    },
}

/// Outcome of a successful dump.
#[derive(Debug, Clone)]
pub struct DumpReport {
    /// Wall-clock time from spawn to exit.
    pub elapsed: Duration,
    pub stdout: String,
}

/// Arguments passed to dumpling, restricted to the benchmark table.
///
/// Credentials are only passed when they differ from dumpling's own defaults
/// (`root`, no password).
pub fn dump_args(config: &RunConfig) -> Vec<String> {
    let mut args = vec![
        "--host".to_string(),
        config.tidb.host.clone(),
        "--port".to_string(),
        config.tidb.port.to_string(),
        "--filter".to_string(),
        format!("{}.{}", config.tidb.database, TABLE_NAME),
        "--tidb-mem-quota-query".to_string(),
        TIDB_MEM_QUOTA_QUERY.to_string(),
        "--logfile".to_string(),
        DUMP_LOG_FILE.to_string(),
        "--rows".to_string(),
        config.chunk_rows.to_string(),
        "--loglevel".to_string(),
        DUMP_LOG_LEVEL.to_string(),
        "--threads".to_string(),
        DUMP_THREADS.to_string(),
    ];
    if config.tidb.user != DEFAULT_USER {
        args.extend(["--user".to_string(), config.tidb.user.clone()]);
    }
    if !config.tidb.password.is_empty() {
        args.extend(["--password".to_string(), config.tidb.password.clone()]);
    }
    args
}

/// Copy of `args` with the value after `--password` hidden.
fn masked_args(args: &[String]) -> Vec<&str> {
    let mut masked = Vec::with_capacity(args.len());
    let mut hide_next = false;
    for arg in args {
        masked.push(if hide_next { "***" } else { arg.as_str() });
        hide_next = arg == "--password";
    }
    masked
}

/// Run dumpling once and report how long it took.
///
/// Output is collected in memory and only logged after the process exits.
pub async fn run_dump(config: &RunConfig) -> Result<DumpReport, DumpError> {
    let binary = config.dumpling.display().to_string();
    let args = dump_args(config);
    info!("Running {} {}", binary, masked_args(&args).join(" "));

    let start = Instant::now();
    let output = Command::new(&config.dumpling)
        .args(&args)
        .output()
        .await
        .map_err(|source| DumpError::Launch {
            binary: binary.clone(),
            source,
        })?;
    let elapsed = start.elapsed();

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        error!("{}", stderr);
        return Err(DumpError::Failed {
            binary,
            status: output.status,
            stderr,
        });
    }

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    info!("{}", stdout);
    info!("dumpling took {:?}", elapsed);

    Ok(DumpReport { elapsed, stdout })
}
