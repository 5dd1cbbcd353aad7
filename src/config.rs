//! Command-line configuration.

use clap::{Args, Parser};
use loadtest_populate_tidb::{PopulateConfig, TidbPopulateArgs};
use std::ffi::OsString;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Which steps of the benchmark to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Prepare the table, then run the export.
    All,
    /// Only prepare the table.
    Prepare,
    /// Only run the export against an already prepared table.
    Run,
}

impl Action {
    pub fn prepares(self) -> bool {
        matches!(self, Action::All | Action::Prepare)
    }

    pub fn runs(self) -> bool {
        matches!(self, Action::All | Action::Run)
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unrecognized action: {0}")]
pub struct UnrecognizedAction(pub String);

impl FromStr for Action {
    type Err = UnrecognizedAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Action::All),
            "prepare" => Ok(Action::Prepare),
            "run" => Ok(Action::Run),
            other => Err(UnrecognizedAction(other.to_string())),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Action::All => "all",
            Action::Prepare => "prepare",
            Action::Run => "run",
        })
    }
}

/// User the benchmark connects as unless told otherwise.
pub const DEFAULT_USER: &str = "root";

/// TiDB connection options, shared by the populator and the export tool.
#[derive(Args, Clone, Debug, PartialEq, Eq)]
pub struct TidbOpts {
    /// TiDB host
    #[arg(long, env = "TIDB_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// TiDB port
    #[arg(long, env = "TIDB_PORT", default_value = "4000")]
    pub port: u16,

    /// TiDB user
    #[arg(long, env = "TIDB_USER", default_value = DEFAULT_USER)]
    pub user: String,

    /// TiDB password
    #[arg(long, env = "TIDB_PASSWORD", default_value = "", hide_env_values = true)]
    pub password: String,

    /// Database holding the benchmark table
    #[arg(long, env = "TIDB_DATABASE", default_value = "test")]
    pub database: String,
}

#[derive(Parser, Debug)]
#[command(name = "dumpling-bench")]
#[command(version)]
#[command(about = "Dumpling_bench is a CLI tool that helps you bench Dumpling.")]
#[command(long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub populate: TidbPopulateArgs,

    /// Number of rows per chunk written by dumpling
    #[arg(long = "chk_rows", default_value = "10000")]
    pub chunk_rows: u64,

    /// The dumpling binary
    #[arg(long, default_value = "./dumpling")]
    pub dumpling: PathBuf,

    /// {prepare|run|all}
    #[arg(long, default_value = "all")]
    pub action: Action,

    #[command(flatten)]
    pub tidb: TidbOpts,
}

impl Cli {
    pub fn into_config(self) -> RunConfig {
        RunConfig {
            populate: PopulateConfig::from(&self.populate),
            chunk_rows: self.chunk_rows,
            dumpling: self.dumpling,
            action: self.action,
            tidb: self.tidb,
        }
    }
}

/// Validated run configuration. Built once at startup and only read after.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub populate: PopulateConfig,
    pub chunk_rows: u64,
    pub dumpling: PathBuf,
    pub action: Action,
    pub tidb: TidbOpts,
}

impl RunConfig {
    /// Parse a full argument list, program name first.
    pub fn try_from_args<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        Cli::try_parse_from(args).map(Cli::into_config)
    }
}
