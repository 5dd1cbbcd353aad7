//! Benchmark harness for dumpling.
//!
//! Populates a TiDB table with sequential (optionally skewed) rows, then runs
//! dumpling against it and reports how long the export took.

pub mod config;
pub mod connect;
pub mod dump;
pub mod prepare;

pub use config::{Action, Cli, RunConfig, TidbOpts};
pub use dump::{dump_args, run_dump, DumpError, DumpReport};
pub use prepare::prepare_table;
