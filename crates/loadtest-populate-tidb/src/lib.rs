//! TiDB populator for dumpling benchmarks.
//!
//! Recreates the benchmark table, optionally pre-splits it into regions and
//! fills it with sequential rows. A single skewed row with the largest
//! `BIGINT` key can be appended to model a hot, out-of-range key.

pub mod args;
pub mod error;
pub mod executor;
pub mod insert;
pub mod populator;

pub use args::TidbPopulateArgs;
pub use error::TidbPopulatorError;
pub use executor::{LoggedExecutor, SqlExecutor};
pub use populator::{PopulateConfig, PopulateMetrics, TidbPopulator};
