//! CLI argument definitions for the TiDB populator.

use clap::Args;

/// Populate arguments for the benchmark table.
#[derive(Args, Clone, Debug)]
pub struct TidbPopulateArgs {
    /// Number of rows to generate in the table
    #[arg(long = "rows", default_value = "100000")]
    pub rows: u64,

    /// Number of regions to pre-split the table into (0 disables splitting)
    #[arg(long = "regions", default_value = "16")]
    pub regions: u64,

    /// Append one row keyed at the largest BIGINT to skew the key space
    #[arg(long = "skewed")]
    pub skewed: bool,
}
