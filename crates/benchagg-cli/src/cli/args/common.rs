//! Arguments shared by the aggregating commands.

use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug, Clone, Default)]
pub struct StoreArgs {
    /// Store path (default: <project-root>/data/benchmark_results.db)
    #[arg(long, short, env = "BENCHAGG_STORE")]
    pub output: Option<PathBuf>,

    /// Machine name recorded with the run (overrides VIXEN_MACHINE_NAME and hostname)
    #[arg(long)]
    pub machine_name: Option<String>,

    /// Delete *.json and debug_images/ from each folder after a persisted merge
    #[arg(long)]
    pub cleanup: bool,
}
