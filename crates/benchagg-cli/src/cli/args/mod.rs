use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

pub mod archive;
pub mod common;
pub use archive::*;
pub use common::*;

#[derive(Parser, Debug)]
#[command(
    name = "benchagg",
    version,
    about = "Aggregate benchmark result records into a persistent multi-relation store"
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Project root; default data paths are resolved against it
    #[arg(long, global = true, env = "BENCHAGG_PROJECT_ROOT", default_value = ".")]
    pub project_root: PathBuf,

    /// Optional YAML settings file (store, benchmarks_dir, results_dir, machine_name)
    #[arg(long, global = true, env = "BENCHAGG_CONFIG")]
    pub config: Option<PathBuf>,

    /// Root holding one subfolder per run (default: <project-root>/data/benchmarks)
    #[arg(long, global = true, env = "BENCHAGG_BENCHMARKS_DIR")]
    pub benchmarks_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Aggregate one input directory into the store
    Aggregate(AggregateArgs),
    /// Aggregate every run-folder under the benchmarks root
    ProcessAll(ProcessAllArgs),
    /// Pack a run-folder into a .tar.gz for transfer
    Pack(PackArgs),
    /// Unpack a run archive beneath the benchmarks root
    Unpack(UnpackArgs),
    /// List run-folders under the benchmarks root
    List,
}

#[derive(Args, Debug, Clone)]
pub struct AggregateArgs {
    /// Directory of result records (default: <project-root>/benchmark_results)
    #[arg(long, short)]
    pub input: Option<PathBuf>,

    #[command(flatten)]
    pub store: StoreArgs,
}

#[derive(Args, Debug, Clone)]
pub struct ProcessAllArgs {
    #[command(flatten)]
    pub store: StoreArgs,
}
