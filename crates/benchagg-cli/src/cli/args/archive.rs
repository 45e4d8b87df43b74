//! Pack and unpack command arguments.

use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug, Clone)]
pub struct PackArgs {
    /// Run-folder to pack
    pub folder: PathBuf,

    /// Archive path (default: <folder>.tar.gz beside the folder)
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct UnpackArgs {
    /// Run archive (.tar.gz)
    pub archive: PathBuf,

    /// Extraction target (default: the benchmarks root)
    #[arg(long)]
    pub target: Option<PathBuf>,
}
