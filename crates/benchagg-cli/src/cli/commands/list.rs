use super::super::args::GlobalArgs;
use super::config::load_config;
use crate::exit_codes;
use benchagg_core::batch::list_run_folders;

pub fn run(global: &GlobalArgs) -> anyhow::Result<i32> {
    let cfg = load_config(global, None)?;
    let folders = list_run_folders(&cfg.benchmarks_dir)?;
    if folders.is_empty() {
        println!("No benchmark folders in {}", cfg.benchmarks_dir.display());
        return Ok(exit_codes::EXIT_SUCCESS);
    }
    println!("Benchmark folders in {}:", cfg.benchmarks_dir.display());
    for f in &folders {
        println!("  - {}: {} JSON files", f.name, f.json_files);
    }
    Ok(exit_codes::EXIT_SUCCESS)
}
