use super::super::args::{GlobalArgs, ProcessAllArgs};
use super::config::load_config;
use super::reporting::print_folder_outcome;
use crate::exit_codes;
use benchagg_core::batch::{list_run_folders, process_all};

pub fn run(global: &GlobalArgs, args: ProcessAllArgs) -> anyhow::Result<i32> {
    let cfg = load_config(global, Some(&args.store))?;

    let folders = list_run_folders(&cfg.benchmarks_dir)?;
    if folders.is_empty() {
        println!("No benchmark folders found in {}", cfg.benchmarks_dir.display());
        println!("Expected structure: data/benchmarks/<run>/*.json");
        return Ok(exit_codes::EXIT_FAILURE);
    }
    println!("Found {} benchmark folder(s):", folders.len());
    for f in &folders {
        println!("  - {}: {} JSON files", f.name, f.json_files);
    }

    let batch = process_all(&cfg, print_folder_outcome)?;
    println!(
        "Processed {} benchmark folder(s), skipped {}",
        batch.processed(),
        batch.skipped()
    );
    if batch.processed() == 0 {
        return Ok(exit_codes::EXIT_FAILURE);
    }
    println!("store saved: {}", cfg.store_path.display());
    Ok(exit_codes::EXIT_SUCCESS)
}
