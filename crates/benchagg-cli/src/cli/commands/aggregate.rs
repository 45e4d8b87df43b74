use super::super::args::{AggregateArgs, GlobalArgs};
use super::config::load_config;
use super::reporting::print_folder_outcome;
use crate::exit_codes;
use benchagg_core::batch::process_folder;
use benchagg_core::Store;

pub fn run(global: &GlobalArgs, args: AggregateArgs) -> anyhow::Result<i32> {
    let cfg = load_config(global, Some(&args.store))?;
    let input = args.input.unwrap_or_else(|| cfg.results_dir.clone());
    if !input.is_dir() {
        eprintln!("error: input directory not found: {}", input.display());
        return Ok(exit_codes::EXIT_FAILURE);
    }

    let store = Store::new(&cfg.store_path);
    let outcome = process_folder(&input, &cfg, &store)?;
    print_folder_outcome(&outcome);
    if !outcome.is_merged() {
        eprintln!("error: no benchmark results found to aggregate");
        return Ok(exit_codes::EXIT_FAILURE);
    }
    println!("store saved: {}", store.path().display());
    Ok(exit_codes::EXIT_SUCCESS)
}
