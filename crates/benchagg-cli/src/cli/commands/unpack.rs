use super::super::args::{GlobalArgs, UnpackArgs};
use super::config::load_config;
use crate::exit_codes;
use benchagg_core::archive::unpack;

pub fn run(global: &GlobalArgs, args: UnpackArgs) -> anyhow::Result<i32> {
    let target = match args.target {
        Some(t) => t,
        None => load_config(global, None)?.benchmarks_dir,
    };
    let extracted = match unpack(&args.archive, &target) {
        Ok(p) => p,
        Err(e) if e.is_not_found() => {
            eprintln!("error: {}", e);
            return Ok(exit_codes::EXIT_FAILURE);
        }
        Err(e) => return Err(e.into()),
    };
    println!("Extracted to: {}", extracted.display());
    println!("Run `benchagg process-all` to aggregate the unpacked results.");
    Ok(exit_codes::EXIT_SUCCESS)
}
