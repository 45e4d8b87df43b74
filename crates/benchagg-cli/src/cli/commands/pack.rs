use super::super::args::PackArgs;
use crate::exit_codes;
use benchagg_core::archive::pack;

pub fn run(args: PackArgs) -> anyhow::Result<i32> {
    let report = match pack(&args.folder, args.output.as_deref()) {
        Ok(r) => r,
        Err(e) if e.is_not_found() => {
            eprintln!("error: {}", e);
            return Ok(exit_codes::EXIT_FAILURE);
        }
        Err(e) => return Err(e.into()),
    };

    for entry in &report.entries {
        println!("  added: {}", entry);
    }
    println!("Created: {}", report.archive.display());
    println!(
        "  {} file(s), {:.1} KB -> {:.1} KB ({:.1}x)",
        report.entries.len(),
        report.original_bytes as f64 / 1024.0,
        report.compressed_bytes as f64 / 1024.0,
        report.compression_ratio()
    );
    Ok(exit_codes::EXIT_SUCCESS)
}
