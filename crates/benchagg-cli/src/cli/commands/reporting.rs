//! stdout reporting shared by the aggregating commands.

use benchagg_core::batch::{CleanupReport, FolderOutcome, FolderStatus};
use benchagg_core::MergeReport;

pub(crate) fn print_folder_outcome(outcome: &FolderOutcome) {
    let name = outcome
        .folder
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| outcome.folder.display().to_string());
    println!("{}: {} usable record(s)", name, outcome.records);
    if outcome.unreadable_files > 0 {
        println!("  {} file(s) could not be parsed", outcome.unreadable_files);
    }
    match &outcome.status {
        FolderStatus::Skipped => println!("  skipped: no valid results"),
        FolderStatus::Merged { report, cleanup } => {
            println!("  benchmark id: {}", outcome.run_id);
            println!("  machine: {}", outcome.machine_name);
            print_merge_report(report);
            if let Some(c) = cleanup {
                print_cleanup(c);
            }
        }
    }
}

fn print_merge_report(report: &MergeReport) {
    if report.created_store {
        println!("  created new store");
    }
    for name in &report.created_relations {
        println!("  created relation {}", name);
    }
    for (name, n) in &report.appended {
        println!("  {}: +{} row(s)", name, n);
    }
    if report.cross_machine_rows == 0 {
        println!("  Cross_Machine: omitted (no joinable rows)");
    } else {
        println!("  Cross_Machine: {} row(s)", report.cross_machine_rows);
    }
    println!("  merge: OK");
}

fn print_cleanup(c: &CleanupReport) {
    for f in &c.removed_files {
        println!("  deleted {}", f);
    }
    if c.removed_debug_images {
        println!("  deleted debug_images/");
    }
    for f in &c.failures {
        eprintln!("warning: could not delete {}", f);
    }
}
