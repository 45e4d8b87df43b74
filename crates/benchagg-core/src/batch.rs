//! Batch Orchestrator.
//!
//! Drives run-folders through load, extract and merge strictly one after
//! another. A folder's raw inputs are only purged after its merge has been
//! persisted.

use crate::config::{AggregateConfig, DEBUG_IMAGES_DIR};
use crate::errors::BatchError;
use crate::extract::extract_run;
use crate::loader::{json_files, load_results};
use crate::storage::{MergeReport, Store};
use std::path::{Path, PathBuf};

/// A discoverable run-folder beneath the benchmarks root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunFolder {
    pub path: PathBuf,
    pub name: String,
    pub json_files: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanupReport {
    pub removed_files: Vec<String>,
    pub removed_debug_images: bool,
    /// Deletions that failed; logged and otherwise ignored.
    pub failures: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FolderStatus {
    Merged {
        report: MergeReport,
        cleanup: Option<CleanupReport>,
    },
    /// No usable records; the store was not touched.
    Skipped,
}

/// What happened to one folder.
#[derive(Debug, Clone, PartialEq)]
pub struct FolderOutcome {
    pub folder: PathBuf,
    pub run_id: String,
    pub machine_name: String,
    pub records: usize,
    pub unreadable_files: usize,
    pub status: FolderStatus,
}

impl FolderOutcome {
    pub fn is_merged(&self) -> bool {
        matches!(self.status, FolderStatus::Merged { .. })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    pub outcomes: Vec<FolderOutcome>,
}

impl BatchReport {
    pub fn processed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_merged()).count()
    }

    pub fn skipped(&self) -> usize {
        self.outcomes.len() - self.processed()
    }
}

/// Fresh 8-hex-character suffix from a v4 UUID.
pub fn generate_run_suffix() -> String {
    uuid::Uuid::new_v4().simple().to_string()[..8].to_string()
}

/// `<first 8 chars of folder name>_<random suffix>`. Distinct on every call,
/// so folders with colliding names still get distinct run ids.
pub fn run_id_for_folder(folder_name: &str) -> String {
    let prefix: String = folder_name.chars().take(8).collect();
    format!("{}_{}", prefix, generate_run_suffix())
}

/// Subdirectories of `root` holding at least one `*.json`, sorted by path.
/// The root is created if absent.
pub fn list_run_folders(root: &Path) -> Result<Vec<RunFolder>, BatchError> {
    let root_err = |source: std::io::Error| BatchError::Root {
        path: root.to_path_buf(),
        source,
    };
    std::fs::create_dir_all(root).map_err(root_err)?;

    let mut folders = Vec::new();
    for entry in std::fs::read_dir(root).map_err(root_err)? {
        let path = entry.map_err(root_err)?.path();
        if !path.is_dir() {
            continue;
        }
        let count = json_files(&path)?.len();
        if count == 0 {
            continue;
        }
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        folders.push(RunFolder {
            path,
            name,
            json_files: count,
        });
    }
    folders.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(folders)
}

/// Load, extract and merge one folder into `store`.
///
/// With `config.cleanup` set, the folder's raw records are removed once the
/// merge has been persisted. A folder with no usable records is skipped and
/// is never cleaned.
pub fn process_folder(
    dir: &Path,
    config: &AggregateConfig,
    store: &Store,
) -> Result<FolderOutcome, BatchError> {
    let loaded = load_results(dir)?;
    let name = dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let run_id = run_id_for_folder(&name);
    let machine_name = config.resolve_machine_name();

    let mut outcome = FolderOutcome {
        folder: dir.to_path_buf(),
        run_id,
        machine_name,
        records: loaded.records.len(),
        unreadable_files: loaded.skipped.len(),
        status: FolderStatus::Skipped,
    };

    if loaded.is_empty() {
        tracing::warn!("no valid results in {}, skipping", dir.display());
        return Ok(outcome);
    }

    tracing::info!(
        "run {} on {}: {} records from {}",
        outcome.run_id,
        outcome.machine_name,
        outcome.records,
        dir.display()
    );
    let rows = extract_run(&loaded.records, &outcome.run_id, &outcome.machine_name);
    let report = store.merge_run(&rows)?;

    let cleanup = config.cleanup.then(|| cleanup_transient_files(dir));
    outcome.status = FolderStatus::Merged { report, cleanup };
    Ok(outcome)
}

/// Process every run-folder under the benchmarks root.
///
/// `on_folder` sees each outcome as soon as it is known. A store error stops
/// the batch; folders merged before it stay merged.
pub fn process_all<F>(config: &AggregateConfig, mut on_folder: F) -> Result<BatchReport, BatchError>
where
    F: FnMut(&FolderOutcome),
{
    let folders = list_run_folders(&config.benchmarks_dir)?;
    if folders.is_empty() {
        tracing::warn!(
            "no benchmark folders found in {}",
            config.benchmarks_dir.display()
        );
    }
    let store = Store::new(&config.store_path);

    let mut batch = BatchReport::default();
    for folder in &folders {
        let outcome = process_folder(&folder.path, config, &store)?;
        on_folder(&outcome);
        batch.outcomes.push(outcome);
    }
    tracing::info!(
        "processed {} folder(s), skipped {}",
        batch.processed(),
        batch.skipped()
    );
    Ok(batch)
}

/// Delete `*.json` directly inside `dir` and its `debug_images/` subtree.
/// Failures are collected and logged, never raised.
pub fn cleanup_transient_files(dir: &Path) -> CleanupReport {
    let mut report = CleanupReport::default();

    match json_files(dir) {
        Ok(files) => {
            for file in files {
                let name = file
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                match std::fs::remove_file(&file) {
                    Ok(()) => {
                        tracing::debug!("deleted {}", file.display());
                        report.removed_files.push(name);
                    }
                    Err(e) => {
                        tracing::warn!("could not delete {}: {}", file.display(), e);
                        report.failures.push(name);
                    }
                }
            }
        }
        Err(e) => {
            tracing::warn!("cleanup skipped for {}: {}", dir.display(), e);
            report.failures.push(dir.display().to_string());
        }
    }

    let debug_images = dir.join(DEBUG_IMAGES_DIR);
    if debug_images.exists() {
        match std::fs::remove_dir_all(&debug_images) {
            Ok(()) => report.removed_debug_images = true,
            Err(e) => {
                tracing::warn!("could not delete {}: {}", debug_images.display(), e);
                report.failures.push(format!("{}/", DEBUG_IMAGES_DIR));
            }
        }
    }
    report
}
