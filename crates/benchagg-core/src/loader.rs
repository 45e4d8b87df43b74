//! Record Loader: reads a directory of `*.json` result files.
//!
//! A file that cannot be read or parsed is skipped with a warning; it never
//! aborts the batch.

use crate::errors::LoadError;
use crate::model::BenchmarkRecord;
use std::path::{Path, PathBuf};

/// Outcome of loading one directory.
#[derive(Debug, Default)]
pub struct LoadedRun {
    /// Parsed records in lexical file-name order.
    pub records: Vec<BenchmarkRecord>,
    /// Files that were found but could not be used, with the reason.
    pub skipped: Vec<(PathBuf, String)>,
}

impl LoadedRun {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// List the `*.json` files directly inside `dir`, sorted by file name.
pub fn json_files(dir: &Path) -> Result<Vec<PathBuf>, LoadError> {
    if !dir.is_dir() {
        return Err(LoadError::NotFound {
            path: dir.to_path_buf(),
        });
    }
    let rd = std::fs::read_dir(dir).map_err(|source| LoadError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    let mut out = Vec::new();
    for entry in rd {
        let entry = entry.map_err(|source| LoadError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path.is_file() && path.extension().and_then(|e| e.to_str()) == Some("json") {
            out.push(path);
        }
    }
    out.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(out)
}

/// Load every result record in `dir`.
pub fn load_results(dir: &Path) -> Result<LoadedRun, LoadError> {
    let files = json_files(dir)?;
    tracing::info!("found {} JSON files in {}", files.len(), dir.display());

    let mut run = LoadedRun::default();
    for path in files {
        match load_one(&path) {
            Ok(record) => run.records.push(record),
            Err(reason) => {
                tracing::warn!("could not load {}: {}", path.display(), reason);
                run.skipped.push((path, reason));
            }
        }
    }
    Ok(run)
}

fn load_one(path: &Path) -> Result<BenchmarkRecord, String> {
    let bytes = std::fs::read(path).map_err(|e| e.to_string())?;
    let value: serde_json::Value = serde_json::from_slice(&bytes).map_err(|e| e.to_string())?;
    if !value.is_object() {
        return Err("top-level value is not a JSON object".to_string());
    }
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    tracing::debug!("loaded {}", name);
    Ok(BenchmarkRecord::from_json(name, &value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn loads_in_file_name_order_and_skips_malformed() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        fs::write(dir.path().join("b.json"), r#"{"test_id": "second"}"#)?;
        fs::write(dir.path().join("a.json"), r#"{"test_id": "first"}"#)?;
        fs::write(dir.path().join("broken.json"), "{ not json")?;
        fs::write(dir.path().join("list.json"), "[1, 2]")?;
        fs::write(dir.path().join("notes.txt"), "ignored")?;
        fs::create_dir(dir.path().join("debug_images"))?;

        let run = load_results(dir.path())?;
        let ids: Vec<_> = run.records.iter().map(|r| r.test_id.as_str()).collect();
        assert_eq!(ids, vec!["first", "second"]);
        assert_eq!(run.records[0].source_file, "a.json");
        assert_eq!(run.skipped.len(), 2);
        Ok(())
    }

    #[test]
    fn missing_directory_is_not_found() {
        let err = load_results(Path::new("/definitely/not/here")).unwrap_err();
        assert!(matches!(err, LoadError::NotFound { .. }));
    }
}
