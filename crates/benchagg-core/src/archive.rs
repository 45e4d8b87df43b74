//! Archiver: moves a run-folder between machines as one `.tar.gz`.
//!
//! Entry paths are relative to the packed folder's parent, so the archive's
//! root entry is the folder's own name. Independent of the store.

use crate::errors::ArchiveError;
use flate2::read::GzDecoder;
use flate2::{Compression, GzBuilder};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Component, Path, PathBuf};

pub const ARCHIVE_EXTENSION: &str = "tar.gz";

/// Result of packing a folder.
#[derive(Debug, Clone)]
pub struct PackReport {
    pub archive: PathBuf,
    /// Archive-internal paths, in the order they were added.
    pub entries: Vec<String>,
    pub original_bytes: u64,
    pub compressed_bytes: u64,
}

impl PackReport {
    /// original / compressed; 0 when the archive is empty.
    pub fn compression_ratio(&self) -> f64 {
        if self.compressed_bytes == 0 {
            0.0
        } else {
            self.original_bytes as f64 / self.compressed_bytes as f64
        }
    }
}

/// `<parent>/<name>.tar.gz` beside the folder.
pub fn default_archive_path(source_dir: &Path) -> Result<PathBuf, ArchiveError> {
    let (parent, name) = split_dir(source_dir)?;
    Ok(parent.join(format!("{}.{}", name, ARCHIVE_EXTENSION)))
}

/// Pack every file under `source_dir` into a gzip-compressed tar.
pub fn pack(source_dir: &Path, output: Option<&Path>) -> Result<PackReport, ArchiveError> {
    if !source_dir.is_dir() {
        return Err(ArchiveError::NotFound {
            path: source_dir.to_path_buf(),
        });
    }
    let (parent, _) = split_dir(source_dir)?;
    let root = std::fs::canonicalize(source_dir).map_err(|e| ArchiveError::io(source_dir, e))?;
    let archive = match output {
        Some(p) => p.to_path_buf(),
        None => default_archive_path(source_dir)?,
    };

    let mut files = Vec::new();
    collect_files_recursive(&root, &mut files)?;
    files.sort();
    // An explicit output inside the folder must not swallow itself.
    let archive_abs = archive
        .parent()
        .map(|p| if p.as_os_str().is_empty() { Path::new(".") } else { p })
        .and_then(|p| std::fs::canonicalize(p).ok())
        .zip(archive.file_name())
        .map(|(dir, name)| dir.join(name));
    files.retain(|f| Some(f) != archive_abs.as_ref());

    tracing::info!("packing {} -> {}", source_dir.display(), archive.display());

    let out = File::create(&archive).map_err(|e| ArchiveError::io(&archive, e))?;
    let gz = GzBuilder::new()
        .mtime(0)
        .write(BufWriter::new(out), Compression::default());
    let mut tar = tar::Builder::new(gz);
    tar.mode(tar::HeaderMode::Deterministic);

    let mut entries = Vec::with_capacity(files.len());
    let mut original_bytes = 0u64;
    for file in &files {
        let rel = file
            .strip_prefix(&parent)
            .map_err(|_| ArchiveError::InvalidPath(file.display().to_string()))?;
        let name = to_posix(rel);
        tar.append_path_with_name(file, &name)
            .map_err(|e| ArchiveError::io(file, e))?;
        original_bytes += std::fs::metadata(file)
            .map_err(|e| ArchiveError::io(file, e))?
            .len();
        tracing::debug!("added {}", name);
        entries.push(name);
    }

    let gz = tar.into_inner().map_err(|e| ArchiveError::io(&archive, e))?;
    let writer = gz.finish().map_err(|e| ArchiveError::io(&archive, e))?;
    writer
        .into_inner()
        .map_err(|e| ArchiveError::io(&archive, e.into_error()))?
        .sync_all()
        .map_err(|e| ArchiveError::io(&archive, e))?;

    let compressed_bytes = std::fs::metadata(&archive)
        .map_err(|e| ArchiveError::io(&archive, e))?
        .len();

    Ok(PackReport {
        archive,
        entries,
        original_bytes,
        compressed_bytes,
    })
}

/// Extract `archive` beneath `target_dir` and return the extracted run-folder.
///
/// The folder is the first top-level component among nested entries; if no
/// entry is nested, `target_dir` itself is returned. Nothing is cleaned up if
/// extraction fails half-way.
pub fn unpack(archive: &Path, target_dir: &Path) -> Result<PathBuf, ArchiveError> {
    if !archive.is_file() {
        return Err(ArchiveError::NotFound {
            path: archive.to_path_buf(),
        });
    }
    std::fs::create_dir_all(target_dir).map_err(|e| ArchiveError::io(target_dir, e))?;
    tracing::info!("unpacking {} -> {}", archive.display(), target_dir.display());

    let file = File::open(archive).map_err(|e| ArchiveError::io(archive, e))?;
    let mut tar = tar::Archive::new(GzDecoder::new(file));
    let mut root: Option<PathBuf> = None;

    for entry in tar.entries().map_err(|e| ArchiveError::io(archive, e))? {
        let mut entry = entry.map_err(|e| ArchiveError::io(archive, e))?;
        let path = entry
            .path()
            .map_err(|e| ArchiveError::io(archive, e))?
            .into_owned();

        if root.is_none() {
            let mut normal = path.components().filter_map(|c| match c {
                Component::Normal(s) => Some(s),
                _ => None,
            });
            if let (Some(first), Some(_)) = (normal.next(), normal.next()) {
                root = Some(PathBuf::from(first));
            }
        }

        let unpacked = entry
            .unpack_in(target_dir)
            .map_err(|e| ArchiveError::io(target_dir, e))?;
        if !unpacked {
            return Err(ArchiveError::InvalidPath(path.display().to_string()));
        }
    }

    let extracted = match root {
        Some(r) => target_dir.join(r),
        None => target_dir.to_path_buf(),
    };
    tracing::info!("extracted to {}", extracted.display());
    Ok(extracted)
}

/// Canonical parent directory and folder name of `dir`.
fn split_dir(dir: &Path) -> Result<(PathBuf, String), ArchiveError> {
    let abs = std::fs::canonicalize(dir).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ArchiveError::NotFound {
            path: dir.to_path_buf(),
        },
        _ => ArchiveError::io(dir, e),
    })?;
    let name = abs
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| ArchiveError::InvalidPath(dir.display().to_string()))?;
    let parent = abs
        .parent()
        .map(Path::to_path_buf)
        .ok_or_else(|| ArchiveError::InvalidPath(dir.display().to_string()))?;
    Ok((parent, name))
}

fn collect_files_recursive(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), ArchiveError> {
    for entry in std::fs::read_dir(dir).map_err(|e| ArchiveError::io(dir, e))? {
        let entry = entry.map_err(|e| ArchiveError::io(dir, e))?;
        let path = entry.path();
        let ft = entry.file_type().map_err(|e| ArchiveError::io(&path, e))?;
        if ft.is_dir() {
            collect_files_recursive(&path, out)?;
        } else if ft.is_file() {
            out.push(path);
        }
    }
    Ok(())
}

fn to_posix(rel: &Path) -> String {
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
