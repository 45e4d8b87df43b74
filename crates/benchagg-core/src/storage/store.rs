//! Store Manager: merges one run's rows into the persistent store.
//!
//! A merge never edits the store in place. The current file is copied to a
//! temporary sibling, all writes happen in one transaction on the copy, and
//! the copy is renamed over the store path. A reader therefore sees either
//! the previous store or the store with the whole run, never a partial run.

use super::cross_machine;
use super::schema::{ensure_relation, get_columns, table_exists, validate_layout, Relation};
use crate::errors::{StoreError, StoreResult};
use crate::model::{BenchmarkRunRow, CrossMachineRow, FrameSampleRow, RunRows, TestSummaryRow};
use rusqlite::{params, Connection, OpenFlags, Transaction};
use std::path::{Path, PathBuf};

/// What a merge did to each relation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// True when the store file did not exist before the merge.
    pub created_store: bool,
    /// Relations created by this merge.
    pub created_relations: Vec<&'static str>,
    /// (relation, rows appended) for every relation written to.
    pub appended: Vec<(&'static str, usize)>,
    /// Rows in the regenerated `Cross_Machine`; 0 when it was omitted.
    pub cross_machine_rows: usize,
}

impl MergeReport {
    pub fn appended_to(&self, relation: Relation) -> usize {
        self.appended
            .iter()
            .find(|(name, _)| *name == relation.name())
            .map(|(_, n)| *n)
            .unwrap_or(0)
    }
}

/// Handle to a store file. Cheap; connections are opened per operation.
#[derive(Debug, Clone)]
pub struct Store {
    path: PathBuf,
}

impl Store {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Merge a run into the store, creating the store if it is absent.
    ///
    /// An existing store that is unreadable or whose base relations have an
    /// unexpected header fails the merge before anything is written.
    pub fn merge_run(&self, rows: &RunRows) -> StoreResult<MergeReport> {
        let created_store = !self.exists();
        if created_store {
            tracing::info!("creating new store: {}", self.path.display());
        } else {
            tracing::info!("appending to existing store: {}", self.path.display());
            drop(self.open_existing()?);
        }

        let parent = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&parent).map_err(|e| StoreError::io(&parent, e))?;

        let tmp = tempfile::Builder::new()
            .prefix(".benchagg-")
            .suffix(".tmp")
            .tempfile_in(&parent)
            .map_err(|e| StoreError::io(&parent, e))?;
        if !created_store {
            std::fs::copy(&self.path, tmp.path()).map_err(|e| StoreError::io(&self.path, e))?;
        }

        let mut report = MergeReport {
            created_store,
            ..MergeReport::default()
        };
        {
            let mut conn = Connection::open(tmp.path())?;
            let tx = conn.transaction()?;
            write_run(&tx, rows, &mut report)?;
            report.cross_machine_rows = cross_machine::regenerate(&tx)?;
            tx.commit()?;
            conn.close().map_err(|(_, e)| StoreError::Sqlite(e))?;
        }

        tmp.persist(&self.path)
            .map_err(|e| StoreError::io(&self.path, e.error))?;
        tracing::info!("store saved: {}", self.path.display());
        Ok(report)
    }

    /// Drop and rebuild `Cross_Machine` from the current base relations.
    pub fn regenerate_cross_machine(&self) -> StoreResult<usize> {
        if !self.exists() {
            return Ok(0);
        }
        drop(self.open_existing()?);
        let parent = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        let tmp = tempfile::NamedTempFile::new_in(parent).map_err(|e| StoreError::io(parent, e))?;
        std::fs::copy(&self.path, tmp.path()).map_err(|e| StoreError::io(&self.path, e))?;
        let written = {
            let mut conn = Connection::open(tmp.path())?;
            let tx = conn.transaction()?;
            let n = cross_machine::regenerate(&tx)?;
            tx.commit()?;
            conn.close().map_err(|(_, e)| StoreError::Sqlite(e))?;
            n
        };
        tmp.persist(&self.path)
            .map_err(|e| StoreError::io(&self.path, e.error))?;
        Ok(written)
    }

    /// Open an existing store read-only and validate its layout.
    ///
    /// A store that exists must be a database this tool wrote: non-empty,
    /// and holding `Benchmarks` and `Summary` with their documented headers.
    pub fn open_existing(&self) -> StoreResult<Connection> {
        let meta = std::fs::metadata(&self.path).map_err(|e| StoreError::io(&self.path, e))?;
        if !meta.is_file() {
            return Err(self.corrupt_because("not a regular file"));
        }
        // SQLite happily treats a zero-byte file as an empty database.
        if meta.len() == 0 {
            return Err(self.corrupt_because("file is empty"));
        }
        let conn = Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| self.corrupt(e))?;
        // The first real read is where SQLite notices a non-database file.
        conn.query_row("SELECT count(*) FROM sqlite_master", [], |r| r.get::<_, i64>(0))
            .map_err(|e| self.corrupt(e))?;
        validate_layout(&conn)?;
        for relation in [Relation::Benchmarks, Relation::Summary] {
            if !table_exists(&conn, relation)? {
                return Err(self.corrupt_because(&format!(
                    "relation {} is missing",
                    relation.name()
                )));
            }
        }
        Ok(conn)
    }

    fn corrupt(&self, e: rusqlite::Error) -> StoreError {
        self.corrupt_because(&e.to_string())
    }

    fn corrupt_because(&self, reason: &str) -> StoreError {
        StoreError::Corrupt {
            path: self.path.clone(),
            reason: reason.to_string(),
        }
    }

    /// Names of the relations present in the store, in [`Relation::ALL`] order.
    pub fn relations(&self) -> StoreResult<Vec<Relation>> {
        let Some(conn) = self.open_if_exists()? else {
            return Ok(Vec::new());
        };
        let mut out = Vec::new();
        for relation in Relation::ALL {
            if table_exists(&conn, relation)? {
                out.push(relation);
            }
        }
        Ok(out)
    }

    /// Header of a relation, or `None` if the relation is absent.
    pub fn columns(&self, relation: Relation) -> StoreResult<Option<Vec<String>>> {
        let Some(conn) = self.open_if_exists()? else {
            return Ok(None);
        };
        if !table_exists(&conn, relation)? {
            return Ok(None);
        }
        Ok(Some(get_columns(&conn, relation.name())?))
    }

    /// Row count of a relation, or `None` if the relation is absent.
    pub fn row_count(&self, relation: Relation) -> StoreResult<Option<usize>> {
        let Some(conn) = self.open_if_exists()? else {
            return Ok(None);
        };
        if !table_exists(&conn, relation)? {
            return Ok(None);
        }
        let n: i64 = conn.query_row(
            &format!("SELECT count(*) FROM \"{}\"", relation.name()),
            [],
            |r| r.get(0),
        )?;
        Ok(Some(n as usize))
    }

    pub fn benchmark_rows(&self) -> StoreResult<Vec<BenchmarkRunRow>> {
        self.read_rows(Relation::Benchmarks, |row| {
            Ok(BenchmarkRunRow {
                benchmark_id: row.get(0)?,
                machine_name: row.get(1)?,
                gpu_name: row.get(2)?,
                gpu_driver: row.get(3)?,
                vram_gb: row.get(4)?,
                run_date: row.get(5)?,
                total_tests: row.get(6)?,
                notes: row.get(7)?,
            })
        })
    }

    pub fn summary_rows(&self) -> StoreResult<Vec<TestSummaryRow>> {
        self.read_rows(Relation::Summary, |row| {
            Ok(TestSummaryRow {
                benchmark_id: row.get(0)?,
                test_id: row.get(1)?,
                pipeline: row.get(2)?,
                resolution: row.get(3)?,
                scene: row.get(4)?,
                shader: row.get(5)?,
                screen_width: row.get(6)?,
                screen_height: row.get(7)?,
                fps_mean: row.get(8)?,
                frame_time_mean_ms: row.get(9)?,
                frame_time_p99_ms: row.get(10)?,
                frame_time_stddev: row.get(11)?,
                bandwidth_mean_gbps: row.get(12)?,
            })
        })
    }

    pub fn frame_rows(&self, relation: Relation) -> StoreResult<Vec<FrameSampleRow>> {
        self.read_rows(relation, |row| {
            Ok(FrameSampleRow {
                benchmark_id: row.get(0)?,
                test_id: row.get(1)?,
                frame: row.get(2)?,
                frame_time_ms: row.get(3)?,
                fps: row.get(4)?,
                bandwidth_read_gbps: row.get(5)?,
                bandwidth_write_gbps: row.get(6)?,
                vram_mb: row.get(7)?,
                avg_voxels_per_ray: row.get(8)?,
                ray_throughput_mrays: row.get(9)?,
            })
        })
    }

    pub fn cross_machine_rows(&self) -> StoreResult<Vec<CrossMachineRow>> {
        self.read_rows(Relation::CrossMachine, |row| {
            Ok(CrossMachineRow {
                gpu_name: row.get(0)?,
                pipeline: row.get(1)?,
                avg_fps: row.get(2)?,
                min_fps: row.get(3)?,
                max_fps: row.get(4)?,
                avg_frame_time_ms: row.get(5)?,
                test_count: row.get(6)?,
            })
        })
    }

    fn open_if_exists(&self) -> StoreResult<Option<Connection>> {
        if !self.exists() {
            return Ok(None);
        }
        self.open_existing().map(Some)
    }

    fn read_rows<T, F>(&self, relation: Relation, map: F) -> StoreResult<Vec<T>>
    where
        F: FnMut(&rusqlite::Row<'_>) -> rusqlite::Result<T>,
    {
        let Some(conn) = self.open_if_exists()? else {
            return Ok(Vec::new());
        };
        if !table_exists(&conn, relation)? {
            return Ok(Vec::new());
        }
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM \"{}\" ORDER BY rowid ASC",
            relation.columns().join(", "),
            relation.name()
        ))?;
        let rows = stmt.query_map([], map)?.collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

fn write_run(tx: &Transaction<'_>, rows: &RunRows, report: &mut MergeReport) -> StoreResult<()> {
    // Benchmarks and Summary always exist after a merge, even when empty.
    if ensure_relation(tx, Relation::Benchmarks)? {
        report.created_relations.push(Relation::Benchmarks.name());
    }
    let mut n = 0;
    if let Some(b) = &rows.benchmark {
        tx.execute(
            &Relation::Benchmarks.insert_sql(),
            params![
                b.benchmark_id,
                b.machine_name,
                b.gpu_name,
                b.gpu_driver,
                b.vram_gb,
                b.run_date,
                b.total_tests,
                b.notes,
            ],
        )?;
        n = 1;
    }
    report.appended.push((Relation::Benchmarks.name(), n));

    if ensure_relation(tx, Relation::Summary)? {
        report.created_relations.push(Relation::Summary.name());
    }
    {
        let mut stmt = tx.prepare(&Relation::Summary.insert_sql())?;
        for s in &rows.summary {
            stmt.execute(params![
                s.benchmark_id,
                s.test_id,
                s.pipeline,
                s.resolution,
                s.scene,
                s.shader,
                s.screen_width,
                s.screen_height,
                s.fps_mean,
                s.frame_time_mean_ms,
                s.frame_time_p99_ms,
                s.frame_time_stddev,
                s.bandwidth_mean_gbps,
            ])?;
        }
    }
    report
        .appended
        .push((Relation::Summary.name(), rows.summary.len()));

    let frame_sets = [
        (Relation::HwRtFrames, &rows.frames.hardware_rt),
        (Relation::ComputeFrames, &rows.frames.compute),
        (Relation::FragmentFrames, &rows.frames.fragment),
    ];
    for (relation, frames) in frame_sets {
        // Frame relations only come into existence with their first rows.
        if frames.is_empty() {
            continue;
        }
        if ensure_relation(tx, relation)? {
            report.created_relations.push(relation.name());
        }
        let mut stmt = tx.prepare(&relation.insert_sql())?;
        for f in frames.iter() {
            stmt.execute(params![
                f.benchmark_id,
                f.test_id,
                f.frame,
                f.frame_time_ms,
                f.fps,
                f.bandwidth_read_gbps,
                f.bandwidth_write_gbps,
                f.vram_mb,
                f.avg_voxels_per_ray,
                f.ray_throughput_mrays,
            ])?;
        }
        report.appended.push((relation.name(), frames.len()));
    }
    Ok(())
}
