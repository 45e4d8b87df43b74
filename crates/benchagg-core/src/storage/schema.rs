//! Relation layout of the store and schema validation.
//!
//! Relation and column names are a read contract for the chart generator;
//! changing them requires a matching consumer update.

use crate::errors::{StoreError, StoreResult};
use rusqlite::{Connection, OptionalExtension};

/// The named relations of the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    Benchmarks,
    Summary,
    HwRtFrames,
    ComputeFrames,
    FragmentFrames,
    CrossMachine,
}

const BENCHMARKS_COLUMNS: &[(&str, &str)] = &[
    ("benchmark_id", "TEXT"),
    ("machine_name", "TEXT"),
    ("gpu_name", "TEXT"),
    ("gpu_driver", "TEXT"),
    ("vram_gb", "REAL"),
    ("run_date", "TEXT"),
    ("total_tests", "INTEGER"),
    ("notes", "TEXT"),
];

const SUMMARY_COLUMNS: &[(&str, &str)] = &[
    ("benchmark_id", "TEXT"),
    ("test_id", "TEXT"),
    ("pipeline", "TEXT"),
    ("resolution", "INTEGER"),
    ("scene", "TEXT"),
    ("shader", "TEXT"),
    ("screen_width", "INTEGER"),
    ("screen_height", "INTEGER"),
    ("fps_mean", "REAL"),
    ("frame_time_mean_ms", "REAL"),
    ("frame_time_p99_ms", "REAL"),
    ("frame_time_stddev", "REAL"),
    ("bandwidth_mean_gbps", "REAL"),
];

const FRAME_COLUMNS: &[(&str, &str)] = &[
    ("benchmark_id", "TEXT"),
    ("test_id", "TEXT"),
    ("frame", "INTEGER"),
    ("frame_time_ms", "REAL"),
    ("fps", "REAL"),
    ("bandwidth_read_gbps", "REAL"),
    ("bandwidth_write_gbps", "REAL"),
    ("vram_mb", "REAL"),
    ("avg_voxels_per_ray", "REAL"),
    ("ray_throughput_mrays", "REAL"),
];

const CROSS_MACHINE_COLUMNS: &[(&str, &str)] = &[
    ("gpu_name", "TEXT"),
    ("pipeline", "TEXT"),
    ("avg_fps", "REAL"),
    ("min_fps", "REAL"),
    ("max_fps", "REAL"),
    ("avg_frame_time_ms", "REAL"),
    ("test_count", "INTEGER"),
];

impl Relation {
    pub const ALL: [Relation; 6] = [
        Relation::Benchmarks,
        Relation::Summary,
        Relation::HwRtFrames,
        Relation::ComputeFrames,
        Relation::FragmentFrames,
        Relation::CrossMachine,
    ];

    /// Relations that are appended to, never regenerated.
    pub const BASE: [Relation; 5] = [
        Relation::Benchmarks,
        Relation::Summary,
        Relation::HwRtFrames,
        Relation::ComputeFrames,
        Relation::FragmentFrames,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Relation::Benchmarks => "Benchmarks",
            Relation::Summary => "Summary",
            Relation::HwRtFrames => "HW_RT_Frames",
            Relation::ComputeFrames => "Compute_Frames",
            Relation::FragmentFrames => "Fragment_Frames",
            Relation::CrossMachine => "Cross_Machine",
        }
    }

    fn typed_columns(self) -> &'static [(&'static str, &'static str)] {
        match self {
            Relation::Benchmarks => BENCHMARKS_COLUMNS,
            Relation::Summary => SUMMARY_COLUMNS,
            Relation::HwRtFrames | Relation::ComputeFrames | Relation::FragmentFrames => {
                FRAME_COLUMNS
            }
            Relation::CrossMachine => CROSS_MACHINE_COLUMNS,
        }
    }

    /// The relation's header, in order.
    pub fn columns(self) -> Vec<&'static str> {
        self.typed_columns().iter().map(|(name, _)| *name).collect()
    }

    pub(crate) fn create_sql(self) -> String {
        let cols: Vec<String> = self
            .typed_columns()
            .iter()
            .map(|(name, ty)| format!("{} {}", name, ty))
            .collect();
        format!("CREATE TABLE \"{}\" ({})", self.name(), cols.join(", "))
    }

    pub(crate) fn insert_sql(self) -> String {
        let cols = self.columns();
        let placeholders: Vec<String> = (1..=cols.len()).map(|i| format!("?{}", i)).collect();
        format!(
            "INSERT INTO \"{}\" ({}) VALUES ({})",
            self.name(),
            cols.join(", "),
            placeholders.join(", ")
        )
    }
}

pub(crate) fn table_exists(conn: &Connection, relation: Relation) -> StoreResult<bool> {
    let found: Option<String> = conn
        .query_row(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?1",
            [relation.name()],
            |row| row.get(0),
        )
        .optional()?;
    Ok(found.is_some())
}

/// Ordered column names of a table; empty if the table does not exist.
pub(crate) fn get_columns(conn: &Connection, table: &str) -> StoreResult<Vec<String>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info(\"{}\")", table))?;
    let rows = stmt.query_map([], |row| row.get::<_, String>(1))?;
    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

/// Create the relation if it is missing. Returns true when it was created.
pub(crate) fn ensure_relation(conn: &Connection, relation: Relation) -> StoreResult<bool> {
    if table_exists(conn, relation)? {
        return Ok(false);
    }
    conn.execute(&relation.create_sql(), [])?;
    Ok(true)
}

/// Check that every base relation present in the store has exactly the
/// documented header.
pub(crate) fn validate_layout(conn: &Connection) -> StoreResult<()> {
    for relation in Relation::BASE {
        if !table_exists(conn, relation)? {
            continue;
        }
        let found = get_columns(conn, relation.name())?;
        let expected = relation.columns();
        if found != expected {
            return Err(StoreError::SchemaMismatch {
                relation: relation.name().to_string(),
                expected: expected.into_iter().map(String::from).collect(),
                found,
            });
        }
    }
    Ok(())
}
