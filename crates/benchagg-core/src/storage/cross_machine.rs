//! Derived `Cross_Machine` relation.
//!
//! Always rebuilt wholesale from `Summary` joined to `Benchmarks`; never
//! updated incrementally.

use super::schema::{ensure_relation, table_exists, Relation};
use crate::errors::StoreResult;
use crate::model::CrossMachineRow;
use rusqlite::{params, Connection};
use std::collections::BTreeMap;

/// A `Summary` row with the GPU of the run it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinedSummary {
    pub gpu_name: String,
    pub pipeline: String,
    pub fps_mean: f64,
    pub frame_time_mean_ms: f64,
}

#[derive(Default)]
struct Acc {
    fps_sum: f64,
    fps_min: f64,
    fps_max: f64,
    frame_time_sum: f64,
    count: i64,
}

/// Group by (gpu_name, pipeline). Output is ordered by the group key and
/// values are rounded to 2 decimals.
pub fn aggregate(rows: &[JoinedSummary]) -> Vec<CrossMachineRow> {
    let mut groups: BTreeMap<(&str, &str), Acc> = BTreeMap::new();
    for r in rows {
        let acc = groups
            .entry((r.gpu_name.as_str(), r.pipeline.as_str()))
            .or_default();
        if acc.count == 0 {
            acc.fps_min = r.fps_mean;
            acc.fps_max = r.fps_mean;
        } else {
            acc.fps_min = acc.fps_min.min(r.fps_mean);
            acc.fps_max = acc.fps_max.max(r.fps_mean);
        }
        acc.fps_sum += r.fps_mean;
        acc.frame_time_sum += r.frame_time_mean_ms;
        acc.count += 1;
    }

    groups
        .into_iter()
        .map(|((gpu, pipeline), acc)| {
            let n = acc.count as f64;
            CrossMachineRow {
                gpu_name: gpu.to_string(),
                pipeline: pipeline.to_string(),
                avg_fps: round2(acc.fps_sum / n),
                min_fps: round2(acc.fps_min),
                max_fps: round2(acc.fps_max),
                avg_frame_time_ms: round2(acc.frame_time_sum / n),
                test_count: acc.count,
            }
        })
        .collect()
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round_ties_even() / 100.0
}

/// Summary rows joined to their run. Rows without a matching run (or with a
/// NULL GPU/pipeline) are left out.
pub(crate) fn load_joined(conn: &Connection) -> StoreResult<Vec<JoinedSummary>> {
    if !table_exists(conn, Relation::Summary)? || !table_exists(conn, Relation::Benchmarks)? {
        return Ok(Vec::new());
    }
    let mut stmt = conn.prepare(
        "SELECT b.gpu_name, s.pipeline, s.fps_mean, s.frame_time_mean_ms
         FROM \"Summary\" s
         JOIN \"Benchmarks\" b ON s.benchmark_id = b.benchmark_id
         WHERE b.gpu_name IS NOT NULL AND s.pipeline IS NOT NULL
         ORDER BY s.rowid ASC",
    )?;
    let rows = stmt
        .query_map([], |row| {
            Ok(JoinedSummary {
                gpu_name: row.get(0)?,
                pipeline: row.get(1)?,
                fps_mean: row.get::<_, Option<f64>>(2)?.unwrap_or(0.0),
                frame_time_mean_ms: row.get::<_, Option<f64>>(3)?.unwrap_or(0.0),
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Drop and rebuild `Cross_Machine`. When the join is empty the relation is
/// left absent. Returns the number of rows written.
pub(crate) fn regenerate(conn: &Connection) -> StoreResult<usize> {
    conn.execute(
        &format!("DROP TABLE IF EXISTS \"{}\"", Relation::CrossMachine.name()),
        [],
    )?;

    let rows = aggregate(&load_joined(conn)?);
    if rows.is_empty() {
        tracing::info!("no joinable summary rows; Cross_Machine omitted");
        return Ok(0);
    }

    ensure_relation(conn, Relation::CrossMachine)?;
    let mut stmt = conn.prepare(&Relation::CrossMachine.insert_sql())?;
    for r in &rows {
        stmt.execute(params![
            r.gpu_name,
            r.pipeline,
            r.avg_fps,
            r.min_fps,
            r.max_fps,
            r.avg_frame_time_ms,
            r.test_count,
        ])?;
    }
    Ok(rows.len())
}
