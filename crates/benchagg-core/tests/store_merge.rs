mod common;

use benchagg_core::extract::extract_run;
use benchagg_core::loader::load_results;
use benchagg_core::model::{BenchmarkRecord, RunRows};
use benchagg_core::storage::{Relation, Store};
use common::{result_json, write_result};
use rusqlite::Connection;

fn rows_for(run_id: &str, records: &[BenchmarkRecord]) -> RunRows {
    extract_run(records, run_id, "lab-01")
}

fn record(test_id: &str, pipeline: &str, frames: usize) -> BenchmarkRecord {
    BenchmarkRecord::from_json(
        format!("{test_id}.json"),
        &result_json(test_id, pipeline, "cornell", frames),
    )
}

#[test]
fn end_to_end_folder_into_fresh_store() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let input = tmp.path().join("benchmark_results");
    write_result(&input, "a_rt.json", &result_json("rt_128", "hardware_rt", "cornell", 10))?;
    write_result(&input, "b_unknown.json", &result_json("x", "unknown", "cornell", 10))?;

    let loaded = load_results(&input)?;
    assert_eq!(loaded.records.len(), 2);

    let store = Store::new(tmp.path().join("data").join("benchmark_results.db"));
    let report = store.merge_run(&extract_run(&loaded.records, "run_0001", "lab-01"))?;
    assert!(report.created_store);
    assert_eq!(report.appended_to(Relation::HwRtFrames), 9);
    assert_eq!(report.cross_machine_rows, 1);

    let runs = store.benchmark_rows()?;
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].total_tests, 2);
    assert_eq!(runs[0].machine_name, "lab-01");

    let summary = store.summary_rows()?;
    assert_eq!(summary.len(), 1);
    assert_eq!(summary[0].test_id, "rt_128");

    let frames = store.frame_rows(Relation::HwRtFrames)?;
    assert_eq!(frames.len(), 9);
    assert!(frames.iter().all(|f| f.frame != 5));

    assert_eq!(store.row_count(Relation::ComputeFrames)?, None);
    assert_eq!(store.row_count(Relation::FragmentFrames)?, None);

    let cm = store.cross_machine_rows()?;
    assert_eq!(cm.len(), 1);
    assert_eq!(cm[0].gpu_name, "RTX 4090");
    assert_eq!(cm[0].pipeline, "hardware_rt");
    assert_eq!(cm[0].test_count, 1);
    Ok(())
}

#[test]
fn every_relation_has_the_documented_header() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let store = Store::new(tmp.path().join("s.db"));
    store.merge_run(&rows_for(
        "run1",
        &[
            record("rt", "hardware_rt", 4),
            record("cs", "compute", 4),
            record("fs", "fragment", 4),
        ],
    ))?;

    assert_eq!(store.relations()?, Relation::ALL.to_vec());
    for relation in Relation::ALL {
        assert_eq!(store.columns(relation)?, Some(
            relation.columns().into_iter().map(String::from).collect::<Vec<_>>()
        ));
    }
    assert_eq!(
        store.columns(Relation::Benchmarks)?.unwrap(),
        vec![
            "benchmark_id",
            "machine_name",
            "gpu_name",
            "gpu_driver",
            "vram_gb",
            "run_date",
            "total_tests",
            "notes"
        ]
    );
    Ok(())
}

#[test]
fn zero_row_merge_is_idempotent() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let store = Store::new(tmp.path().join("s.db"));

    let first = store.merge_run(&RunRows::default())?;
    assert!(first.created_store);
    assert_eq!(first.created_relations, vec!["Benchmarks", "Summary"]);
    assert_eq!(first.cross_machine_rows, 0);

    let second = store.merge_run(&RunRows::default())?;
    assert!(!second.created_store);
    assert!(second.created_relations.is_empty());

    assert_eq!(store.relations()?, vec![Relation::Benchmarks, Relation::Summary]);
    assert_eq!(store.row_count(Relation::Benchmarks)?, Some(0));
    assert_eq!(store.row_count(Relation::Summary)?, Some(0));
    Ok(())
}

#[test]
fn merges_append_after_existing_rows() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let store = Store::new(tmp.path().join("s.db"));

    store.merge_run(&rows_for("run_a", &[record("a1", "compute", 6), record("a2", "fragment", 6)]))?;
    let before_summary = store.summary_rows()?;
    let before_frames = store.frame_rows(Relation::ComputeFrames)?;

    store.merge_run(&rows_for("run_b", &[record("b1", "compute", 6)]))?;
    let after_summary = store.summary_rows()?;
    let after_frames = store.frame_rows(Relation::ComputeFrames)?;

    assert_eq!(after_summary.len(), before_summary.len() + 1);
    assert_eq!(&after_summary[..before_summary.len()], &before_summary[..]);
    assert_eq!(after_summary.last().unwrap().benchmark_id, "run_b");
    assert_eq!(&after_frames[..before_frames.len()], &before_frames[..]);
    assert_eq!(store.row_count(Relation::Benchmarks)?, Some(2));

    let cm = store.cross_machine_rows()?;
    let compute = cm.iter().find(|r| r.pipeline == "compute").unwrap();
    assert_eq!(compute.test_count, 2);
    Ok(())
}

#[test]
fn regeneration_is_deterministic() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let store = Store::new(tmp.path().join("s.db"));
    store.merge_run(&rows_for("run_a", &[record("a1", "compute", 3), record("a2", "hardware_rt", 3)]))?;
    store.merge_run(&rows_for("run_b", &[record("b1", "compute", 3)]))?;

    let merged = store.cross_machine_rows()?;
    assert_eq!(store.regenerate_cross_machine()?, merged.len());
    let once = store.cross_machine_rows()?;
    store.regenerate_cross_machine()?;
    let twice = store.cross_machine_rows()?;
    assert_eq!(merged, once);
    assert_eq!(once, twice);
    Ok(())
}

#[test]
fn corrupt_store_fails_and_is_left_untouched() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let path = tmp.path().join("s.db");
    let garbage = vec![b'x'; 4096];
    std::fs::write(&path, &garbage)?;

    let store = Store::new(&path);
    let err = store
        .merge_run(&rows_for("run1", &[record("t", "compute", 3)]))
        .unwrap_err();
    assert!(err.is_corruption(), "unexpected error: {err}");
    assert_eq!(std::fs::read(&path)?, garbage);
    Ok(())
}

#[test]
fn zero_byte_store_is_corrupt() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let path = tmp.path().join("s.db");
    std::fs::write(&path, b"")?;

    let store = Store::new(&path);
    let err = store
        .merge_run(&rows_for("run1", &[record("t", "compute", 3)]))
        .unwrap_err();
    assert!(err.is_corruption(), "unexpected error: {err}");
    assert_eq!(std::fs::metadata(&path)?.len(), 0);
    assert!(store.summary_rows().is_err());
    Ok(())
}

#[test]
fn foreign_database_without_base_relations_is_corrupt() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let path = tmp.path().join("s.db");
    {
        let conn = Connection::open(&path)?;
        conn.execute("CREATE TABLE settings (key TEXT, value TEXT)", [])?;
    }
    let before = std::fs::read(&path)?;

    let err = Store::new(&path)
        .merge_run(&rows_for("run1", &[record("t", "compute", 3)]))
        .unwrap_err();
    assert!(matches!(err, benchagg_core::StoreError::Corrupt { .. }));
    assert_eq!(std::fs::read(&path)?, before);
    Ok(())
}

#[test]
fn unexpected_header_fails_the_merge() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let path = tmp.path().join("s.db");
    {
        let conn = Connection::open(&path)?;
        conn.execute("CREATE TABLE Summary (benchmark_id TEXT, fps REAL)", [])?;
        conn.execute("INSERT INTO Summary VALUES ('old', 60.0)", [])?;
    }
    let before = std::fs::read(&path)?;

    let store = Store::new(&path);
    let err = store
        .merge_run(&rows_for("run1", &[record("t", "compute", 3)]))
        .unwrap_err();
    assert!(matches!(
        err,
        benchagg_core::StoreError::SchemaMismatch { ref relation, .. } if relation == "Summary"
    ));
    assert_eq!(std::fs::read(&path)?, before);
    Ok(())
}

#[test]
fn successful_merge_leaves_no_temporary_files() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let store = Store::new(tmp.path().join("s.db"));
    store.merge_run(&rows_for("run1", &[record("t", "compute", 3)]))?;
    store.merge_run(&rows_for("run2", &[record("t", "compute", 3)]))?;

    let names: Vec<String> = std::fs::read_dir(tmp.path())?
        .map(|e| e.map(|e| e.file_name().to_string_lossy().into_owned()))
        .collect::<Result<_, _>>()?;
    assert_eq!(names, vec!["s.db".to_string()]);
    Ok(())
}
