#![allow(deprecated)] // cargo_bin is deprecated but still supported by assert_cmd
//! Exit-code and output contract of the benchagg binary.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn benchagg(project_root: &Path) -> Command {
    let mut cmd = Command::cargo_bin("benchagg").expect("benchagg binary");
    cmd.env_remove("BENCHAGG_STORE")
        .env_remove("BENCHAGG_CONFIG")
        .env_remove("BENCHAGG_BENCHMARKS_DIR")
        .env("VIXEN_MACHINE_NAME", "ci-runner")
        .env("RUST_LOG", "warn")
        .arg("--project-root")
        .arg(project_root);
    cmd
}

fn write_record(dir: &Path, file: &str, pipeline: &str, frames: usize) {
    fs::create_dir_all(dir).expect("create input dir");
    let frames: Vec<_> = (0..frames)
        .map(|i| json!({ "frame_num": i, "frame_time_ms": 8.0, "fps": 125.0 }))
        .collect();
    let record = json!({
        "device": { "gpu": "RX 7900 XTX", "driver": "24.5.1", "vram_gb": 24 },
        "timestamp": "2025-05-20T08:30:00",
        "test_id": file.trim_end_matches(".json"),
        "configuration": {
            "pipeline": pipeline,
            "resolution": 64,
            "scene_type": "cornell",
            "shader": "voxel_trace"
        },
        "statistics": { "fps_mean": 125.0, "frame_time_mean": 8.0 },
        "frames": frames
    });
    fs::write(dir.join(file), serde_json::to_vec(&record).unwrap()).expect("write record");
}

fn row_count(db: &Path, table: &str) -> i64 {
    let conn = rusqlite::Connection::open(db).unwrap();
    conn.query_row(&format!("SELECT count(*) FROM \"{table}\""), [], |r| r.get(0))
        .unwrap()
}

#[test]
fn aggregate_missing_input_exits_1() {
    let tmp = tempdir().unwrap();
    benchagg(tmp.path())
        .args(["aggregate", "--input"])
        .arg(tmp.path().join("absent"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("input directory not found"));
    assert!(!tmp.path().join("data").join("benchmark_results.db").exists());
}

#[test]
fn aggregate_empty_input_exits_1() {
    let tmp = tempdir().unwrap();
    let input = tmp.path().join("benchmark_results");
    fs::create_dir_all(&input).unwrap();
    fs::write(input.join("broken.json"), "{").unwrap();
    benchagg(tmp.path())
        .arg("aggregate")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("no benchmark results found"));
}

#[test]
fn aggregate_writes_store_and_reports() {
    let tmp = tempdir().unwrap();
    let input = tmp.path().join("benchmark_results");
    write_record(&input, "rt_cornell.json", "hardware_rt", 10);
    write_record(&input, "mystery.json", "unknown", 10);

    let out = tmp.path().join("out").join("results.db");
    benchagg(tmp.path())
        .args(["aggregate", "--output"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("2 usable record(s)"))
        .stdout(predicate::str::contains("machine: ci-runner"))
        .stdout(predicate::str::contains("HW_RT_Frames: +9 row(s)"))
        .stdout(predicate::str::contains("merge: OK"));

    assert_eq!(row_count(&out, "Benchmarks"), 1);
    assert_eq!(row_count(&out, "Summary"), 1);
    assert_eq!(row_count(&out, "HW_RT_Frames"), 9);
    assert_eq!(row_count(&out, "Cross_Machine"), 1);
    // No cleanup requested.
    assert!(input.join("rt_cornell.json").exists());
}

#[test]
fn corrupt_store_is_fatal() {
    let tmp = tempdir().unwrap();
    write_record(&tmp.path().join("benchmark_results"), "t.json", "compute", 4);
    let store = tmp.path().join("bad.db");
    fs::write(&store, vec![0x5Au8; 4096]).unwrap();

    benchagg(tmp.path())
        .args(["aggregate", "--output"])
        .arg(&store)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("fatal"));
    assert_eq!(fs::read(&store).unwrap(), vec![0x5Au8; 4096]);
}

#[test]
fn process_all_with_nothing_to_do_exits_1() {
    let tmp = tempdir().unwrap();
    benchagg(tmp.path())
        .arg("process-all")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("No benchmark folders found"));
    assert!(tmp.path().join("data").join("benchmarks").is_dir());
}

#[test]
fn process_all_merges_folders_and_cleans_up() {
    let tmp = tempdir().unwrap();
    let root = tmp.path().join("data").join("benchmarks");
    write_record(&root.join("benchmark_001"), "a.json", "compute", 6);
    write_record(&root.join("benchmark_002"), "b.json", "fragment", 6);
    fs::create_dir_all(root.join("benchmark_002").join("debug_images")).unwrap();

    benchagg(tmp.path())
        .args(["process-all", "--cleanup"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 2 benchmark folder(s)"))
        .stdout(predicate::str::contains("Processed 2 benchmark folder(s), skipped 0"));

    let db = tmp.path().join("data").join("benchmark_results.db");
    assert_eq!(row_count(&db, "Benchmarks"), 2);
    assert_eq!(row_count(&db, "Compute_Frames"), 5);
    assert_eq!(row_count(&db, "Fragment_Frames"), 5);
    assert!(!root.join("benchmark_001").join("a.json").exists());
    assert!(!root.join("benchmark_002").join("debug_images").exists());
}

#[test]
fn list_reports_folders_with_counts() {
    let tmp = tempdir().unwrap();
    let root = tmp.path().join("data").join("benchmarks");
    write_record(&root.join("lab_a"), "a.json", "compute", 1);
    write_record(&root.join("lab_a"), "b.json", "compute", 1);
    fs::create_dir_all(root.join("no_json")).unwrap();

    benchagg(tmp.path())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("lab_a: 2 JSON files"))
        .stdout(predicate::str::contains("no_json").not());
}

#[test]
fn pack_and_unpack_round_trip() {
    let tmp = tempdir().unwrap();
    let folder = tmp.path().join("outgoing").join("benchmark_042");
    write_record(&folder, "a.json", "compute", 3);
    let archive = tmp.path().join("transfer.tar.gz");

    benchagg(tmp.path())
        .arg("pack")
        .arg(&folder)
        .arg("--output")
        .arg(&archive)
        .assert()
        .success()
        .stdout(predicate::str::contains("added: benchmark_042/a.json"));

    benchagg(tmp.path())
        .arg("unpack")
        .arg(&archive)
        .assert()
        .success()
        .stdout(predicate::str::contains("process-all"));

    let unpacked = tmp
        .path()
        .join("data")
        .join("benchmarks")
        .join("benchmark_042")
        .join("a.json");
    assert_eq!(
        fs::read(unpacked).unwrap(),
        fs::read(folder.join("a.json")).unwrap()
    );
}

#[test]
fn pack_missing_folder_exits_1() {
    let tmp = tempdir().unwrap();
    benchagg(tmp.path())
        .args(["pack", "does/not/exist"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn unpack_missing_archive_exits_1() {
    let tmp = tempdir().unwrap();
    benchagg(tmp.path())
        .arg("unpack")
        .arg(tmp.path().join("nope.tar.gz"))
        .assert()
        .code(1);
}
