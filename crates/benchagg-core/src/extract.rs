//! Field Extractor: pure mappings from loaded records to store rows.
//!
//! None of these functions fail. Missing data has already been defaulted by
//! [`BenchmarkRecord::from_json`]; here we only filter and reshape.

use crate::model::{
    BenchmarkRecord, BenchmarkRunRow, FrameSampleRow, FrameSets, Pipeline, RunRows,
    TestSummaryRow,
};

/// Build the single `Benchmarks` row for a run.
///
/// Device metadata comes from the first record. `run_date` is the earliest
/// record timestamp, or now if no record carries one. `total_tests` counts
/// every loaded record, including those later dropped from `Summary`.
pub fn extract_benchmark_metadata(
    records: &[BenchmarkRecord],
    benchmark_id: &str,
    machine_name: &str,
) -> Option<BenchmarkRunRow> {
    let first = records.first()?;
    let run_date = records
        .iter()
        .filter_map(|r| r.timestamp.as_deref())
        .min()
        .map(String::from)
        .unwrap_or_else(|| chrono::Utc::now().to_rfc3339());

    Some(BenchmarkRunRow {
        benchmark_id: benchmark_id.to_string(),
        machine_name: machine_name.to_string(),
        gpu_name: first.device.gpu.clone(),
        gpu_driver: first.device.driver.clone(),
        vram_gb: first.device.vram_gb,
        run_date,
        total_tests: records.len() as i64,
        notes: String::new(),
    })
}

/// Build `Summary` rows, dropping tests with an unknown pipeline or scene,
/// sorted by (pipeline, resolution, scene).
pub fn extract_summary(records: &[BenchmarkRecord], benchmark_id: &str) -> Vec<TestSummaryRow> {
    let mut rows: Vec<TestSummaryRow> = records
        .iter()
        .filter(|r| !is_filtered_out(r))
        .map(|r| {
            let c = &r.configuration;
            let s = &r.statistics;
            TestSummaryRow {
                benchmark_id: benchmark_id.to_string(),
                test_id: r.test_id.clone(),
                pipeline: c.pipeline.as_str().to_string(),
                resolution: c.resolution,
                scene: c.scene_type.clone(),
                shader: c.shader.clone(),
                screen_width: c.screen_width,
                screen_height: c.screen_height,
                fps_mean: s.fps_mean,
                frame_time_mean_ms: s.frame_time_mean,
                frame_time_p99_ms: s.frame_time_p99,
                frame_time_stddev: s.frame_time_stddev,
                bandwidth_mean_gbps: s.bandwidth_mean,
            }
        })
        .collect();

    rows.sort_by(|a, b| {
        a.pipeline
            .cmp(&b.pipeline)
            .then(a.resolution.cmp(&b.resolution))
            .then_with(|| a.scene.cmp(&b.scene))
    });
    rows
}

/// Index of the frame coinciding with the harness's debug capture.
pub fn capture_frame_index(sample_count: usize) -> i64 {
    (sample_count / 2) as i64
}

/// Build per-pipeline frame rows.
///
/// The frame whose `frame_num` equals `len(frames) / 2` is the debug-capture
/// frame and is always excluded. Records with an unknown scene, or with a
/// pipeline that has no frame relation, are skipped entirely.
pub fn extract_frames_by_pipeline(records: &[BenchmarkRecord], benchmark_id: &str) -> FrameSets {
    let mut sets = FrameSets::default();

    for record in records.iter().filter(|r| !r.scene_is_unknown()) {
        let target = match &record.configuration.pipeline {
            Pipeline::HardwareRt => &mut sets.hardware_rt,
            Pipeline::Compute => &mut sets.compute,
            Pipeline::Fragment => &mut sets.fragment,
            Pipeline::Other(_) | Pipeline::Unknown => continue,
        };
        let capture = capture_frame_index(record.frames.len());

        target.extend(
            record
                .frames
                .iter()
                .filter(|f| f.frame_num != capture)
                .map(|f| FrameSampleRow {
                    benchmark_id: benchmark_id.to_string(),
                    test_id: record.test_id.clone(),
                    frame: f.frame_num,
                    frame_time_ms: f.frame_time_ms,
                    fps: f.fps,
                    bandwidth_read_gbps: f.bandwidth_read_gbps,
                    bandwidth_write_gbps: f.bandwidth_write_gbps,
                    vram_mb: f.vram_mb,
                    avg_voxels_per_ray: f.avg_voxels_per_ray,
                    ray_throughput_mrays: f.ray_throughput_mrays,
                }),
        );
    }
    sets
}

/// Run all three extractors for one run.
pub fn extract_run(records: &[BenchmarkRecord], benchmark_id: &str, machine_name: &str) -> RunRows {
    RunRows {
        benchmark: extract_benchmark_metadata(records, benchmark_id, machine_name),
        summary: extract_summary(records, benchmark_id),
        frames: extract_frames_by_pipeline(records, benchmark_id),
    }
}

/// True when the record would produce no `Summary` row.
pub fn is_filtered_out(record: &BenchmarkRecord) -> bool {
    record.configuration.pipeline.is_unknown() || record.scene_is_unknown()
}
