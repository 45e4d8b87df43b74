#![allow(dead_code)]

use serde_json::{json, Value};
use std::path::Path;

/// A harness result record with `frames` samples numbered from 0.
pub fn result_json(test_id: &str, pipeline: &str, scene: &str, frames: usize) -> Value {
    let frames: Vec<Value> = (0..frames)
        .map(|i| {
            json!({
                "frame_num": i,
                "frame_time_ms": 8.0 + i as f64 * 0.1,
                "fps": 120.0,
                "bandwidth_read_gbps": 40.5,
                "bandwidth_write_gbps": 12.25,
                "vram_mb": 2048.0,
                "avg_voxels_per_ray": 3.5,
                "ray_throughput_mrays": 900.0
            })
        })
        .collect();
    json!({
        "device": { "gpu": "RTX 4090", "driver": "560.94", "vram_gb": 24.0 },
        "timestamp": "2025-06-01T12:00:00",
        "test_id": test_id,
        "configuration": {
            "pipeline": pipeline,
            "resolution": 128,
            "scene_type": scene,
            "shader": "voxel_trace",
            "screen_width": 1920,
            "screen_height": 1080
        },
        "statistics": {
            "fps_mean": 118.4,
            "frame_time_mean": 8.45,
            "frame_time_p99": 11.2,
            "frame_time_stddev": 0.6,
            "bandwidth_mean": 52.0
        },
        "frames": frames
    })
}

pub fn write_result(dir: &Path, file: &str, value: &Value) -> anyhow::Result<()> {
    std::fs::create_dir_all(dir)?;
    std::fs::write(dir.join(file), serde_json::to_vec_pretty(value)?)?;
    Ok(())
}
