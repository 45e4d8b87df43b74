//! Fully-defaulted view of one harness result record.
//!
//! The harness output is loosely shaped: any field may be missing or carry
//! an unexpected type. [`BenchmarkRecord::from_json`] is the single place
//! where absence is resolved; everything downstream sees concrete values.

use serde_json::Value;
use std::fmt;

/// Sentinel used for absent categorical/string fields.
pub const UNKNOWN: &str = "unknown";

/// Rendering technique under test.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Pipeline {
    HardwareRt,
    Compute,
    Fragment,
    /// A named pipeline this tool has no frame relation for.
    Other(String),
    Unknown,
}

impl Pipeline {
    pub fn parse(s: &str) -> Self {
        match s {
            "hardware_rt" => Self::HardwareRt,
            "compute" => Self::Compute,
            "fragment" => Self::Fragment,
            "" | UNKNOWN => Self::Unknown,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::HardwareRt => "hardware_rt",
            Self::Compute => "compute",
            Self::Fragment => "fragment",
            Self::Other(name) => name,
            Self::Unknown => UNKNOWN,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }
}

impl fmt::Display for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeviceInfo {
    pub gpu: String,
    pub driver: String,
    pub vram_gb: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TestConfiguration {
    pub pipeline: Pipeline,
    pub resolution: i64,
    pub scene_type: String,
    pub shader: String,
    pub screen_width: i64,
    pub screen_height: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TestStatistics {
    pub fps_mean: f64,
    pub frame_time_mean: f64,
    pub frame_time_p99: f64,
    pub frame_time_stddev: f64,
    pub bandwidth_mean: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FrameRecord {
    pub frame_num: i64,
    pub frame_time_ms: f64,
    pub fps: f64,
    pub bandwidth_read_gbps: f64,
    pub bandwidth_write_gbps: f64,
    pub vram_mb: f64,
    pub avg_voxels_per_ray: f64,
    pub ray_throughput_mrays: f64,
}

/// One test's result, as produced by the harness.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkRecord {
    /// File name the record was loaded from.
    pub source_file: String,
    pub device: DeviceInfo,
    /// `None` when absent or empty.
    pub timestamp: Option<String>,
    pub test_id: String,
    pub configuration: TestConfiguration,
    pub statistics: TestStatistics,
    pub frames: Vec<FrameRecord>,
}

impl BenchmarkRecord {
    /// Map a parsed JSON object into a record. Total: never fails, wrong
    /// types are treated as absent.
    pub fn from_json(source_file: impl Into<String>, v: &Value) -> Self {
        let device = section(v, "device");
        let config = section(v, "configuration");
        let stats = section(v, "statistics");

        let frames = v
            .get("frames")
            .and_then(Value::as_array)
            .map(|arr| arr.iter().map(FrameRecord::from_json).collect())
            .unwrap_or_default();

        Self {
            source_file: source_file.into(),
            device: DeviceInfo {
                gpu: str_or_unknown(device, "gpu"),
                driver: str_or_unknown(device, "driver"),
                vram_gb: num(device, "vram_gb"),
            },
            timestamp: v
                .get("timestamp")
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(String::from),
            test_id: str_or_unknown(Some(v), "test_id"),
            configuration: TestConfiguration {
                pipeline: Pipeline::parse(&str_or_unknown(config, "pipeline")),
                resolution: int(config, "resolution"),
                scene_type: str_or_unknown(config, "scene_type"),
                shader: str_or_unknown(config, "shader"),
                screen_width: int(config, "screen_width"),
                screen_height: int(config, "screen_height"),
            },
            statistics: TestStatistics {
                fps_mean: num(stats, "fps_mean"),
                frame_time_mean: num(stats, "frame_time_mean"),
                frame_time_p99: num(stats, "frame_time_p99"),
                frame_time_stddev: num(stats, "frame_time_stddev"),
                bandwidth_mean: num(stats, "bandwidth_mean"),
            },
            frames,
        }
    }

    pub fn scene_is_unknown(&self) -> bool {
        self.configuration.scene_type == UNKNOWN
    }
}

impl FrameRecord {
    fn from_json(v: &Value) -> Self {
        let v = Some(v).filter(|v| v.is_object());
        Self {
            frame_num: int(v, "frame_num"),
            frame_time_ms: num(v, "frame_time_ms"),
            fps: num(v, "fps"),
            bandwidth_read_gbps: num(v, "bandwidth_read_gbps"),
            bandwidth_write_gbps: num(v, "bandwidth_write_gbps"),
            vram_mb: num(v, "vram_mb"),
            avg_voxels_per_ray: num(v, "avg_voxels_per_ray"),
            ray_throughput_mrays: num(v, "ray_throughput_mrays"),
        }
    }
}

fn section<'a>(v: &'a Value, key: &str) -> Option<&'a Value> {
    v.get(key).filter(|s| s.is_object())
}

fn str_or_unknown(v: Option<&Value>, key: &str) -> String {
    v.and_then(|v| v.get(key))
        .and_then(Value::as_str)
        .unwrap_or(UNKNOWN)
        .to_string()
}

fn num(v: Option<&Value>, key: &str) -> f64 {
    v.and_then(|v| v.get(key))
        .and_then(Value::as_f64)
        .unwrap_or(0.0)
}

// Integer fields occasionally arrive as floats (e.g. `64.0`); truncate those.
fn int(v: Option<&Value>, key: &str) -> i64 {
    match v.and_then(|v| v.get(key)) {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or(0),
        _ => 0,
    }
}
