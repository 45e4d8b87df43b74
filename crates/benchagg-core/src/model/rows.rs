/// One row of `Benchmarks`: a single aggregation event.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkRunRow {
    pub benchmark_id: String,
    pub machine_name: String,
    pub gpu_name: String,
    pub gpu_driver: String,
    pub vram_gb: f64,
    pub run_date: String,
    pub total_tests: i64,
    pub notes: String,
}

/// One row of `Summary`: aggregate statistics of one test.
#[derive(Debug, Clone, PartialEq)]
pub struct TestSummaryRow {
    pub benchmark_id: String,
    pub test_id: String,
    pub pipeline: String,
    pub resolution: i64,
    pub scene: String,
    pub shader: String,
    pub screen_width: i64,
    pub screen_height: i64,
    pub fps_mean: f64,
    pub frame_time_mean_ms: f64,
    pub frame_time_p99_ms: f64,
    pub frame_time_stddev: f64,
    pub bandwidth_mean_gbps: f64,
}

/// One row of a per-pipeline frame relation.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSampleRow {
    pub benchmark_id: String,
    pub test_id: String,
    pub frame: i64,
    pub frame_time_ms: f64,
    pub fps: f64,
    pub bandwidth_read_gbps: f64,
    pub bandwidth_write_gbps: f64,
    pub vram_mb: f64,
    pub avg_voxels_per_ray: f64,
    pub ray_throughput_mrays: f64,
}

/// One row of the derived `Cross_Machine` relation.
#[derive(Debug, Clone, PartialEq)]
pub struct CrossMachineRow {
    pub gpu_name: String,
    pub pipeline: String,
    pub avg_fps: f64,
    pub min_fps: f64,
    pub max_fps: f64,
    pub avg_frame_time_ms: f64,
    pub test_count: i64,
}

/// Frame rows of one run, partitioned by target relation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameSets {
    pub hardware_rt: Vec<FrameSampleRow>,
    pub compute: Vec<FrameSampleRow>,
    pub fragment: Vec<FrameSampleRow>,
}

impl FrameSets {
    pub fn total(&self) -> usize {
        self.hardware_rt.len() + self.compute.len() + self.fragment.len()
    }
}

/// Everything one run contributes to the store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunRows {
    /// `None` only when the run had no records at all.
    pub benchmark: Option<BenchmarkRunRow>,
    pub summary: Vec<TestSummaryRow>,
    pub frames: FrameSets,
}
