pub mod record;
pub mod rows;

pub use record::{
    BenchmarkRecord, DeviceInfo, FrameRecord, Pipeline, TestConfiguration, TestStatistics, UNKNOWN,
};
pub use rows::{
    BenchmarkRunRow, CrossMachineRow, FrameSampleRow, FrameSets, RunRows, TestSummaryRow,
};
