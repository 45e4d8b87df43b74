//! Process exit codes. Part of the CLI contract; scripts branch on them.

pub const EXIT_SUCCESS: i32 = 0;
/// Reported failure: missing input path, nothing to aggregate, no folder processed.
pub const EXIT_FAILURE: i32 = 1;
/// Fatal error: corrupt store, I/O failure, unusable configuration.
pub const EXIT_FATAL: i32 = 2;
