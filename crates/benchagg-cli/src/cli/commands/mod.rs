pub mod aggregate;
pub mod config;
pub mod dispatch;
pub mod list;
pub mod pack;
pub mod process_all;
pub(crate) mod reporting;
pub mod unpack;

pub use dispatch::dispatch;
