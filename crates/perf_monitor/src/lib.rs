//! Operation Timing and Bottleneck Reports
//!
//! This crate provides lightweight in-process performance instrumentation:
//! - Timing wrappers for async and blocking units of work
//! - A thread-safe registry of per-operation statistics
//! - Snapshot reports and bottleneck detection over fixed thresholds
//!
//! Successful calls are aggregated; failed calls are logged with their
//! elapsed time and handed back to the caller untouched. Slow successes
//! (over 2s) emit a `tracing` warning under the `perf_monitor` target.
//!
//! # Example
//!
//! ```rust
//! use perf_monitor::PerfMonitor;
//!
//! let monitor = PerfMonitor::new();
//! let parsed: Result<u32, std::num::ParseIntError> =
//!     monitor.run_blocking("parse", || "42".parse());
//!
//! assert_eq!(parsed, Ok(42));
//! assert!(monitor.identify_bottlenecks().is_empty());
//! println!("{}", monitor.report().to_json_pretty().unwrap());
//! ```

mod error;
pub mod logging;
mod monitor;
mod registry;
pub mod report;
mod stats;
pub mod thresholds;
mod timing;

pub use error::{PerfError, PerfResult};
pub use monitor::{
    global_monitor, global_registry, identify_bottlenecks, report, reset_global_registry, run,
    run_blocking, PerfMonitor,
};
pub use registry::{MetricsRegistry, RequestRecord};
pub use report::{BottleneckEntry, PerfReport};
pub use stats::OperationStat;
pub use timing::{time_async, time_blocking, OperationTimer};
