//! Fixed slowness thresholds
//!
//! These are constants rather than a configurable budget: a call is slow
//! past two seconds, and an operation is a bottleneck when its average
//! passes one second or any single call passes three.

use crate::stats::OperationStat;

/// A successful call longer than this emits a warning.
pub const SLOW_OPERATION_MS: f64 = 2000.0;

/// Average duration above which an operation is reported as a bottleneck.
pub const BOTTLENECK_AVERAGE_MS: f64 = 1000.0;

/// Single-call duration above which an operation is reported as a bottleneck.
pub const BOTTLENECK_MAX_MS: f64 = 3000.0;

/// Check whether a single call warrants a slow-operation warning.
#[inline]
pub fn is_slow_call(duration_ms: f64) -> bool {
    duration_ms > SLOW_OPERATION_MS
}

/// Check whether an operation's statistics cross either bottleneck threshold.
#[inline]
pub fn is_bottleneck(stat: &OperationStat) -> bool {
    stat.average_duration_ms > BOTTLENECK_AVERAGE_MS || stat.max_duration_ms > BOTTLENECK_MAX_MS
}
