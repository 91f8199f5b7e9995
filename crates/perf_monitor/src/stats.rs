//! Aggregate statistics kept per operation name

use serde::{Deserialize, Serialize};

/// Running statistics for one named operation.
///
/// Only successful calls are folded in. `average_duration_ms` is recomputed
/// on every sample so readers never have to divide themselves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationStat {
    /// Number of recorded calls
    pub calls: u64,
    /// Sum of all recorded durations in milliseconds
    pub total_duration_ms: f64,
    /// `total_duration_ms / calls`, or 0 before the first sample
    pub average_duration_ms: f64,
    /// Longest single call in milliseconds
    pub max_duration_ms: f64,
}

impl OperationStat {
    /// Fold one sample into the statistics.
    pub fn record(&mut self, duration_ms: f64) {
        self.calls += 1;
        self.total_duration_ms += duration_ms;
        self.average_duration_ms = self.total_duration_ms / self.calls as f64;
        self.max_duration_ms = self.max_duration_ms.max(duration_ms);
    }
}
