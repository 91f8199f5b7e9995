//! Metrics registry keyed by operation name

use crate::stats::OperationStat;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// A single request entry in the registry's request log.
///
/// The timing wrapper never appends to this log; it is kept so reports
/// have a stable shape for callers that log requests themselves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestRecord {
    /// Operation the request belongs to
    pub operation: String,
    /// Measured duration in milliseconds
    pub duration_ms: f64,
    /// When the request completed
    pub timestamp: DateTime<Utc>,
}

impl RequestRecord {
    /// Create a record stamped with the current time.
    pub fn new(operation: impl Into<String>, duration_ms: f64) -> Self {
        Self {
            operation: operation.into(),
            duration_ms,
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Default)]
struct RegistryState {
    /// Statistics in first-seen order
    operations: Vec<(String, OperationStat)>,
    /// Operation name -> slot in `operations`
    index: HashMap<String, usize>,
    requests: Vec<RequestRecord>,
}

impl RegistryState {
    fn entry(&mut self, operation: &str) -> &mut OperationStat {
        let slot = match self.index.get(operation).copied() {
            Some(slot) => slot,
            None => {
                let slot = self.operations.len();
                self.operations
                    .push((operation.to_string(), OperationStat::default()));
                self.index.insert(operation.to_string(), slot);
                slot
            }
        };
        &mut self.operations[slot].1
    }
}

/// Thread-safe store of per-operation statistics.
///
/// Entries are created on first sample and never evicted; iteration
/// follows the order in which operation names were first seen.
#[derive(Debug)]
pub struct MetricsRegistry {
    state: Mutex<RegistryState>,
    enabled: AtomicBool,
}

impl MetricsRegistry {
    /// Create an empty registry with recording enabled.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(RegistryState::default()),
            enabled: AtomicBool::new(true),
        }
    }

    /// Enable or disable recording. Disabled registries ignore samples.
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    /// Check if recording is enabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    /// Record one successful call of `operation` that took `duration_ms`.
    ///
    /// The whole read-modify-write happens under one lock acquisition, so
    /// concurrent completions never lose a sample.
    pub fn record_sample(&self, operation: &str, duration_ms: f64) {
        if !self.is_enabled() {
            return;
        }

        let calls = {
            let mut state = self.lock();
            let stat = state.entry(operation);
            stat.record(duration_ms);
            stat.calls
        };

        tracing::trace!(
            target: "perf_monitor",
            operation = operation,
            duration_ms = duration_ms,
            calls = calls,
            "sample recorded"
        );
    }

    /// Append an entry to the request log.
    pub fn log_request(&self, record: RequestRecord) {
        if !self.is_enabled() {
            return;
        }
        self.lock().requests.push(record);
    }

    /// Copy out the statistics for one operation.
    pub fn operation(&self, operation: &str) -> Option<OperationStat> {
        let state = self.lock();
        state
            .index
            .get(operation)
            .map(|&slot| state.operations[slot].1)
    }

    /// Copy out all statistics in first-seen order.
    pub fn operations(&self) -> Vec<(String, OperationStat)> {
        self.lock().operations.clone()
    }

    /// Copy out the request log.
    pub fn requests(&self) -> Vec<RequestRecord> {
        self.lock().requests.clone()
    }

    /// Number of distinct operations seen.
    pub fn len(&self) -> usize {
        self.lock().operations.len()
    }

    /// Check if no operation has been recorded.
    pub fn is_empty(&self) -> bool {
        self.lock().operations.is_empty()
    }

    /// Drop every operation and request entry.
    pub fn reset(&self) {
        let mut state = self.lock();
        state.operations.clear();
        state.index.clear();
        state.requests.clear();
    }

    /// Copy operations and requests under a single lock acquisition.
    pub(crate) fn snapshot(&self) -> (Vec<(String, OperationStat)>, Vec<RequestRecord>) {
        let state = self.lock();
        (state.operations.clone(), state.requests.clone())
    }

    fn lock(&self) -> MutexGuard<'_, RegistryState> {
        // No caller code runs under the lock, so a poisoned state is still consistent.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MetricsRegistry {
    fn default() -> Self {
        Self::new()
    }
}
