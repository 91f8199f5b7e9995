//! Timing of caller-supplied operations

use crate::registry::MetricsRegistry;
use crate::thresholds;
use std::fmt;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

/// A monotonic stopwatch for a single call of a named operation.
///
/// Reads `tokio::time::Instant`, which is the system monotonic clock unless
/// the current runtime has paused time.
#[derive(Debug, Clone, Copy)]
pub struct OperationTimer<'a> {
    name: &'a str,
    start: Instant,
}

impl<'a> OperationTimer<'a> {
    /// Start timing `name` now.
    #[inline]
    pub fn start(name: &'a str) -> Self {
        Self {
            name,
            start: Instant::now(),
        }
    }

    /// Get the name of the operation being timed.
    #[inline]
    pub fn name(&self) -> &'a str {
        self.name
    }

    /// Get the elapsed duration.
    #[inline]
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Get the elapsed time in milliseconds.
    #[inline]
    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed().as_secs_f64() * 1000.0
    }
}

/// Run an asynchronous unit of work and record its duration in `registry`.
///
/// The future is created only after the clock starts, so setup work done
/// by `work` is timed too. Successes are recorded (and warned about past
/// [`thresholds::SLOW_OPERATION_MS`]); failures are logged with their
/// elapsed time and returned untouched without being recorded.
///
/// Only an `Err` counts as a failure. A panic in `work` unwinds through
/// here without being logged or recorded.
pub async fn time_async<T, E, F, Fut>(
    registry: &MetricsRegistry,
    operation: &str,
    work: F,
) -> Result<T, E>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: fmt::Debug,
{
    let timer = OperationTimer::start(operation);
    let outcome = work().await;
    settle(registry, &timer, &outcome);
    outcome
}

/// Synchronous counterpart of [`time_async`], with the same failure model.
pub fn time_blocking<T, E, F>(registry: &MetricsRegistry, operation: &str, work: F) -> Result<T, E>
where
    F: FnOnce() -> Result<T, E>,
    E: fmt::Debug,
{
    let timer = OperationTimer::start(operation);
    let outcome = work();
    settle(registry, &timer, &outcome);
    outcome
}

fn settle<T, E: fmt::Debug>(
    registry: &MetricsRegistry,
    timer: &OperationTimer<'_>,
    outcome: &Result<T, E>,
) {
    let operation = timer.name();
    let duration_ms = timer.elapsed_ms();
    match outcome {
        Ok(_) => {
            registry.record_sample(operation, duration_ms);
            if thresholds::is_slow_call(duration_ms) {
                tracing::warn!(
                    target: "perf_monitor",
                    operation = operation,
                    duration_ms = duration_ms,
                    threshold_ms = thresholds::SLOW_OPERATION_MS,
                    "slow operation"
                );
            }
        }
        Err(error) => {
            tracing::error!(
                target: "perf_monitor",
                operation = operation,
                elapsed_ms = duration_ms,
                error = ?error,
                "operation failed"
            );
        }
    }
}
