//! Monitor handle and the process-wide instance

use crate::registry::MetricsRegistry;
use crate::report::{self, BottleneckEntry, PerfReport};
use crate::timing;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, OnceLock};

/// Global monitor instance
static GLOBAL_MONITOR: OnceLock<PerfMonitor> = OnceLock::new();

/// Cheaply cloneable handle that times operations into a shared registry.
///
/// Clones share the same registry. Build separate monitors to keep
/// statistics isolated, e.g. per test.
#[derive(Debug, Clone, Default)]
pub struct PerfMonitor {
    registry: Arc<MetricsRegistry>,
}

impl PerfMonitor {
    /// Create a monitor with a fresh, empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a monitor over an existing registry.
    pub fn with_registry(registry: Arc<MetricsRegistry>) -> Self {
        Self { registry }
    }

    /// The registry this monitor records into.
    pub fn registry(&self) -> &MetricsRegistry {
        &self.registry
    }

    /// Run `work`, time it, and record the duration under `operation`.
    ///
    /// The result or error of `work` is returned exactly as produced. Failed
    /// calls are logged but left out of the statistics.
    ///
    /// # Example
    ///
    /// ```rust
    /// # let rt = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
    /// # rt.block_on(async {
    /// use perf_monitor::PerfMonitor;
    ///
    /// let monitor = PerfMonitor::new();
    /// let rows = monitor
    ///     .run("fetchData", || async { Ok::<_, std::io::Error>(vec![1, 2, 3]) })
    ///     .await
    ///     .unwrap();
    ///
    /// assert_eq!(rows.len(), 3);
    /// assert_eq!(monitor.report().operation("fetchData").unwrap().calls, 1);
    /// # });
    /// ```
    pub async fn run<T, E, F, Fut>(&self, operation: &str, work: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: fmt::Debug,
    {
        timing::time_async(&self.registry, operation, work).await
    }

    /// Run a synchronous `work` closure with the same semantics as [`run`](Self::run).
    pub fn run_blocking<T, E, F>(&self, operation: &str, work: F) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>,
        E: fmt::Debug,
    {
        timing::time_blocking(&self.registry, operation, work)
    }

    /// Snapshot every operation's statistics.
    pub fn report(&self) -> PerfReport {
        PerfReport::capture(&self.registry)
    }

    /// Operations whose average exceeds 1000ms or whose slowest call exceeds 3000ms.
    pub fn identify_bottlenecks(&self) -> Vec<BottleneckEntry> {
        report::identify_bottlenecks(&self.registry)
    }
}

/// Get the global monitor instance.
///
/// Lives for the whole process; every call returns the same registry.
pub fn global_monitor() -> &'static PerfMonitor {
    GLOBAL_MONITOR.get_or_init(PerfMonitor::new)
}

/// Get the registry behind the global monitor.
pub fn global_registry() -> &'static MetricsRegistry {
    global_monitor().registry()
}

/// Reset the global registry.
pub fn reset_global_registry() {
    global_registry().reset();
}

/// [`PerfMonitor::run`] on the global monitor.
pub async fn run<T, E, F, Fut>(operation: &str, work: F) -> Result<T, E>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: fmt::Debug,
{
    global_monitor().run(operation, work).await
}

/// [`PerfMonitor::run_blocking`] on the global monitor.
pub fn run_blocking<T, E, F>(operation: &str, work: F) -> Result<T, E>
where
    F: FnOnce() -> Result<T, E>,
    E: fmt::Debug,
{
    global_monitor().run_blocking(operation, work)
}

/// [`PerfMonitor::report`] on the global monitor.
pub fn report() -> PerfReport {
    global_monitor().report()
}

/// [`PerfMonitor::identify_bottlenecks`] on the global monitor.
pub fn identify_bottlenecks() -> Vec<BottleneckEntry> {
    global_monitor().identify_bottlenecks()
}
