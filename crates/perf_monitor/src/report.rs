//! Snapshot reports and bottleneck detection
//!
//! Everything here reads a copy of the registry; nothing holds the
//! registry lock after returning.

use crate::error::PerfResult;
use crate::registry::{MetricsRegistry, RequestRecord};
use crate::stats::OperationStat;
use crate::thresholds;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Point-in-time copy of a registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerfReport {
    /// Per-operation statistics in first-seen order
    #[serde(with = "ordered_operations")]
    pub operations: Vec<(String, OperationStat)>,
    /// Request log entries
    pub requests: Vec<RequestRecord>,
    /// When the snapshot was taken
    pub timestamp: DateTime<Utc>,
}

impl PerfReport {
    /// Take a snapshot of `registry`.
    pub fn capture(registry: &MetricsRegistry) -> Self {
        let (operations, requests) = registry.snapshot();
        Self {
            operations,
            requests,
            timestamp: Utc::now(),
        }
    }

    /// Look up the statistics for one operation in this snapshot.
    pub fn operation(&self, operation: &str) -> Option<&OperationStat> {
        self.operations
            .iter()
            .find(|(name, _)| name == operation)
            .map(|(_, stat)| stat)
    }

    /// Bottlenecks present in this snapshot.
    pub fn bottlenecks(&self) -> Vec<BottleneckEntry> {
        bottlenecks_in(&self.operations)
    }

    /// Serialize the report as compact JSON.
    pub fn to_json(&self) -> PerfResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Serialize the report as indented JSON.
    pub fn to_json_pretty(&self) -> PerfResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// An operation whose statistics crossed a bottleneck threshold.
///
/// Durations are rounded to the nearest millisecond.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BottleneckEntry {
    /// Operation name
    pub operation: String,
    /// Rounded average duration in milliseconds
    pub average_duration_ms: f64,
    /// Rounded maximum duration in milliseconds
    pub max_duration_ms: f64,
    /// Number of recorded calls
    pub calls: u64,
}

impl BottleneckEntry {
    fn from_stat(operation: &str, stat: &OperationStat) -> Self {
        Self {
            operation: operation.to_string(),
            average_duration_ms: stat.average_duration_ms.round(),
            max_duration_ms: stat.max_duration_ms.round(),
            calls: stat.calls,
        }
    }
}

impl std::fmt::Display for BottleneckEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: avg {:.0}ms, max {:.0}ms over {} calls",
            self.operation, self.average_duration_ms, self.max_duration_ms, self.calls
        )
    }
}

/// List every operation in `registry` that crosses a bottleneck threshold.
///
/// Entries follow registry order, not severity.
pub fn identify_bottlenecks(registry: &MetricsRegistry) -> Vec<BottleneckEntry> {
    bottlenecks_in(&registry.operations())
}

fn bottlenecks_in(operations: &[(String, OperationStat)]) -> Vec<BottleneckEntry> {
    operations
        .iter()
        .filter(|(_, stat)| thresholds::is_bottleneck(stat))
        .map(|(name, stat)| BottleneckEntry::from_stat(name, stat))
        .collect()
}

/// Serializes the ordered operation list as a JSON object, keeping order.
mod ordered_operations {
    use crate::stats::OperationStat;
    use serde::de::{MapAccess, Visitor};
    use serde::{Deserializer, Serializer};
    use std::fmt;

    pub fn serialize<S>(
        operations: &[(String, OperationStat)],
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_map(operations.iter().map(|(name, stat)| (name, stat)))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<(String, OperationStat)>, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(OperationsVisitor)
    }

    struct OperationsVisitor;

    impl<'de> Visitor<'de> for OperationsVisitor {
        type Value = Vec<(String, OperationStat)>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a map of operation name to statistics")
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut operations = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some((name, stat)) = map.next_entry::<String, OperationStat>()? {
                operations.push((name, stat));
            }
            Ok(operations)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_snapshot_is_detached() {
        let registry = MetricsRegistry::new();
        registry.record_sample("fetchData", 100.0);

        let report = PerfReport::capture(&registry);
        registry.record_sample("fetchData", 300.0);

        assert_eq!(report.operation("fetchData").unwrap().calls, 1);
        assert_eq!(registry.operation("fetchData").unwrap().calls, 2);
    }

    #[test]
    fn test_repeated_reports_match() {
        let registry = MetricsRegistry::new();
        registry.record_sample("a", 10.0);
        registry.record_sample("b", 20.0);

        let first = PerfReport::capture(&registry);
        let second = PerfReport::capture(&registry);

        assert_eq!(first.operations, second.operations);
        assert_eq!(first.requests, second.requests);
        assert!(second.timestamp >= first.timestamp);
    }

    #[test]
    fn test_empty_report() {
        let report = PerfReport::capture(&MetricsRegistry::new());
        assert!(report.operations.is_empty());
        assert!(report.requests.is_empty());
        assert!(report.bottlenecks().is_empty());
    }

    #[test]
    fn test_bottleneck_by_average() {
        let registry = MetricsRegistry::new();
        registry.record_sample("avgHeavy", 1200.0);
        registry.record_sample("avgHeavy", 1000.0);

        let bottlenecks = identify_bottlenecks(&registry);
        assert_eq!(bottlenecks.len(), 1);
        assert_eq!(bottlenecks[0].operation, "avgHeavy");
        assert_eq!(bottlenecks[0].average_duration_ms, 1100.0);
        assert_eq!(bottlenecks[0].max_duration_ms, 1200.0);
        assert_eq!(bottlenecks[0].calls, 2);
    }

    #[test]
    fn test_bottleneck_by_single_spike() {
        let registry = MetricsRegistry::new();
        for _ in 0..9 {
            registry.record_sample("spiky", 10.0);
        }
        registry.record_sample("spiky", 3100.0);

        let bottlenecks = identify_bottlenecks(&registry);
        assert_eq!(bottlenecks.len(), 1);
        assert_eq!(bottlenecks[0].average_duration_ms, 319.0);
        assert_eq!(bottlenecks[0].max_duration_ms, 3100.0);
    }

    #[test]
    fn test_bottleneck_rounding() {
        let registry = MetricsRegistry::new();
        registry.record_sample("slowOp", 3500.4);

        let bottlenecks = identify_bottlenecks(&registry);
        assert_eq!(
            bottlenecks,
            vec![BottleneckEntry {
                operation: "slowOp".to_string(),
                average_duration_ms: 3500.0,
                max_duration_ms: 3500.0,
                calls: 1,
            }]
        );
    }

    #[test]
    fn test_bottlenecks_follow_registry_order() {
        let registry = MetricsRegistry::new();
        registry.record_sample("mild", 1500.0);
        registry.record_sample("fast", 5.0);
        registry.record_sample("severe", 9000.0);

        let names: Vec<String> = identify_bottlenecks(&registry)
            .into_iter()
            .map(|entry| entry.operation)
            .collect();
        assert_eq!(names, vec!["mild", "severe"]);
    }

    #[test]
    fn test_no_bottlenecks_under_thresholds() {
        let registry = MetricsRegistry::new();
        registry.record_sample("ok", 1000.0);
        registry.record_sample("ok", 1000.0);
        registry.record_sample("edge", 3000.0);
        registry.record_sample("edge", 0.0);
        registry.record_sample("edge", 0.0);

        assert!(identify_bottlenecks(&registry).is_empty());
    }

    #[test]
    fn test_report_json_keeps_order_and_names() {
        let registry = MetricsRegistry::new();
        registry.record_sample("second", 2.0);
        registry.record_sample("first", 1.0);

        let json = PerfReport::capture(&registry).to_json().unwrap();
        assert!(json.contains("\"totalDurationMs\""));
        assert!(json.contains("\"timestamp\""));
        assert!(json.find("\"second\"").unwrap() < json.find("\"first\"").unwrap());
    }

    #[test]
    fn test_report_json_parses_back() {
        let registry = MetricsRegistry::new();
        registry.record_sample("b", 2.0);
        registry.record_sample("a", 1.0);
        let report = PerfReport::capture(&registry);

        let parsed: PerfReport = serde_json::from_str(&report.to_json_pretty().unwrap()).unwrap();
        assert_eq!(parsed.operations, report.operations);
        assert_eq!(parsed.timestamp, report.timestamp);
    }

    #[test]
    fn test_bottleneck_display() {
        let entry = BottleneckEntry {
            operation: "slowOp".to_string(),
            average_duration_ms: 3500.0,
            max_duration_ms: 3500.0,
            calls: 1,
        };
        assert_eq!(entry.to_string(), "slowOp: avg 3500ms, max 3500ms over 1 calls");
    }
}
