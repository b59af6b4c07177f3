//! Driver Metrics
//!
//! Prometheus counters for commands issued, failures by kind and logical
//! operation outcomes. Each driver owns its own registry.

use crate::error::{ErrorKind, Result};
use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::time::Duration;

/// Metrics collected by one driver instance
#[derive(Clone)]
pub struct DriverMetrics {
    registry: Registry,
    commands: IntCounterVec,
    failures: IntCounterVec,
    operations: IntCounterVec,
    command_duration: Histogram,
}

impl DriverMetrics {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let commands = IntCounterVec::new(
            Opts::new("netapp_direct_commands_total", "Commands issued to the array"),
            &["verb"],
        )?;
        let failures = IntCounterVec::new(
            Opts::new(
                "netapp_direct_command_failures_total",
                "Command failures by kind",
            ),
            &["kind"],
        )?;
        let operations = IntCounterVec::new(
            Opts::new(
                "netapp_direct_operations_total",
                "Logical driver operations by outcome",
            ),
            &["operation", "outcome"],
        )?;
        let command_duration = Histogram::with_opts(HistogramOpts::new(
            "netapp_direct_command_duration_seconds",
            "Round-trip time of a single array command",
        ))?;

        registry.register(Box::new(commands.clone()))?;
        registry.register(Box::new(failures.clone()))?;
        registry.register(Box::new(operations.clone()))?;
        registry.register(Box::new(command_duration.clone()))?;

        Ok(Self {
            registry,
            commands,
            failures,
            operations,
            command_duration,
        })
    }

    /// Record one command round trip
    pub fn record_command(&self, verb: &str, elapsed: Duration) {
        self.commands.with_label_values(&[verb]).inc();
        self.command_duration.observe(elapsed.as_secs_f64());
    }

    pub fn record_failure(&self, kind: ErrorKind) {
        self.failures.with_label_values(&[kind.as_str()]).inc();
    }

    pub fn record_operation(&self, operation: &str, success: bool) {
        let outcome = if success { "ok" } else { "error" };
        self.operations
            .with_label_values(&[operation, outcome])
            .inc();
    }

    /// Number of commands issued for `verb`
    pub fn commands_issued(&self, verb: &str) -> u64 {
        self.counter_value("netapp_direct_commands_total", &[("verb", verb)])
    }

    pub fn failures(&self, kind: ErrorKind) -> u64 {
        self.counter_value("netapp_direct_command_failures_total", &[("kind", kind.as_str())])
    }

    pub fn operations(&self, operation: &str, success: bool) -> u64 {
        let outcome = if success { "ok" } else { "error" };
        self.counter_value(
            "netapp_direct_operations_total",
            &[("operation", operation), ("outcome", outcome)],
        )
    }

    /// Current value of a counter series; reading never creates the series
    fn counter_value(&self, name: &str, labels: &[(&str, &str)]) -> u64 {
        self.registry
            .gather()
            .iter()
            .filter(|family| family.get_name() == name)
            .flat_map(|family| family.get_metric())
            .find(|metric| {
                let pairs = metric.get_label();
                pairs.len() == labels.len()
                    && labels.iter().all(|(key, value)| {
                        pairs
                            .iter()
                            .any(|pair| pair.get_name() == *key && pair.get_value() == *value)
                    })
            })
            .map(|metric| metric.get_counter().get_value() as u64)
            .unwrap_or(0)
    }

    /// Render all metrics in the Prometheus text exposition format
    pub fn encode(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters() {
        let metrics = DriverMetrics::new().unwrap();

        metrics.record_command("lun create", Duration::from_millis(12));
        metrics.record_command("lun create", Duration::from_millis(8));
        metrics.record_command("lun map", Duration::from_millis(3));
        metrics.record_failure(ErrorKind::Parse);
        metrics.record_operation("create_volume", true);
        metrics.record_operation("create_volume", false);

        assert_eq!(metrics.commands_issued("lun create"), 2);
        assert_eq!(metrics.commands_issued("lun map"), 1);
        assert_eq!(metrics.failures(ErrorKind::Parse), 1);
        assert_eq!(metrics.failures(ErrorKind::Verification), 0);
        assert_eq!(metrics.operations("create_volume", true), 1);
        assert_eq!(metrics.operations("create_volume", false), 1);
    }

    #[test]
    fn test_registries_are_independent() {
        let first = DriverMetrics::new().unwrap();
        let second = DriverMetrics::new().unwrap();

        first.record_command("lun destroy", Duration::ZERO);
        assert_eq!(first.commands_issued("lun destroy"), 1);
        assert_eq!(second.commands_issued("lun destroy"), 0);
    }

    #[test]
    fn test_encode() {
        let metrics = DriverMetrics::new().unwrap();
        metrics.record_command("iscsi nodename", Duration::from_millis(5));

        let text = metrics.encode().unwrap();
        assert!(text.contains("netapp_direct_commands_total{verb=\"iscsi nodename\"} 1"));
        assert!(text.contains("netapp_direct_command_duration_seconds_count 1"));
    }

    #[test]
    fn test_reading_does_not_create_series() {
        let metrics = DriverMetrics::new().unwrap();

        assert_eq!(metrics.failures(ErrorKind::Transport), 0);
        assert_eq!(metrics.commands_issued("lun resize"), 0);
        assert_eq!(metrics.operations("delete_volume", false), 0);

        let text = metrics.encode().unwrap();
        assert!(!text.contains("kind=\"transport\""));
        assert!(!text.contains("verb=\"lun resize\""));
        assert!(!text.contains("operation=\"delete_volume\""));
    }
}
