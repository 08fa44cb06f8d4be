//! Observability infrastructure for headroom
//!
//! Provides:
//! - Prometheus gauges for requested usage and allocatable capacity
//! - Structured JSON logging with tracing

use crate::models::{NodeAvailableCapacity, PodRequestedUsage, ResourceItem};
use prometheus::{
    register_histogram, register_int_gauge, register_int_gauge_vec, Histogram, IntGauge,
    IntGaugeVec,
};
use std::sync::OnceLock;
use tracing::{info, warn};

/// Histogram buckets for a summary cycle (in seconds)
const CYCLE_BUCKETS: &[f64] = &[0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0];

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<HeadroomMetricsInner> = OnceLock::new();

struct HeadroomMetricsInner {
    cycle_duration_seconds: Histogram,
    requested_cpu_millis: IntGaugeVec,
    requested_memory_bytes: IntGaugeVec,
    allocatable_cpu_millis: IntGaugeVec,
    allocatable_memory_bytes: IntGaugeVec,
    pods_counted: IntGauge,
    nodes_counted: IntGauge,
    snapshot_errors: IntGauge,
}

impl HeadroomMetricsInner {
    fn new() -> Self {
        Self {
            cycle_duration_seconds: register_histogram!(
                "headroom_cycle_duration_seconds",
                "Time spent fetching a snapshot and computing summaries",
                CYCLE_BUCKETS.to_vec()
            )
            .expect("Failed to register cycle_duration_seconds"),

            requested_cpu_millis: register_int_gauge_vec!(
                "headroom_requested_cpu_millis",
                "Requested CPU in milli-cores. slot=total is the cluster sum; a largest_pending_* \
                 slot holds the CPU of the pod that won it, even when it won on memory",
                &["slot"]
            )
            .expect("Failed to register requested_cpu_millis"),

            requested_memory_bytes: register_int_gauge_vec!(
                "headroom_requested_memory_bytes",
                "Requested memory in bytes. slot=total is the cluster sum; a largest_pending_* \
                 slot holds the memory of the pod that won it, even when it won on CPU",
                &["slot"]
            )
            .expect("Failed to register requested_memory_bytes"),

            allocatable_cpu_millis: register_int_gauge_vec!(
                "headroom_allocatable_cpu_millis",
                "Allocatable CPU in milli-cores. slot=total is the cluster sum; \
                 a largest_available_* slot holds the CPU of the node that won it, \
                 even when it won on memory",
                &["slot"]
            )
            .expect("Failed to register allocatable_cpu_millis"),

            allocatable_memory_bytes: register_int_gauge_vec!(
                "headroom_allocatable_memory_bytes",
                "Allocatable memory in bytes. slot=total is the cluster sum; a largest_available_* \
                 slot holds the memory of the node that won it, even when it won on CPU",
                &["slot"]
            )
            .expect("Failed to register allocatable_memory_bytes"),

            pods_counted: register_int_gauge!(
                "headroom_pods_counted",
                "Pods included in the last summary"
            )
            .expect("Failed to register pods_counted"),

            nodes_counted: register_int_gauge!(
                "headroom_nodes_counted",
                "Nodes included in the last summary"
            )
            .expect("Failed to register nodes_counted"),

            snapshot_errors: register_int_gauge!(
                "headroom_snapshot_errors_total",
                "Total number of failed snapshot fetches or aggregations"
            )
            .expect("Failed to register snapshot_errors"),
        }
    }
}

/// Handle to the process-wide headroom metrics
///
/// Multiple clones share the same underlying metrics.
#[derive(Clone)]
pub struct HeadroomMetrics {
    _private: (),
}

impl Default for HeadroomMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadroomMetrics {
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(HeadroomMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &HeadroomMetricsInner {
        GLOBAL_METRICS.get_or_init(HeadroomMetricsInner::new)
    }

    pub fn observe_cycle_duration(&self, duration_secs: f64) {
        self.inner().cycle_duration_seconds.observe(duration_secs);
    }

    /// Publish a usage summary
    pub fn set_usage(&self, usage: &PodRequestedUsage) {
        let inner = self.inner();
        for (slot, item) in [
            ("total", usage.total),
            ("largest_pending_memory", usage.largest_memory),
            ("largest_pending_cpu", usage.largest_cpu),
        ] {
            set_pair(&inner.requested_cpu_millis, &inner.requested_memory_bytes, slot, item);
        }
    }

    /// Publish a capacity summary
    pub fn set_capacity(&self, capacity: &NodeAvailableCapacity) {
        let inner = self.inner();
        for (slot, item) in [
            ("total", capacity.total),
            ("largest_available_memory", capacity.largest_available_memory),
            ("largest_available_cpu", capacity.largest_available_cpu),
        ] {
            set_pair(&inner.allocatable_cpu_millis, &inner.allocatable_memory_bytes, slot, item);
        }
    }

    pub fn set_counts(&self, pods: usize, nodes: usize) {
        self.inner().pods_counted.set(pods as i64);
        self.inner().nodes_counted.set(nodes as i64);
    }

    pub fn inc_snapshot_errors(&self) {
        self.inner().snapshot_errors.inc();
    }
}

fn set_pair(cpu: &IntGaugeVec, memory: &IntGaugeVec, slot: &str, item: ResourceItem) {
    cpu.with_label_values(&[slot]).set(item.cpu().value());
    memory.with_label_values(&[slot]).set(item.memory().value());
}

/// Structured logger for summary events
#[derive(Clone)]
pub struct StructuredLogger {
    cluster: String,
}

impl StructuredLogger {
    pub fn new(cluster: impl Into<String>) -> Self {
        Self {
            cluster: cluster.into(),
        }
    }

    pub fn log_usage(&self, usage: &PodRequestedUsage, pods: usize) {
        info!(
            event = "usage_computed",
            cluster = %self.cluster,
            pods = pods,
            total_cpu_millis = usage.total.cpu().value(),
            total_memory_bytes = usage.total.memory().value(),
            largest_memory_cpu_millis = usage.largest_memory.cpu().value(),
            largest_memory_bytes = usage.largest_memory.memory().value(),
            largest_cpu_millis = usage.largest_cpu.cpu().value(),
            largest_cpu_memory_bytes = usage.largest_cpu.memory().value(),
            "Computed requested usage"
        );
    }

    pub fn log_capacity(&self, capacity: &NodeAvailableCapacity, nodes: usize) {
        info!(
            event = "capacity_computed",
            cluster = %self.cluster,
            nodes = nodes,
            total_cpu_millis = capacity.total.cpu().value(),
            total_memory_bytes = capacity.total.memory().value(),
            largest_available_cpu = %capacity.largest_available_cpu,
            largest_available_memory = %capacity.largest_available_memory,
            "Computed node capacity"
        );
    }

    pub fn log_snapshot_failed(&self, error: &str) {
        warn!(
            event = "snapshot_failed",
            cluster = %self.cluster,
            error = %error,
            "Failed to compute summaries, keeping previous values"
        );
    }

    pub fn log_startup(&self, version: &str) {
        info!(
            event = "agent_started",
            cluster = %self.cluster,
            agent_version = %version,
            "Headroom agent started"
        );
    }

    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "agent_shutdown",
            cluster = %self.cluster,
            reason = %reason,
            "Headroom agent shutting down"
        );
    }
}
