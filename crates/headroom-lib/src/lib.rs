//! Cluster headroom library
//!
//! This crate provides the core functionality for:
//! - Extracting effective resource requests from pods
//! - Summarizing requested usage across pods
//! - Summarizing allocatable and available capacity across nodes
//! - Fetching cluster snapshots and publishing summaries periodically
//! - Health checks and observability

pub mod capacity;
pub mod error;
pub mod health;
pub mod models;
pub mod observability;
pub mod pod;
pub mod quantity;
pub mod request;
pub mod snapshot;
pub mod summary;
pub mod usage;

pub use capacity::{
    calculate_nodes_capacity, calculate_nodes_capacity_with, get_node_available_resources,
    map_pods, node_availability, Attribution, PodAttribution, PodsByNode,
};
pub use error::{Error, Result};
pub use health::{
    ComponentHealth, ComponentStatus, HealthRegistry, HealthResponse, ReadinessResponse,
};
pub use models::*;
pub use observability::{HeadroomMetrics, StructuredLogger};
pub use pod::{
    is_pod_scheduled, is_pod_using_node_resources, pod_is_daemon_set, pod_is_static, PodFilter,
    PodPhase,
};
pub use quantity::{CpuMillis, MemoryBytes};
pub use request::pod_resource_request;
pub use snapshot::{ClusterSnapshot, KubeSnapshotSource, SnapshotSource, StaticSnapshotSource};
pub use summary::{summarize, ClusterSummary, SummaryConfig, SummaryLoop};
pub use usage::calculate_pods_requested_usage;
