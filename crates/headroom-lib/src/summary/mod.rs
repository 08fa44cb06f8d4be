//! Cluster summaries
//!
//! Combines a snapshot, a pod filter and an attribution source into the
//! usage and capacity figures consumed by a scaling policy.

mod r#loop;

pub use r#loop::{SummaryConfig, SummaryLoop};

use crate::capacity::{calculate_nodes_capacity_with, PodAttribution};
use crate::error::Result;
use crate::models::{NodeAvailableCapacity, PodRequestedUsage};
use crate::pod::PodFilter;
use crate::snapshot::ClusterSnapshot;
use crate::usage::calculate_pods_requested_usage;
use serde::{Deserialize, Serialize};

/// Usage and capacity computed from one snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterSummary {
    pub usage: PodRequestedUsage,
    pub capacity: NodeAvailableCapacity,
    /// Pods that passed the filter
    pub pods_counted: usize,
    /// Pods removed by the filter
    pub pods_excluded: usize,
    pub nodes: usize,
    /// Unix timestamp of the computation
    pub computed_at: i64,
}

/// Compute both summaries for a snapshot
///
/// The filter applies to both computations, so excluded pods neither add to
/// the requested total nor reduce any node's availability.
pub fn summarize<A>(
    snapshot: &ClusterSnapshot,
    filter: PodFilter,
    attribution: &A,
) -> Result<ClusterSummary>
where
    A: PodAttribution + ?Sized,
{
    let pods = filter.apply(&snapshot.pods);
    let usage = calculate_pods_requested_usage(pods.iter().copied())?;
    let capacity =
        calculate_nodes_capacity_with(&snapshot.nodes, pods.iter().copied(), attribution)?;

    Ok(ClusterSummary {
        usage,
        capacity,
        pods_counted: pods.len(),
        pods_excluded: snapshot.pods.len() - pods.len(),
        nodes: snapshot.nodes.len(),
        computed_at: chrono::Utc::now().timestamp(),
    })
}
