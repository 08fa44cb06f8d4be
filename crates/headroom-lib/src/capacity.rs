//! Allocatable capacity and per-node headroom
//!
//! Pods are grouped by the node they are attributed to, then each node's
//! available resources are its allocatable resources minus the requests of
//! the grouped pods that still occupy it.
//!
//! Attribution defaults to the pod's nominated node name, which is only the
//! scheduler's provisional choice. Pods without a nominated node are grouped
//! under the empty key: they never reduce any node's availability, but they
//! still count in the cluster-wide requested total computed by
//! [`calculate_pods_requested_usage`](crate::usage::calculate_pods_requested_usage).
//! Use [`Attribution::Bound`] to attribute pods by their confirmed binding
//! instead.

use crate::error::Result;
use crate::models::{NodeAvailability, NodeAvailableCapacity, ResourceItem};
use crate::pod::is_pod_using_node_resources;
use crate::request::{pod_resource_request, resource_list};
use k8s_openapi::api::core::v1::{Node, Pod};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Pods grouped by the node name they are attributed to
pub type PodsByNode<'a> = HashMap<&'a str, Vec<&'a Pod>>;

/// Source of the node a pod is attributed to
pub trait PodAttribution {
    /// Node name for the pod, or `None` when it is not attributed to any node
    fn node_for<'a>(&self, pod: &'a Pod) -> Option<&'a str>;
}

/// Built-in attribution sources
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Attribution {
    /// `status.nominatedNodeName`, the scheduler's provisional assignment
    #[default]
    Nominated,
    /// `spec.nodeName`, the confirmed binding
    Bound,
}

impl PodAttribution for Attribution {
    fn node_for<'a>(&self, pod: &'a Pod) -> Option<&'a str> {
        match self {
            Attribution::Nominated => pod
                .status
                .as_ref()
                .and_then(|s| s.nominated_node_name.as_deref()),
            Attribution::Bound => pod.spec.as_ref().and_then(|s| s.node_name.as_deref()),
        }
    }
}

impl FromStr for Attribution {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "nominated" => Ok(Attribution::Nominated),
            "bound" => Ok(Attribution::Bound),
            other => Err(format!(
                "unknown attribution '{}', expected 'nominated' or 'bound'",
                other
            )),
        }
    }
}

impl fmt::Display for Attribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Attribution::Nominated => f.write_str("nominated"),
            Attribution::Bound => f.write_str("bound"),
        }
    }
}

/// Group pods by attributed node, keeping input order within each group
///
/// Every pod lands in exactly one group. Unattributed pods share the `""` key.
pub fn map_pods<'a, I, A>(pods: I, attribution: &A) -> PodsByNode<'a>
where
    I: IntoIterator<Item = &'a Pod>,
    A: PodAttribution + ?Sized,
{
    let mut grouped: PodsByNode<'a> = HashMap::new();
    for pod in pods {
        let key = attribution.node_for(pod).unwrap_or("");
        grouped.entry(key).or_default().push(pod);
    }
    grouped
}

/// Allocatable cpu/memory of a node; a node without status has none
pub fn node_allocatable(node: &Node) -> Result<ResourceItem> {
    match node.status.as_ref().and_then(|s| s.allocatable.as_ref()) {
        Some(allocatable) => resource_list(allocatable),
        None => Ok(ResourceItem::ZERO),
    }
}

/// Allocatable minus the requests of pods grouped under the node that still
/// occupy it. The result is negative when the node is over-committed.
pub fn get_node_available_resources(node: &Node, grouped: &PodsByNode<'_>) -> Result<ResourceItem> {
    let allocatable = node_allocatable(node)?;
    let (used, _) = used_on_node(node, grouped)?;
    Ok(allocatable - used)
}

fn used_on_node(node: &Node, grouped: &PodsByNode<'_>) -> Result<(ResourceItem, usize)> {
    let pods = match node.metadata.name.as_deref() {
        Some(name) if !name.is_empty() => grouped.get(name),
        _ => None,
    };

    let mut used = ResourceItem::ZERO;
    let mut counted = 0;
    for pod in pods.into_iter().flatten() {
        if is_pod_using_node_resources(pod) {
            used = used + pod_resource_request(pod)?;
            counted += 1;
        }
    }
    Ok((used, counted))
}

/// Total allocatable capacity and the nodes with the most headroom, attributing
/// pods by their nominated node
pub fn calculate_nodes_capacity<'a, 'b, N, P>(nodes: N, pods: P) -> Result<NodeAvailableCapacity>
where
    N: IntoIterator<Item = &'a Node>,
    P: IntoIterator<Item = &'b Pod>,
{
    calculate_nodes_capacity_with(nodes, pods, &Attribution::Nominated)
}

/// Same as [`calculate_nodes_capacity`] with an explicit attribution source
///
/// Every node adds its allocatable resources to `total`. A node replaces
/// `largest_available_cpu` when its available CPU is strictly greater than
/// the CPU recorded there, and the recorded value is the node's allocatable
/// pair. Memory is tracked the same way in its own slot.
pub fn calculate_nodes_capacity_with<'a, 'b, N, P, A>(
    nodes: N,
    pods: P,
    attribution: &A,
) -> Result<NodeAvailableCapacity>
where
    N: IntoIterator<Item = &'a Node>,
    P: IntoIterator<Item = &'b Pod>,
    A: PodAttribution + ?Sized,
{
    let grouped = map_pods(pods, attribution);
    let mut capacity = NodeAvailableCapacity::default();

    for node in nodes {
        let allocatable = node_allocatable(node)?;
        capacity.total = capacity.total + allocatable;

        let (used, _) = used_on_node(node, &grouped)?;
        let available = allocatable - used;

        if available.cpu() > capacity.largest_available_cpu.cpu() {
            capacity.largest_available_cpu = allocatable;
        }
        if available.memory() > capacity.largest_available_memory.memory() {
            capacity.largest_available_memory = allocatable;
        }
    }

    Ok(capacity)
}

/// Per-node allocatable and available resources, in node input order
pub fn node_availability<'a, 'b, N, P, A>(
    nodes: N,
    pods: P,
    attribution: &A,
) -> Result<Vec<NodeAvailability>>
where
    N: IntoIterator<Item = &'a Node>,
    P: IntoIterator<Item = &'b Pod>,
    A: PodAttribution + ?Sized,
{
    let grouped = map_pods(pods, attribution);
    if let Some(unattributed) = grouped.get("") {
        debug!(pods = unattributed.len(), "Pods without an attributed node");
    }

    nodes
        .into_iter()
        .map(|node| -> Result<NodeAvailability> {
            let allocatable = node_allocatable(node)?;
            let (used, pods_counted) = used_on_node(node, &grouped)?;
            Ok(NodeAvailability {
                node_name: node.metadata.name.clone().unwrap_or_default(),
                allocatable,
                available: allocatable - used,
                pods_counted,
            })
        })
        .collect()
}
