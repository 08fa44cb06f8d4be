//! Pod classification predicates
//!
//! Decides which pods occupy a node's allocatable budget and lets callers
//! pre-filter daemon-managed and static pods before aggregation.

use k8s_openapi::api::core::v1::Pod;

const DAEMON_SET_KIND: &str = "DaemonSet";
const CONFIG_SOURCE_ANNOTATION: &str = "kubernetes.io/config.source";
const POD_SCHEDULED: &str = "PodScheduled";
const CONDITION_TRUE: &str = "True";

/// Lifecycle phase of a pod
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PodPhase {
    Pending,
    Running,
    Succeeded,
    Failed,
    Unknown,
}

impl PodPhase {
    /// Phase reported in the pod status; missing or unrecognised phases map to `Unknown`
    pub fn of(pod: &Pod) -> Self {
        match pod.status.as_ref().and_then(|s| s.phase.as_deref()) {
            Some("Pending") => PodPhase::Pending,
            Some("Running") => PodPhase::Running,
            Some("Succeeded") => PodPhase::Succeeded,
            Some("Failed") => PodPhase::Failed,
            _ => PodPhase::Unknown,
        }
    }
}

/// Returns true if any owner reference is a DaemonSet
pub fn pod_is_daemon_set(pod: &Pod) -> bool {
    pod.metadata
        .owner_references
        .as_ref()
        .map(|refs| refs.iter().any(|r| r.kind == DAEMON_SET_KIND))
        .unwrap_or(false)
}

/// Returns true if the pod was created from a manifest file on the node
pub fn pod_is_static(pod: &Pod) -> bool {
    pod.metadata
        .annotations
        .as_ref()
        .and_then(|a| a.get(CONFIG_SOURCE_ANNOTATION))
        .is_some_and(|source| source == "file")
}

/// Returns true if the first `PodScheduled` condition has status `True`
pub fn is_pod_scheduled(pod: &Pod) -> bool {
    pod.status
        .as_ref()
        .and_then(|s| s.conditions.as_ref())
        .and_then(|conditions| conditions.iter().find(|c| c.type_ == POD_SCHEDULED))
        .is_some_and(|c| c.status == CONDITION_TRUE)
}

/// Returns true if the pod currently counts against its node's allocatable resources
pub fn is_pod_using_node_resources(pod: &Pod) -> bool {
    is_pod_scheduled(pod) && matches!(PodPhase::of(pod), PodPhase::Pending | PodPhase::Running)
}

/// Pre-aggregation filter for pods the caller does not want counted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PodFilter {
    pub exclude_daemonsets: bool,
    pub exclude_static: bool,
}

impl PodFilter {
    pub fn accepts(&self, pod: &Pod) -> bool {
        !(self.exclude_daemonsets && pod_is_daemon_set(pod))
            && !(self.exclude_static && pod_is_static(pod))
    }

    /// Keep the accepted pods, preserving input order
    pub fn apply<'a>(&self, pods: &'a [Pod]) -> Vec<&'a Pod> {
        pods.iter().filter(|pod| self.accepts(pod)).collect()
    }
}
