//! Requested usage across a set of pods

use crate::error::Result;
use crate::models::PodRequestedUsage;
use crate::pod::PodPhase;
use crate::request::pod_resource_request;
use k8s_openapi::api::core::v1::Pod;
use tracing::trace;

/// Sum the requests of all pods and track the largest pending request
///
/// Every pod counts toward `total`, scheduled or not. Only `Pending` pods can
/// become `largest_memory` or `largest_cpu`; the two slots are compared
/// independently and a tie keeps the pod seen first.
pub fn calculate_pods_requested_usage<'a, I>(pods: I) -> Result<PodRequestedUsage>
where
    I: IntoIterator<Item = &'a Pod>,
{
    let mut usage = PodRequestedUsage::default();

    for pod in pods {
        let request = pod_resource_request(pod)?;
        usage.total = usage.total + request;

        if PodPhase::of(pod) != PodPhase::Pending {
            continue;
        }
        if request.memory() > usage.largest_memory.memory() {
            trace!(
                pod = ?pod.metadata.name,
                request = %request,
                "New largest pending memory request"
            );
            usage.largest_memory = request;
        }
        if request.cpu() > usage.largest_cpu.cpu() {
            trace!(pod = ?pod.metadata.name, request = %request, "New largest pending cpu request");
            usage.largest_cpu = request;
        }
    }

    Ok(usage)
}
