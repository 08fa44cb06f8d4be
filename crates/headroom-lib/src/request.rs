//! Effective resource request of a pod
//!
//! Mirrors the scheduler's accounting: regular containers run together so
//! their requests add up, init containers run one at a time before them so
//! each only needs to fit on its own, and pod overhead is charged on top.

use crate::error::Result;
use crate::models::ResourceItem;
use crate::quantity::{parse_cpu_millis, parse_memory_bytes, CpuMillis, MemoryBytes};
use k8s_openapi::api::core::v1::{Container, Pod};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use std::collections::BTreeMap;

const CPU: &str = "cpu";
const MEMORY: &str = "memory";

/// Compute the CPU/memory a pod asks the scheduler for
pub fn pod_resource_request(pod: &Pod) -> Result<ResourceItem> {
    let Some(spec) = pod.spec.as_ref() else {
        return Ok(ResourceItem::ZERO);
    };

    let mut request = ResourceItem::ZERO;
    for container in &spec.containers {
        request = request + container_request(container)?;
    }

    for init in spec.init_containers.iter().flatten() {
        request = request.max_each(container_request(init)?);
    }

    if let Some(overhead) = spec.overhead.as_ref() {
        request = request + resource_list(overhead)?;
    }

    Ok(request)
}

fn container_request(container: &Container) -> Result<ResourceItem> {
    match container.resources.as_ref().and_then(|r| r.requests.as_ref()) {
        Some(requests) => resource_list(requests),
        None => Ok(ResourceItem::ZERO),
    }
}

/// Read the cpu and memory entries of a resource list; absent entries are zero
pub(crate) fn resource_list(list: &BTreeMap<String, Quantity>) -> Result<ResourceItem> {
    let cpu = match list.get(CPU) {
        Some(q) => parse_cpu_millis(q)?,
        None => CpuMillis::ZERO,
    };
    let memory = match list.get(MEMORY) {
        Some(q) => parse_memory_bytes(q)?,
        None => MemoryBytes::ZERO,
    };
    Ok(ResourceItem::new(cpu, memory))
}
