//! Core data models for usage and capacity summaries

use crate::quantity::{CpuMillis, MemoryBytes};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

/// A CPU/memory pair captured together
///
/// Items are never mutated in place; accumulators replace the whole item so
/// the two dimensions always describe the same pod or node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceItem {
    cpu: CpuMillis,
    memory: MemoryBytes,
}

impl ResourceItem {
    pub const ZERO: ResourceItem = ResourceItem {
        cpu: CpuMillis::ZERO,
        memory: MemoryBytes::ZERO,
    };

    pub fn new(cpu: CpuMillis, memory: MemoryBytes) -> Self {
        Self { cpu, memory }
    }

    /// Build an item from raw milli-cores and bytes
    pub fn from_raw(cpu_millis: i64, memory_bytes: i64) -> Self {
        Self::new(CpuMillis::new(cpu_millis), MemoryBytes::new(memory_bytes))
    }

    pub fn cpu(&self) -> CpuMillis {
        self.cpu
    }

    pub fn memory(&self) -> MemoryBytes {
        self.memory
    }

    /// Per-dimension maximum of two items
    pub fn max_each(self, other: ResourceItem) -> ResourceItem {
        ResourceItem::new(self.cpu.max(other.cpu), self.memory.max(other.memory))
    }
}

impl Add for ResourceItem {
    type Output = ResourceItem;

    fn add(self, rhs: ResourceItem) -> ResourceItem {
        ResourceItem::new(self.cpu + rhs.cpu, self.memory + rhs.memory)
    }
}

impl Sub for ResourceItem {
    type Output = ResourceItem;

    fn sub(self, rhs: ResourceItem) -> ResourceItem {
        ResourceItem::new(self.cpu - rhs.cpu, self.memory - rhs.memory)
    }
}

impl fmt::Display for ResourceItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cpu={} memory={}", self.cpu, self.memory)
    }
}

/// Requested resources summed over a set of pods
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PodRequestedUsage {
    /// Sum of every pod's request
    pub total: ResourceItem,
    /// Full request of the pending pod with the largest memory request
    pub largest_memory: ResourceItem,
    /// Full request of the pending pod with the largest CPU request
    pub largest_cpu: ResourceItem,
}

/// Allocatable capacity summed over a set of nodes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeAvailableCapacity {
    /// Sum of every node's allocatable resources
    pub total: ResourceItem,
    /// Allocatable pair of the node with the most available memory
    pub largest_available_memory: ResourceItem,
    /// Allocatable pair of the node with the most available CPU
    pub largest_available_cpu: ResourceItem,
}

/// Allocatable and available resources of a single node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeAvailability {
    pub node_name: String,
    pub allocatable: ResourceItem,
    /// Allocatable minus the requests of pods using the node; may be negative
    pub available: ResourceItem,
    /// Number of pods whose requests were subtracted
    pub pods_counted: usize,
}

impl NodeAvailability {
    pub fn is_overcommitted(&self) -> bool {
        self.available.cpu().is_negative() || self.available.memory().is_negative()
    }
}
