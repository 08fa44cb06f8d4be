//! Allocatable capacity command

use anyhow::Result;
use headroom_lib::{calculate_nodes_capacity_with, ClusterSnapshot, NodeAvailableCapacity};
use serde::Serialize;

use super::RunContext;
use crate::output::{
    print_header, print_info, print_json, print_table, print_warning, ItemRow, OutputFormat,
};

#[derive(Serialize)]
struct CapacityReport {
    nodes: usize,
    capacity: NodeAvailableCapacity,
}

/// Rows for a capacity summary, shared with the summary command
pub fn capacity_rows(capacity: &NodeAvailableCapacity) -> Vec<ItemRow> {
    vec![
        ItemRow::new("Total allocatable", capacity.total),
        ItemRow::new("Most available (memory)", capacity.largest_available_memory),
        ItemRow::new("Most available (cpu)", capacity.largest_available_cpu),
    ]
}

/// Show allocatable capacity across the snapshot's nodes
pub fn show(snapshot: &ClusterSnapshot, ctx: &RunContext) -> Result<()> {
    let pods = ctx.filter.apply(&snapshot.pods);
    let capacity = calculate_nodes_capacity_with(&snapshot.nodes, pods, &ctx.attribution)?;

    let report = CapacityReport {
        nodes: snapshot.nodes.len(),
        capacity,
    };

    match ctx.format {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Table => {
            if report.nodes == 0 {
                print_warning("Snapshot contains no nodes");
                return Ok(());
            }
            print_header("Allocatable Capacity");
            print_table(capacity_rows(&report.capacity));
            print_info(&format!(
                "{} nodes, pods attributed by {} node",
                report.nodes, ctx.attribution
            ));
        }
    }

    Ok(())
}
