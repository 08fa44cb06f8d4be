//! Per-node headroom command

use anyhow::Result;
use colored::Colorize;
use headroom_lib::{map_pods, node_availability, ClusterSnapshot, NodeAvailability};
use tabled::Tabled;

use super::RunContext;
use crate::output::{
    color_available, format_bytes, format_cpu, print_header, print_info, print_json,
    print_success, print_table, print_warning, OutputFormat,
};

/// Row for nodes table
#[derive(Tabled)]
struct NodeRow {
    #[tabled(rename = "Node")]
    name: String,
    #[tabled(rename = "Alloc CPU")]
    allocatable_cpu: String,
    #[tabled(rename = "Alloc Mem")]
    allocatable_memory: String,
    #[tabled(rename = "Avail CPU")]
    available_cpu: String,
    #[tabled(rename = "Avail Mem")]
    available_memory: String,
    #[tabled(rename = "Pods")]
    pods: usize,
}

impl From<&NodeAvailability> for NodeRow {
    fn from(node: &NodeAvailability) -> Self {
        let cpu = node.available.cpu().value();
        let memory = node.available.memory().value();
        Self {
            name: if node.is_overcommitted() {
                node.node_name.red().bold().to_string()
            } else {
                node.node_name.cyan().to_string()
            },
            allocatable_cpu: format_cpu(node.allocatable.cpu().value()),
            allocatable_memory: format_bytes(node.allocatable.memory().value()),
            available_cpu: color_available(format_cpu(cpu), cpu),
            available_memory: color_available(format_bytes(memory), memory),
            pods: node.pods_counted,
        }
    }
}

/// Show allocatable and available resources for every node
pub fn show(snapshot: &ClusterSnapshot, ctx: &RunContext, overcommitted_only: bool) -> Result<()> {
    let pods = ctx.filter.apply(&snapshot.pods);
    let mut nodes = node_availability(&snapshot.nodes, pods.iter().copied(), &ctx.attribution)?;
    nodes.sort_by(|a, b| a.node_name.cmp(&b.node_name));

    let overcommitted = nodes.iter().filter(|n| n.is_overcommitted()).count();
    if overcommitted_only {
        nodes.retain(NodeAvailability::is_overcommitted);
    }

    match ctx.format {
        OutputFormat::Json => print_json(&nodes)?,
        OutputFormat::Table => {
            print_header("Node Headroom");
            print_table(nodes.iter().map(NodeRow::from).collect());

            let unattributed = map_pods(pods.iter().copied(), &ctx.attribution)
                .get("")
                .map_or(0, Vec::len);
            if unattributed > 0 {
                print_info(&format!(
                    "{} pods have no {} node and reduce no node's availability",
                    unattributed, ctx.attribution
                ));
            }

            if overcommitted > 0 {
                print_warning(&format!("{} nodes are over-committed", overcommitted));
            } else if !snapshot.nodes.is_empty() {
                print_success("No over-committed nodes");
            }
        }
    }

    Ok(())
}
