//! Combined usage and capacity command

use anyhow::Result;
use colored::Colorize;
use headroom_lib::{summarize, ClusterSnapshot};

use super::capacity::capacity_rows;
use super::usage::usage_rows;
use super::RunContext;
use crate::output::{print_header, print_info, print_json, print_table, OutputFormat};

/// Show both summaries computed from one snapshot
pub fn show(snapshot: &ClusterSnapshot, ctx: &RunContext) -> Result<()> {
    let summary = summarize(snapshot, ctx.filter, &ctx.attribution)?;

    match ctx.format {
        OutputFormat::Json => print_json(&summary)?,
        OutputFormat::Table => {
            print_header("Cluster Summary");
            println!("Pods counted:  {}", summary.pods_counted.to_string().cyan());
            println!("Pods excluded: {}", summary.pods_excluded);
            println!("Nodes:         {}", summary.nodes.to_string().cyan());
            println!();

            println!("{}", "Requested Usage".bold());
            println!("{}", "-".repeat(50));
            print_table(usage_rows(&summary.usage));
            println!();

            println!("{}", "Allocatable Capacity".bold());
            println!("{}", "-".repeat(50));
            print_table(capacity_rows(&summary.capacity));

            let spare_cpu = summary.capacity.total.cpu() - summary.usage.total.cpu();
            let spare_memory = summary.capacity.total.memory() - summary.usage.total.memory();
            print_info(&format!(
                "Unrequested capacity: cpu={} memory={}",
                spare_cpu, spare_memory
            ));
        }
    }

    Ok(())
}
