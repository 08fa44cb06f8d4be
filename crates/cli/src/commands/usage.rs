//! Requested usage command

use anyhow::Result;
use headroom_lib::{calculate_pods_requested_usage, ClusterSnapshot, PodRequestedUsage};
use serde::Serialize;

use super::RunContext;
use crate::output::{print_header, print_info, print_json, print_table, ItemRow, OutputFormat};

#[derive(Serialize)]
struct UsageReport {
    pods_counted: usize,
    pods_excluded: usize,
    usage: PodRequestedUsage,
}

/// Rows for a usage summary, shared with the summary command
pub fn usage_rows(usage: &PodRequestedUsage) -> Vec<ItemRow> {
    vec![
        ItemRow::new("Total requested", usage.total),
        ItemRow::new("Largest pending (memory)", usage.largest_memory),
        ItemRow::new("Largest pending (cpu)", usage.largest_cpu),
    ]
}

/// Show requested usage across the snapshot's pods
pub fn show(snapshot: &ClusterSnapshot, ctx: &RunContext) -> Result<()> {
    let pods = ctx.filter.apply(&snapshot.pods);
    let usage = calculate_pods_requested_usage(pods.iter().copied())?;

    let report = UsageReport {
        pods_counted: pods.len(),
        pods_excluded: snapshot.pods.len() - pods.len(),
        usage,
    };

    match ctx.format {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Table => {
            print_header("Requested Usage");
            print_table(usage_rows(&report.usage));
            print_info(&format!(
                "{} pods counted, {} excluded",
                report.pods_counted, report.pods_excluded
            ));
        }
    }

    Ok(())
}
