//! Headroom CLI
//!
//! A command-line tool for inspecting requested usage, allocatable capacity
//! and per-node headroom of a Kubernetes cluster or a saved snapshot.

mod commands;
mod config;
mod output;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use commands::{capacity, nodes, summary, usage, RunContext};
use headroom_lib::{
    Attribution, ClusterSnapshot, KubeSnapshotSource, PodFilter, SnapshotSource,
    StaticSnapshotSource,
};
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Headroom CLI
#[derive(Parser)]
#[command(name = "headroom")]
#[command(
    author,
    version,
    about = "Cluster headroom: requested usage versus allocatable capacity",
    long_about = None
)]
pub struct Cli {
    /// Path to kubeconfig file (uses default discovery if not specified)
    #[arg(long, global = true)]
    pub kubeconfig: Option<PathBuf>,

    /// Read pods and nodes from a JSON snapshot file instead of the cluster
    #[arg(long, global = true, env = "HEADROOM_SNAPSHOT")]
    pub snapshot: Option<PathBuf>,

    /// Output format
    #[arg(long, short, global = true)]
    pub format: Option<output::OutputFormat>,

    /// How pods are attributed to nodes (nominated, bound)
    #[arg(long, global = true)]
    pub attribution: Option<Attribution>,

    /// Count DaemonSet pods
    #[arg(long, global = true)]
    pub include_daemonsets: bool,

    /// Count static (file-sourced) pods
    #[arg(long, global = true)]
    pub include_static: bool,

    /// Enable verbose output
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Requested usage across pods
    Usage,

    /// Allocatable capacity across nodes
    Capacity,

    /// Per-node allocatable and available resources
    Nodes {
        /// Only show nodes with negative availability
        #[arg(long)]
        overcommitted: bool,
    },

    /// Usage and capacity together
    Summary,

    /// Manage CLI defaults
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the current configuration
    Show,

    /// Update stored defaults
    Set {
        /// Default output format
        #[arg(long)]
        default_format: Option<output::OutputFormat>,

        /// Default attribution source
        #[arg(long)]
        default_attribution: Option<Attribution>,

        /// Default kubeconfig path
        #[arg(long)]
        default_kubeconfig: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(if cli.verbose { "debug" } else { "warn" }))
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let stored = config::Config::load()?;
    let ctx = RunContext {
        filter: PodFilter {
            exclude_daemonsets: !cli.include_daemonsets,
            exclude_static: !cli.include_static,
        },
        attribution: cli.attribution.or(stored.attribution).unwrap_or_default(),
        format: cli.format.or(stored.default_format).unwrap_or_default(),
    };
    debug!(attribution = %ctx.attribution, filter = ?ctx.filter, "Resolved options");

    let fetch = || load_snapshot(cli.snapshot.as_deref(), cli.kubeconfig.as_deref(), &stored);

    match cli.command {
        Commands::Usage => usage::show(&fetch().await?, &ctx)?,
        Commands::Capacity => capacity::show(&fetch().await?, &ctx)?,
        Commands::Nodes { overcommitted } => nodes::show(&fetch().await?, &ctx, overcommitted)?,
        Commands::Summary => summary::show(&fetch().await?, &ctx)?,
        Commands::Config(ConfigCommands::Show) => commands::config::show(&stored, ctx.format)?,
        Commands::Config(ConfigCommands::Set {
            default_format,
            default_attribution,
            default_kubeconfig,
        }) => commands::config::set(
            stored.clone(),
            default_format,
            default_attribution,
            default_kubeconfig,
        )?,
    }

    Ok(())
}

async fn load_snapshot(
    snapshot_file: Option<&Path>,
    kubeconfig: Option<&Path>,
    stored: &config::Config,
) -> Result<ClusterSnapshot> {
    let source: Box<dyn SnapshotSource> = match snapshot_file {
        Some(path) => Box::new(
            StaticSnapshotSource::from_path(path)
                .with_context(|| format!("Failed to load snapshot {}", path.display()))?,
        ),
        None => match config::kubeconfig_path(kubeconfig, stored) {
            Some(path) => Box::new(
                KubeSnapshotSource::from_kubeconfig(&path)
                    .await
                    .with_context(|| format!("Failed to load kubeconfig {}", path.display()))?,
            ),
            None => Box::new(
                KubeSnapshotSource::try_default()
                    .await
                    .context("Failed to create Kubernetes client")?,
            ),
        },
    };

    source.fetch().await.context("Failed to fetch pods and nodes")
}
