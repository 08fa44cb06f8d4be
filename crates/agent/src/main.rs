//! Headroom Agent - cluster usage and capacity summaries
//!
//! This binary runs as a single Deployment replica, periodically listing
//! pods and nodes and publishing the summaries a cluster autoscaler policy
//! consumes.

use anyhow::{Context, Result};
use headroom_lib::{
    health::{components, HealthRegistry},
    KubeSnapshotSource, SnapshotSource, StructuredLogger, SummaryLoop,
};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod api;
mod config;

const AGENT_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and env filter
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    info!("Starting headroom-agent");

    let config = config::AgentConfig::load().context("invalid HEADROOM_* configuration")?;
    info!(
        cluster = %config.cluster_name,
        interval_secs = config.interval_secs,
        attribution = %config.attribution,
        "Agent configured"
    );

    let health_registry = HealthRegistry::with_failure_threshold(config.failure_threshold);
    health_registry.register(components::SNAPSHOT_SOURCE).await;

    let logger = StructuredLogger::new(&config.cluster_name);
    logger.log_startup(AGENT_VERSION);

    let source: Arc<dyn SnapshotSource> = match &config.kubeconfig {
        Some(path) => Arc::new(
            KubeSnapshotSource::from_kubeconfig(path)
                .await
                .with_context(|| format!("failed to load kubeconfig {}", path.display()))?,
        ),
        None => Arc::new(
            KubeSnapshotSource::try_default()
                .await
                .context("failed to create Kubernetes client")?,
        ),
    };

    let (summary_loop, latest) = SummaryLoop::new(
        source,
        config.summary_config(),
        health_registry.clone(),
        logger.clone(),
    );

    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    let loop_handle = tokio::spawn(summary_loop.run(shutdown_rx));

    // Start health, metrics and summary server
    let app_state = Arc::new(api::AppState::new(health_registry, latest));
    let api_handle = tokio::spawn(api::serve(config.api_port, app_state));

    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            result?;
            logger.log_shutdown("SIGINT received");
        }
        result = api_handle => {
            match result {
                Ok(Err(e)) => error!(error = %e, "API server failed"),
                Err(e) => error!(error = %e, "API server task panicked"),
                Ok(Ok(())) => {}
            }
            logger.log_shutdown("API server stopped");
        }
    }

    let _ = shutdown_tx.send(());
    if let Err(e) = loop_handle.await {
        error!(error = %e, "Summary loop task failed");
    }

    info!("Shutting down");
    Ok(())
}
