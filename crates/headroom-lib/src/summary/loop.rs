//! Summary loop
//!
//! Periodically fetches a snapshot, computes usage and capacity, and
//! publishes the result to metrics, logs, health and a watch channel.

use super::{summarize, ClusterSummary};
use crate::capacity::Attribution;
use crate::error::Result;
use crate::health::{components, HealthRegistry};
use crate::observability::{HeadroomMetrics, StructuredLogger};
use crate::pod::PodFilter;
use crate::snapshot::SnapshotSource;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, watch};
use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::{debug, info};

/// Configuration for the summary loop
#[derive(Debug, Clone)]
pub struct SummaryConfig {
    /// Time between cycles (default: 30 seconds)
    pub interval: Duration,
    /// Pods to exclude before aggregation
    pub filter: PodFilter,
    /// How pods are attributed to nodes
    pub attribution: Attribution,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(30),
            filter: PodFilter {
                exclude_daemonsets: true,
                exclude_static: true,
            },
            attribution: Attribution::Nominated,
        }
    }
}

/// Computes a fresh summary on every tick
pub struct SummaryLoop {
    source: Arc<dyn SnapshotSource>,
    config: SummaryConfig,
    health: HealthRegistry,
    metrics: HeadroomMetrics,
    logger: StructuredLogger,
    latest_tx: watch::Sender<Option<ClusterSummary>>,
}

impl SummaryLoop {
    /// Create a new loop and the receiver that observes its latest summary
    pub fn new(
        source: Arc<dyn SnapshotSource>,
        config: SummaryConfig,
        health: HealthRegistry,
        logger: StructuredLogger,
    ) -> (Self, watch::Receiver<Option<ClusterSummary>>) {
        let (latest_tx, latest_rx) = watch::channel(None);

        let summary_loop = Self {
            source,
            config,
            health,
            metrics: HeadroomMetrics::new(),
            logger,
            latest_tx,
        };

        (summary_loop, latest_rx)
    }

    /// Run until a shutdown signal is received
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        info!(
            interval_secs = self.config.interval.as_secs(),
            attribution = %self.config.attribution,
            "Starting summary loop"
        );

        let mut ticker = interval(self.config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    // failures are already recorded in metrics, logs and health
                    let _ = self.run_cycle().await;
                }
                _ = shutdown.recv() => {
                    info!("Shutting down summary loop");
                    break;
                }
            }
        }
    }

    /// Run one fetch-and-summarize cycle
    pub async fn run_cycle(&self) -> Result<ClusterSummary> {
        let start = Instant::now();
        let result = self.compute().await;
        self.metrics.observe_cycle_duration(start.elapsed().as_secs_f64());

        match &result {
            Ok(summary) => {
                self.metrics.set_usage(&summary.usage);
                self.metrics.set_capacity(&summary.capacity);
                self.metrics.set_counts(summary.pods_counted, summary.nodes);
                self.logger.log_usage(&summary.usage, summary.pods_counted);
                self.logger.log_capacity(&summary.capacity, summary.nodes);

                self.health.record_success(components::SNAPSHOT_SOURCE).await;
                self.health.set_ready(true).await;
                self.latest_tx.send_replace(Some(summary.clone()));

                debug!(
                    elapsed_ms = start.elapsed().as_millis(),
                    pods_excluded = summary.pods_excluded,
                    "Summary cycle complete"
                );
            }
            Err(e) => {
                self.metrics.inc_snapshot_errors();
                self.logger.log_snapshot_failed(&e.to_string());
                self.health
                    .record_failure(components::SNAPSHOT_SOURCE, e.to_string())
                    .await;
            }
        }

        result
    }

    async fn compute(&self) -> Result<ClusterSummary> {
        let snapshot = self.source.fetch().await?;
        summarize(&snapshot, self.config.filter, &self.config.attribution)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::ComponentStatus;
    use crate::snapshot::{ClusterSnapshot, StaticSnapshotSource};
    use async_trait::async_trait;
    use k8s_openapi::api::core::v1::{Node, NodeStatus};
    use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Source that always fails, counting attempts
    struct FailingSource {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl SnapshotSource for FailingSource {
        async fn fetch(&self) -> Result<ClusterSnapshot> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(crate::Error::invalid("bogus", "unknown suffix"))
        }
    }

    fn one_node_snapshot() -> ClusterSnapshot {
        let mut node = Node {
            status: Some(NodeStatus {
                allocatable: Some(BTreeMap::from([
                    ("cpu".to_string(), Quantity("2".to_string())),
                    ("memory".to_string(), Quantity("4Gi".to_string())),
                ])),
                ..Default::default()
            }),
            ..Default::default()
        };
        node.metadata.name = Some("node-a".to_string());
        ClusterSnapshot {
            pods: Vec::new(),
            nodes: vec![node],
        }
    }

    async fn registry() -> HealthRegistry {
        let health = HealthRegistry::new();
        health.register(components::SNAPSHOT_SOURCE).await;
        health
    }

    #[test]
    fn test_summary_config_default() {
        let config = SummaryConfig::default();
        assert_eq!(config.interval, Duration::from_secs(30));
        assert!(config.filter.exclude_daemonsets);
        assert!(config.filter.exclude_static);
        assert_eq!(config.attribution, Attribution::Nominated);
    }

    #[tokio::test]
    async fn test_successful_cycle_publishes_summary_and_marks_ready() {
        let health = registry().await;
        let source = Arc::new(StaticSnapshotSource::new(one_node_snapshot()));
        let (summary_loop, latest) = SummaryLoop::new(
            source,
            SummaryConfig::default(),
            health.clone(),
            StructuredLogger::new("test"),
        );

        let summary = summary_loop.run_cycle().await.unwrap();
        assert_eq!(summary.nodes, 1);
        assert_eq!(summary.capacity.total.cpu().value(), 2000);

        assert_eq!(latest.borrow().as_ref(), Some(&summary));
        assert!(health.readiness().await.ready);
    }

    #[tokio::test]
    async fn test_repeated_failures_mark_source_unhealthy() {
        let health = HealthRegistry::with_failure_threshold(2);
        health.register(components::SNAPSHOT_SOURCE).await;
        let source = Arc::new(FailingSource {
            calls: AtomicUsize::new(0),
        });
        let (summary_loop, latest) = SummaryLoop::new(
            source.clone(),
            SummaryConfig::default(),
            health.clone(),
            StructuredLogger::new("test"),
        );

        assert!(summary_loop.run_cycle().await.is_err());
        assert_eq!(health.health().await.status, ComponentStatus::Degraded);

        assert!(summary_loop.run_cycle().await.is_err());
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
        assert!(latest.borrow().is_none());

        let status = health.health().await;
        assert_eq!(status.status, ComponentStatus::Unhealthy);
        assert!(!health.readiness().await.ready);
    }

    #[tokio::test]
    async fn test_loop_stops_on_shutdown() {
        let source = Arc::new(StaticSnapshotSource::new(one_node_snapshot()));
        let config = SummaryConfig {
            interval: Duration::from_millis(10),
            ..Default::default()
        };
        let (summary_loop, mut latest) =
            SummaryLoop::new(source, config, registry().await, StructuredLogger::new("test"));

        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        let handle = tokio::spawn(summary_loop.run(shutdown_rx));

        latest.changed().await.unwrap();
        assert!(latest.borrow().is_some());

        shutdown_tx.send(()).unwrap();
        handle.await.unwrap();
    }
}
