//! Health check infrastructure for the headroom agent
//!
//! A single failed snapshot only degrades a component; it becomes unhealthy
//! after `failure_threshold` consecutive failures. The agent is ready once
//! the first summary has been published.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Consecutive failures before a component is reported unhealthy
pub const DEFAULT_FAILURE_THRESHOLD: u32 = 3;

/// Health status of a component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

/// Information about a component's health
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    pub status: ComponentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub consecutive_failures: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_success_timestamp: Option<i64>,
    pub last_check_timestamp: i64,
}

impl ComponentHealth {
    fn new() -> Self {
        Self {
            status: ComponentStatus::Healthy,
            message: None,
            consecutive_failures: 0,
            last_success_timestamp: None,
            last_check_timestamp: chrono::Utc::now().timestamp(),
        }
    }
}

/// Overall health response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: ComponentStatus,
    pub components: HashMap<String, ComponentHealth>,
}

impl HealthResponse {
    /// Worst status across all components
    pub fn compute_status(components: &HashMap<String, ComponentHealth>) -> ComponentStatus {
        components
            .values()
            .map(|c| c.status)
            .fold(ComponentStatus::Healthy, |worst, status| match (worst, status) {
                (ComponentStatus::Unhealthy, _) | (_, ComponentStatus::Unhealthy) => {
                    ComponentStatus::Unhealthy
                }
                (ComponentStatus::Degraded, _) | (_, ComponentStatus::Degraded) => {
                    ComponentStatus::Degraded
                }
                _ => ComponentStatus::Healthy,
            })
    }
}

/// Readiness response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Component names for health tracking
pub mod components {
    pub const SNAPSHOT_SOURCE: &str = "snapshot_source";
}

#[derive(Debug, Default)]
struct RegistryState {
    components: HashMap<String, ComponentHealth>,
    ready: bool,
}

/// Shared health state for probes
#[derive(Debug, Clone)]
pub struct HealthRegistry {
    state: Arc<RwLock<RegistryState>>,
    failure_threshold: u32,
}

impl Default for HealthRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl HealthRegistry {
    pub fn new() -> Self {
        Self::with_failure_threshold(DEFAULT_FAILURE_THRESHOLD)
    }

    pub fn with_failure_threshold(failure_threshold: u32) -> Self {
        Self {
            state: Arc::new(RwLock::new(RegistryState::default())),
            failure_threshold: failure_threshold.max(1),
        }
    }

    /// Register a component with initial healthy status
    pub async fn register(&self, name: &str) {
        let mut state = self.state.write().await;
        state.components.insert(name.to_string(), ComponentHealth::new());
    }

    /// Record a successful operation, resetting the failure count
    pub async fn record_success(&self, name: &str) {
        let now = chrono::Utc::now().timestamp();
        let mut state = self.state.write().await;
        let health = state
            .components
            .entry(name.to_string())
            .or_insert_with(ComponentHealth::new);

        health.status = ComponentStatus::Healthy;
        health.message = None;
        health.consecutive_failures = 0;
        health.last_success_timestamp = Some(now);
        health.last_check_timestamp = now;
    }

    /// Record a failed operation
    pub async fn record_failure(&self, name: &str, message: impl Into<String>) {
        let threshold = self.failure_threshold;
        let mut state = self.state.write().await;
        let health = state
            .components
            .entry(name.to_string())
            .or_insert_with(ComponentHealth::new);

        health.consecutive_failures = health.consecutive_failures.saturating_add(1);
        health.status = if health.consecutive_failures >= threshold {
            ComponentStatus::Unhealthy
        } else {
            ComponentStatus::Degraded
        };
        health.message = Some(message.into());
        health.last_check_timestamp = chrono::Utc::now().timestamp();
    }

    pub async fn set_ready(&self, ready: bool) {
        self.state.write().await.ready = ready;
    }

    pub async fn health(&self) -> HealthResponse {
        let components = self.state.read().await.components.clone();
        let status = HealthResponse::compute_status(&components);
        HealthResponse { status, components }
    }

    pub async fn readiness(&self) -> ReadinessResponse {
        let state = self.state.read().await;
        let status = HealthResponse::compute_status(&state.components);

        let reason = if !state.ready {
            Some("No summary computed yet".to_string())
        } else if status == ComponentStatus::Unhealthy {
            Some("Snapshot source failing repeatedly".to_string())
        } else {
            None
        };

        ReadinessResponse {
            ready: reason.is_none(),
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_initial_state_is_healthy_but_not_ready() {
        let registry = HealthRegistry::new();
        registry.register(components::SNAPSHOT_SOURCE).await;

        assert_eq!(registry.health().await.status, ComponentStatus::Healthy);
        let readiness = registry.readiness().await;
        assert!(!readiness.ready);
        assert!(readiness.reason.is_some());
    }

    #[tokio::test]
    async fn test_failures_degrade_then_become_unhealthy() {
        let registry = HealthRegistry::with_failure_threshold(2);
        registry.register(components::SNAPSHOT_SOURCE).await;
        registry.set_ready(true).await;

        registry.record_failure(components::SNAPSHOT_SOURCE, "timeout").await;
        let health = registry.health().await;
        assert_eq!(health.status, ComponentStatus::Degraded);
        assert!(registry.readiness().await.ready);

        registry.record_failure(components::SNAPSHOT_SOURCE, "timeout").await;
        let health = registry.health().await;
        assert_eq!(health.status, ComponentStatus::Unhealthy);
        assert_eq!(health.components[components::SNAPSHOT_SOURCE].consecutive_failures, 2);
        assert!(!registry.readiness().await.ready);
    }

    #[tokio::test]
    async fn test_success_resets_failures() {
        let registry = HealthRegistry::with_failure_threshold(1);
        registry.record_failure(components::SNAPSHOT_SOURCE, "forbidden").await;
        assert_eq!(registry.health().await.status, ComponentStatus::Unhealthy);

        registry.record_success(components::SNAPSHOT_SOURCE).await;
        let health = registry.health().await;
        let snapshot = &health.components[components::SNAPSHOT_SOURCE];
        assert_eq!(health.status, ComponentStatus::Healthy);
        assert_eq!(snapshot.consecutive_failures, 0);
        assert!(snapshot.message.is_none());
        assert!(snapshot.last_success_timestamp.is_some());
    }

    #[test]
    fn test_compute_status_picks_worst() {
        let mut components = HashMap::new();
        components.insert("a".to_string(), ComponentHealth::new());
        let mut degraded = ComponentHealth::new();
        degraded.status = ComponentStatus::Degraded;
        components.insert("b".to_string(), degraded);

        assert_eq!(HealthResponse::compute_status(&components), ComponentStatus::Degraded);
    }
}
