//! Agent configuration

use anyhow::Result;
use headroom_lib::{Attribution, PodFilter, SummaryConfig};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

const ENV_PREFIX: &str = "HEADROOM";

/// Agent configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AgentConfig {
    /// Cluster name attached to every log event
    #[serde(default = "default_cluster_name")]
    pub cluster_name: String,

    /// API server port for health/metrics/summary
    #[serde(default = "default_api_port")]
    pub api_port: u16,

    /// Seconds between summary cycles
    #[serde(default = "default_interval")]
    pub interval_secs: u64,

    #[serde(default = "default_true")]
    pub exclude_daemonsets: bool,

    #[serde(default = "default_true")]
    pub exclude_static_pods: bool,

    #[serde(default)]
    pub attribution: Attribution,

    /// Consecutive failed cycles before the snapshot source is unhealthy
    #[serde(default = "default_failure_threshold")]
    pub failure_threshold: u32,

    /// Explicit kubeconfig; in-cluster or default discovery otherwise
    #[serde(default)]
    pub kubeconfig: Option<PathBuf>,
}

fn default_cluster_name() -> String {
    "default".to_string()
}

fn default_api_port() -> u16 {
    8080
}

fn default_interval() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

fn default_failure_threshold() -> u32 {
    headroom_lib::health::DEFAULT_FAILURE_THRESHOLD
}

impl AgentConfig {
    /// Load configuration from `HEADROOM_*` environment variables
    pub fn load() -> Result<Self> {
        Self::from_env(config::Environment::with_prefix(ENV_PREFIX))
    }

    fn from_env(env: config::Environment) -> Result<Self> {
        let config = config::Config::builder()
            .add_source(env.try_parsing(true))
            .build()?;

        Ok(config.try_deserialize()?)
    }

    pub fn summary_config(&self) -> SummaryConfig {
        SummaryConfig {
            // a zero period would panic in tokio::time::interval
            interval: Duration::from_secs(self.interval_secs.max(1)),
            filter: PodFilter {
                exclude_daemonsets: self.exclude_daemonsets,
                exclude_static: self.exclude_static_pods,
            },
            attribution: self.attribution,
        }
    }
}
