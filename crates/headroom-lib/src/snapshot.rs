//! Point-in-time cluster snapshots
//!
//! The aggregation functions are pure; everything that talks to the API
//! server lives behind [`SnapshotSource`].

use crate::error::Result;
use async_trait::async_trait;
use k8s_openapi::api::core::v1::{Node, Pod};
use kube::api::{Api, ListParams};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config, Resource};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::path::Path;
use tracing::debug;

/// Page size used when listing objects
const LIST_PAGE_SIZE: u32 = 500;

/// Pods and nodes observed together
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterSnapshot {
    pub pods: Vec<Pod>,
    pub nodes: Vec<Node>,
}

/// Supplies cluster snapshots to the aggregators
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// Fetch the current pods and nodes
    async fn fetch(&self) -> Result<ClusterSnapshot>;
}

/// Lists pods and nodes from the Kubernetes API
#[derive(Clone)]
pub struct KubeSnapshotSource {
    client: Client,
}

impl KubeSnapshotSource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Connect using the default kubeconfig or in-cluster configuration
    pub async fn try_default() -> Result<Self> {
        Ok(Self::new(Client::try_default().await?))
    }

    /// Connect using an explicit kubeconfig file
    pub async fn from_kubeconfig(path: &Path) -> Result<Self> {
        let kubeconfig = Kubeconfig::read_from(path)?;
        let options = KubeConfigOptions::default();
        let config = Config::from_custom_kubeconfig(kubeconfig, &options).await?;
        Ok(Self::new(Client::try_from(config)?))
    }

    async fn list_all<K>(&self) -> Result<Vec<K>>
    where
        K: Resource<DynamicType = ()> + Clone + DeserializeOwned + Debug,
    {
        let api: Api<K> = Api::all(self.client.clone());
        let mut items = Vec::new();
        let mut params = ListParams::default().limit(LIST_PAGE_SIZE);

        loop {
            let page = api.list(&params).await?;
            items.extend(page.items);

            match page.metadata.continue_ {
                Some(token) if !token.is_empty() => params = params.continue_token(&token),
                _ => break,
            }
        }

        Ok(items)
    }
}

#[async_trait]
impl SnapshotSource for KubeSnapshotSource {
    async fn fetch(&self) -> Result<ClusterSnapshot> {
        let nodes: Vec<Node> = self.list_all().await?;
        let pods: Vec<Pod> = self.list_all().await?;
        debug!(pods = pods.len(), nodes = nodes.len(), "Fetched cluster snapshot");
        Ok(ClusterSnapshot { pods, nodes })
    }
}

/// Returns the same snapshot on every fetch
#[derive(Debug, Clone, Default)]
pub struct StaticSnapshotSource {
    snapshot: ClusterSnapshot,
}

impl StaticSnapshotSource {
    pub fn new(snapshot: ClusterSnapshot) -> Self {
        Self { snapshot }
    }

    /// Load a `{"pods": [...], "nodes": [...]}` JSON file
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let snapshot: ClusterSnapshot = serde_json::from_str(&content)?;
        debug!(
            path = %path.display(),
            pods = snapshot.pods.len(),
            nodes = snapshot.nodes.len(),
            "Loaded snapshot file"
        );
        Ok(Self::new(snapshot))
    }
}

#[async_trait]
impl SnapshotSource for StaticSnapshotSource {
    async fn fetch(&self) -> Result<ClusterSnapshot> {
        Ok(self.snapshot.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_source_returns_snapshot() {
        let mut node = Node::default();
        node.metadata.name = Some("node-a".to_string());
        let source = StaticSnapshotSource::new(ClusterSnapshot {
            pods: vec![Pod::default(), Pod::default()],
            nodes: vec![node],
        });

        let snapshot = tokio_test::block_on(source.fetch()).unwrap();
        assert_eq!(snapshot.pods.len(), 2);
        assert_eq!(snapshot.nodes[0].metadata.name.as_deref(), Some("node-a"));
    }

    #[test]
    fn test_snapshot_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshot.json");
        std::fs::write(
            &path,
            r#"{
                "nodes": [{
                    "apiVersion": "v1",
                    "kind": "Node",
                    "metadata": {"name": "node-a"},
                    "status": {"allocatable": {"cpu": "4", "memory": "8Gi"}}
                }]
            }"#,
        )
        .unwrap();

        let source = StaticSnapshotSource::from_path(&path).unwrap();
        let snapshot = tokio_test::block_on(source.fetch()).unwrap();
        assert!(snapshot.pods.is_empty());
        assert_eq!(snapshot.nodes.len(), 1);
    }

    #[test]
    fn test_malformed_snapshot_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshot.json");
        std::fs::write(&path, "{not json").unwrap();

        assert!(matches!(
            StaticSnapshotSource::from_path(&path),
            Err(crate::Error::Json(_))
        ));
        assert!(matches!(
            StaticSnapshotSource::from_path(&dir.path().join("missing.json")),
            Err(crate::Error::Io(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_kubeconfig_is_an_error() {
        let path = Path::new("/nonexistent/kubeconfig");
        let result = KubeSnapshotSource::from_kubeconfig(path).await;
        assert!(matches!(result, Err(crate::Error::Kubeconfig(_))));
    }
}
