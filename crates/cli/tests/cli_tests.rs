//! CLI integration tests

use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

const GI: i64 = 1024 * 1024 * 1024;

/// Two nodes; node-b is over-committed by its nominated pending pod
const SNAPSHOT: &str = r#"{
  "nodes": [
    {
      "apiVersion": "v1", "kind": "Node",
      "metadata": {"name": "node-a"},
      "status": {"allocatable": {"cpu": "4", "memory": "8Gi", "pods": "110"}}
    },
    {
      "apiVersion": "v1", "kind": "Node",
      "metadata": {"name": "node-b"},
      "status": {"allocatable": {"cpu": "2", "memory": "4Gi"}}
    }
  ],
  "pods": [
    {
      "apiVersion": "v1", "kind": "Pod",
      "metadata": {"name": "web", "namespace": "default"},
      "spec": {
        "nodeName": "node-a",
        "containers": [{"name": "web", "resources": {"requests": {"cpu": "1", "memory": "2Gi"}}}]
      },
      "status": {
        "phase": "Running",
        "nominatedNodeName": "node-a",
        "conditions": [{"type": "PodScheduled", "status": "True"}]
      }
    },
    {
      "apiVersion": "v1", "kind": "Pod",
      "metadata": {"name": "batch", "namespace": "default"},
      "spec": {
        "containers": [{"name": "batch", "resources": {"requests": {"cpu": "3", "memory": "1Gi"}}}]
      },
      "status": {
        "phase": "Pending",
        "nominatedNodeName": "node-b",
        "conditions": [{"type": "PodScheduled", "status": "True"}]
      }
    },
    {
      "apiVersion": "v1", "kind": "Pod",
      "metadata": {"name": "unschedulable", "namespace": "default"},
      "spec": {
        "containers": [{"name": "big", "resources": {"requests": {"cpu": "500m", "memory": "6Gi"}}}]
      },
      "status": {
        "phase": "Pending",
        "conditions": [{"type": "PodScheduled", "status": "False"}]
      }
    },
    {
      "apiVersion": "v1", "kind": "Pod",
      "metadata": {
        "name": "agent-x7k2p",
        "namespace": "kube-system",
        "ownerReferences": [{"apiVersion": "apps/v1", "kind": "DaemonSet", "name": "agent", "uid": "1"}]
      },
      "spec": {
        "nodeName": "node-a",
        "containers": [{"name": "agent", "resources": {"requests": {"cpu": "100m", "memory": "128Mi"}}}]
      },
      "status": {
        "phase": "Running",
        "nominatedNodeName": "node-a",
        "conditions": [{"type": "PodScheduled", "status": "True"}]
      }
    }
  ]
}"#;

/// Isolated home directory plus a snapshot file inside it
struct Fixture {
    home: TempDir,
    snapshot: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let home = tempfile::tempdir().expect("Failed to create temp dir");
        let snapshot = home.path().join("snapshot.json");
        std::fs::write(&snapshot, SNAPSHOT).expect("Failed to write snapshot");
        Self { home, snapshot }
    }

    fn run(&self, args: &[&str]) -> Output {
        headroom(self.home.path(), args)
    }

    fn run_snapshot(&self, args: &[&str]) -> Output {
        let mut full = vec!["--snapshot", self.snapshot.to_str().expect("utf-8 path")];
        full.extend_from_slice(args);
        self.run(&full)
    }

    fn json(&self, args: &[&str]) -> Value {
        let mut full = vec!["--format", "json"];
        full.extend_from_slice(args);
        let output = self.run_snapshot(&full);
        assert!(
            output.status.success(),
            "command failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        serde_json::from_slice(&output.stdout).expect("stdout should be JSON")
    }
}

fn headroom(home: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_headroom"))
        .args(args)
        .env("HOME", home)
        .env_remove("HEADROOM_SNAPSHOT")
        .env_remove("KUBECONFIG")
        .output()
        .expect("Failed to execute command")
}

fn item(value: &Value) -> (i64, i64) {
    (
        value["cpu"].as_i64().expect("cpu"),
        value["memory"].as_i64().expect("memory"),
    )
}

/// Test that the CLI shows help
#[test]
fn test_cli_help() {
    let output = Fixture::new().run(&["--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI help should succeed");
    for command in ["usage", "capacity", "nodes", "summary", "config"] {
        assert!(stdout.contains(command), "Should show {} command", command);
    }
    assert!(stdout.contains("--format"), "Should show format option");
    assert!(stdout.contains("--attribution"), "Should show attribution option");
    assert!(stdout.contains("--include-daemonsets"));
}

/// Test that the CLI shows version
#[test]
fn test_cli_version() {
    let output = Fixture::new().run(&["--version"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI version should succeed");
    assert!(stdout.contains("headroom"), "Should show binary name");
}

#[test]
fn test_nodes_help() {
    let output = Fixture::new().run(&["nodes", "--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    assert!(stdout.contains("--overcommitted"));
}

#[test]
fn test_usage_excludes_daemonsets_by_default() {
    let report = Fixture::new().json(&["usage"]);

    assert_eq!(report["pods_counted"], 3);
    assert_eq!(report["pods_excluded"], 1);
    assert_eq!(item(&report["usage"]["total"]), (4500, 9 * GI));
    // only pending pods compete for the largest slots
    assert_eq!(item(&report["usage"]["largest_memory"]), (500, 6 * GI));
    assert_eq!(item(&report["usage"]["largest_cpu"]), (3000, GI));
}

#[test]
fn test_usage_include_daemonsets() {
    let report = Fixture::new().json(&["--include-daemonsets", "usage"]);

    assert_eq!(report["pods_counted"], 4);
    assert_eq!(report["pods_excluded"], 0);
    assert_eq!(item(&report["usage"]["total"]), (4600, 9 * GI + 128 * 1024 * 1024));
}

#[test]
fn test_capacity_records_allocatable_of_winner() {
    let report = Fixture::new().json(&["capacity"]);

    assert_eq!(report["nodes"], 2);
    assert_eq!(item(&report["capacity"]["total"]), (6000, 12 * GI));
    assert_eq!(item(&report["capacity"]["largest_available_cpu"]), (4000, 8 * GI));
    assert_eq!(item(&report["capacity"]["largest_available_memory"]), (4000, 8 * GI));
}

#[test]
fn test_nodes_nominated_attribution() {
    let nodes = Fixture::new().json(&["nodes"]);
    let nodes = nodes.as_array().expect("array");

    assert_eq!(nodes.len(), 2);
    assert_eq!(nodes[0]["node_name"], "node-a");
    assert_eq!(item(&nodes[0]["available"]), (3000, 6 * GI));
    assert_eq!(nodes[1]["node_name"], "node-b");
    assert_eq!(item(&nodes[1]["available"]), (-1000, 3 * GI));
    assert_eq!(nodes[1]["pods_counted"], 1);
}

#[test]
fn test_nodes_bound_attribution() {
    let nodes = Fixture::new().json(&["--attribution", "bound", "nodes"]);
    let nodes = nodes.as_array().expect("array");

    assert_eq!(item(&nodes[0]["available"]), (3000, 6 * GI));
    // batch is nominated to node-b but not bound yet
    assert_eq!(item(&nodes[1]["available"]), (2000, 4 * GI));
    assert_eq!(nodes[1]["pods_counted"], 0);
}

#[test]
fn test_nodes_overcommitted_only() {
    let nodes = Fixture::new().json(&["nodes", "--overcommitted"]);
    let nodes = nodes.as_array().expect("array");

    assert_eq!(nodes.len(), 1);
    assert_eq!(nodes[0]["node_name"], "node-b");
}

#[test]
fn test_summary_json() {
    let summary = Fixture::new().json(&["summary"]);

    assert_eq!(summary["nodes"], 2);
    assert_eq!(summary["pods_counted"], 3);
    assert!(summary["computed_at"].as_i64().expect("timestamp") > 0);
}

#[test]
fn test_table_output() {
    let output = Fixture::new().run_snapshot(&["nodes"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    assert!(stdout.contains("Node Headroom"));
    assert!(stdout.contains("node-a"));
    assert!(stdout.contains("1 nodes are over-committed"));
    assert!(stdout.contains("1 pods have no nominated node"));
}

#[test]
fn test_invalid_attribution() {
    let output = Fixture::new().run_snapshot(&["--attribution", "scheduled", "usage"]);

    assert!(!output.status.success(), "Unknown attribution should fail");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unknown attribution"));
}

#[test]
fn test_missing_snapshot_file() {
    let output = Fixture::new().run(&["--snapshot", "/nonexistent/snapshot.json", "usage"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to load snapshot"));
}

#[test]
fn test_config_defaults_apply() {
    let fixture = Fixture::new();

    let output = fixture.run(&[
        "config",
        "set",
        "--default-format",
        "json",
        "--default-attribution",
        "bound",
    ]);
    assert!(output.status.success(), "config set should succeed");
    assert!(fixture
        .home
        .path()
        .join(".config/headroom/config.json")
        .exists());

    // stored defaults: JSON output and bound attribution
    let output = fixture.run_snapshot(&["nodes"]);
    let nodes: Value = serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    assert_eq!(item(&nodes[1]["available"]), (2000, 4 * GI));

    // flags still win over stored defaults
    let output = fixture.run_snapshot(&["--attribution", "nominated", "nodes"]);
    let nodes: Value = serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    assert_eq!(item(&nodes[1]["available"]), (-1000, 3 * GI));
}

/// Test invalid command error handling
#[test]
fn test_invalid_command() {
    let output = Fixture::new().run(&["invalid-command"]);

    assert!(!output.status.success(), "Invalid command should fail");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("error") || stderr.contains("invalid"),
        "Should show error message"
    );
}
