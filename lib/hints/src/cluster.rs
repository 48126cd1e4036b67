// SPDX-FileCopyrightText: Copyright (c) 2024-2026 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
// SPDX-License-Identifier: Apache-2.0

//! External view of the cluster the scorer runs in.
//!
//! These types mirror what the host orchestrator exposes: nodes with power
//! annotations and resource accounting, pods with per-container requests,
//! and workload groups with a desired replica count. The scorer never
//! watches the cluster itself; it reads snapshots through [`ClusterClient`].

use std::collections::HashMap;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// Annotation carrying a node's idle power draw, as a decimal float.
pub const POWER_IDLE_ANNOTATION: &str = "multiobjective.x-k8s.io/power-idle";

/// Annotation carrying a node's fully-busy power draw, as a decimal float.
pub const POWER_BUSY_ANNOTATION: &str = "multiobjective.x-k8s.io/power-busy";

/// Label marking control-plane nodes. Such nodes never receive planned
/// workloads and are excluded from the cluster fingerprint.
pub const CONTROL_PLANE_LABEL: &str = "node-role.kubernetes.io/control-plane";

/// Namespaces whose workload groups are excluded from fingerprinting by
/// default.
pub const DEFAULT_SYSTEM_NAMESPACES: &[&str] = &[
    "kube-system",
    "kube-public",
    "kube-node-lease",
    "local-path-storage",
];

pub fn default_system_namespaces() -> Vec<String> {
    DEFAULT_SYSTEM_NAMESPACES.iter().map(|s| s.to_string()).collect()
}

/// A scheduling-relevant snapshot of one node.
#[derive(Debug, Clone, Default)]
pub struct NodeInfo {
    pub name: String,
    pub labels: HashMap<String, String>,
    pub annotations: HashMap<String, String>,

    /// Sum of CPU requests of pods already on the node, in milli-cores.
    pub requested_cpu_millis: i64,
    pub allocatable_cpu_millis: i64,

    /// Sum of memory requests of pods already on the node, in bytes.
    pub requested_memory_bytes: i64,
    pub allocatable_memory_bytes: i64,

    /// Maximum pod count the node accepts.
    pub allowed_pods: i64,
    /// Pods currently running on the node.
    pub pod_count: i64,
}

impl NodeInfo {
    pub fn is_control_plane(&self) -> bool {
        self.labels.contains_key(CONTROL_PLANE_LABEL)
    }

    /// Idle power draw from the node annotation; 0 when absent or
    /// unparseable.
    pub fn power_idle(&self) -> f64 {
        self.power_annotation(POWER_IDLE_ANNOTATION)
    }

    /// Busy power draw from the node annotation; 0 when absent or
    /// unparseable.
    pub fn power_busy(&self) -> f64 {
        self.power_annotation(POWER_BUSY_ANNOTATION)
    }

    fn power_annotation(&self, key: &str) -> f64 {
        let Some(raw) = self.annotations.get(key) else {
            return 0.0;
        };
        match raw.trim().parse::<f64>() {
            Ok(value) => value,
            Err(_) => {
                tracing::debug!(node = %self.name, annotation = key, value = %raw, "unparseable power annotation, treating as 0");
                0.0
            }
        }
    }
}

/// Resource requests of a single container.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContainerResources {
    pub cpu_millis: i64,
    pub memory_bytes: i64,
}

/// The pod being scheduled.
#[derive(Debug, Clone, Default)]
pub struct PodSpec {
    pub name: String,
    pub namespace: String,
    /// Name of the owning workload group (e.g. the ReplicaSet), when the
    /// pod has one.
    pub owner_group: Option<String>,
    pub containers: Vec<ContainerResources>,
}

impl PodSpec {
    /// The pod's workload-group key: `<namespace>/<owner>`, falling back to
    /// `<namespace>/unknown` for owner-less pods.
    pub fn group_key(&self) -> String {
        match &self.owner_group {
            Some(owner) => format!("{}/{}", self.namespace, owner),
            None => format!("{}/unknown", self.namespace),
        }
    }

    /// Total CPU request across containers, saturating on overflow.
    pub fn cpu_millis(&self) -> i64 {
        self.containers
            .iter()
            .fold(0i64, |acc, c| acc.saturating_add(c.cpu_millis))
    }

    /// Total memory request across containers, saturating on overflow.
    pub fn memory_bytes(&self) -> i64 {
        self.containers
            .iter()
            .fold(0i64, |acc, c| acc.saturating_add(c.memory_bytes))
    }
}

/// A workload group: a set of interchangeable pods with a shared desired
/// replica count.
#[derive(Debug, Clone)]
pub struct WorkloadGroup {
    pub namespace: String,
    pub name: String,
    pub replicas: i32,
}

impl WorkloadGroup {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>, replicas: i32) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            replicas,
        }
    }

    pub fn key(&self) -> String {
        format!("{}/{}", self.namespace, self.name)
    }
}

/// Read access to the live cluster, as granted by the host orchestrator.
///
/// Calls block on the orchestrator's API and honor the cancellation token;
/// a cancelled call returns an error and the caller falls back to hintless
/// scoring.
#[async_trait]
pub trait ClusterClient: Send + Sync {
    async fn list_nodes(&self, cancel: &CancellationToken) -> anyhow::Result<Vec<NodeInfo>>;

    async fn list_groups(&self, cancel: &CancellationToken) -> anyhow::Result<Vec<WorkloadGroup>>;
}

/// Fixed in-memory cluster view for tests and offline tooling.
#[derive(Debug, Clone, Default)]
pub struct StaticClusterView {
    pub nodes: Vec<NodeInfo>,
    pub groups: Vec<WorkloadGroup>,
}

impl StaticClusterView {
    pub fn new(nodes: Vec<NodeInfo>, groups: Vec<WorkloadGroup>) -> Self {
        Self { nodes, groups }
    }
}

#[async_trait]
impl ClusterClient for StaticClusterView {
    async fn list_nodes(&self, cancel: &CancellationToken) -> anyhow::Result<Vec<NodeInfo>> {
        if cancel.is_cancelled() {
            anyhow::bail!("node list cancelled");
        }
        Ok(self.nodes.clone())
    }

    async fn list_groups(&self, cancel: &CancellationToken) -> anyhow::Result<Vec<WorkloadGroup>> {
        if cancel.is_cancelled() {
            anyhow::bail!("workload group list cancelled");
        }
        Ok(self.groups.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node_with_annotations(annotations: &[(&str, &str)]) -> NodeInfo {
        NodeInfo {
            name: "n1".to_string(),
            annotations: annotations
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn power_annotations_parse() {
        let node = node_with_annotations(&[
            (POWER_IDLE_ANNOTATION, "140.0"),
            (POWER_BUSY_ANNOTATION, "200"),
        ]);
        assert_eq!(node.power_idle(), 140.0);
        assert_eq!(node.power_busy(), 200.0);
    }

    #[test]
    fn missing_or_bad_power_annotations_default_to_zero() {
        let node = node_with_annotations(&[(POWER_IDLE_ANNOTATION, "watts")]);
        assert_eq!(node.power_idle(), 0.0);
        assert_eq!(node.power_busy(), 0.0);
    }

    #[test]
    fn group_key_falls_back_to_unknown() {
        let mut pod = PodSpec {
            namespace: "default".to_string(),
            owner_group: Some("web-5d4f".to_string()),
            ..Default::default()
        };
        assert_eq!(pod.group_key(), "default/web-5d4f");

        pod.owner_group = None;
        assert_eq!(pod.group_key(), "default/unknown");
    }

    #[test]
    fn pod_resource_totals_saturate() {
        let pod = PodSpec {
            containers: vec![
                ContainerResources {
                    cpu_millis: i64::MAX,
                    memory_bytes: 100,
                },
                ContainerResources {
                    cpu_millis: 500,
                    memory_bytes: 200,
                },
            ],
            ..Default::default()
        };
        assert_eq!(pod.cpu_millis(), i64::MAX);
        assert_eq!(pod.memory_bytes(), 300);
    }

    #[tokio::test]
    async fn static_view_honors_cancellation() {
        let view = StaticClusterView::new(vec![NodeInfo::default()], Vec::new());
        let cancel = CancellationToken::new();
        assert_eq!(view.list_nodes(&cancel).await.unwrap().len(), 1);

        cancel.cancel();
        assert!(view.list_nodes(&cancel).await.is_err());
    }
}
