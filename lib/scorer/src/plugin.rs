// SPDX-FileCopyrightText: Copyright (c) 2024-2026 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
// SPDX-License-Identifier: Apache-2.0

//! The scoring plugin.
//!
//! PreScore resolves the pod's workload group, recomputes the cluster
//! fingerprint, looks up the matching plan, and selects the target node
//! from the top-ranked solution. Score returns the maximum score for the
//! target node once a slot is reserved, and the minimum for everything
//! else. Every failure on this path is recovered by scoring minimum and
//! logging at debug verbosity; the scheduling cycle itself never aborts.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio_util::sync::CancellationToken;

use mosched_hints::cluster::{ClusterClient, NodeInfo, PodSpec};
use mosched_hints::fingerprint::{cluster_fingerprint, plan_name};
use mosched_hints::plan::{PlacementPlan, PlanSolution};
use mosched_hints::plan_client::PlanClient;
use mosched_hints::store::KeyValueStore;

use crate::config::{ConfigError, ScorerConfig};
use crate::error::ScoringError;
use crate::reservation;
use crate::state::{CycleState, HintState, STATE_KEY};

/// Plugin name, also the cycle-state key prefix the host framework sees.
pub const PLUGIN_NAME: &str = "MultiObjective";

/// Score for non-target nodes; lets the framework's other plugins decide.
pub const MIN_NODE_SCORE: i64 = 0;

/// Score for the target node after a successful slot reservation.
pub const MAX_NODE_SCORE: i64 = 100;

/// The scoring extension points the host framework drives.
///
/// PreScore runs once per pod with the filtered candidate set; Score may
/// then be invoked concurrently for each candidate node of the same cycle.
/// The host's optional score-normalization stage is deliberately absent
/// from this seam: scores are the absolute [`MIN_NODE_SCORE`] /
/// [`MAX_NODE_SCORE`] constants and need no per-cycle rescaling.
#[async_trait]
pub trait ScoreExtension: Send + Sync {
    fn name(&self) -> &'static str;

    async fn pre_score(
        &self,
        cancel: &CancellationToken,
        state: &CycleState,
        pod: &PodSpec,
        filtered_nodes: &[NodeInfo],
    ) -> anyhow::Result<()>;

    async fn score(
        &self,
        cancel: &CancellationToken,
        state: &CycleState,
        pod: &PodSpec,
        node_name: &str,
    ) -> i64;
}

/// Plan-consuming scorer.
pub struct MultiObjectiveScorer {
    config: ScorerConfig,
    cluster: Arc<dyn ClusterClient>,
    plans: PlanClient,
}

impl MultiObjectiveScorer {
    /// Build the plugin. Fails fast on an invalid objective-weight
    /// configuration; nothing else is checked at construction.
    pub fn new(
        config: ScorerConfig,
        cluster: Arc<dyn ClusterClient>,
        store: Arc<dyn KeyValueStore>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            cluster,
            plans: PlanClient::new(store),
        })
    }

    pub fn config(&self) -> &ScorerConfig {
        &self.config
    }

    /// Recompute the fingerprint from the live cluster and fetch the
    /// matching plan, rejecting expired and solution-less records.
    async fn lookup_plan(
        &self,
        cancel: &CancellationToken,
    ) -> Result<PlacementPlan, ScoringError> {
        let nodes = self
            .cluster
            .list_nodes(cancel)
            .await
            .map_err(ScoringError::ClusterUnavailable)?;
        let groups = self
            .cluster
            .list_groups(cancel)
            .await
            .map_err(ScoringError::ClusterUnavailable)?;

        let fingerprint = cluster_fingerprint(&nodes, &groups, &self.config.system_namespaces);
        let name = plan_name(&fingerprint);

        let Some((plan, _revision)) = self.plans.get(&name, cancel).await? else {
            return Err(ScoringError::MissingPlan { name });
        };

        if plan.is_expired(Utc::now()) {
            return Err(ScoringError::ExpiredPlan {
                name,
                expired_at: plan.spec.expiration_time,
            });
        }
        if plan.spec.solutions.is_empty() {
            return Err(ScoringError::EmptyPlan { name });
        }

        Ok(plan)
    }

    /// Target node for the group: among the movement's target entries that
    /// survived filtering and still have open slots, take the one with the
    /// largest planned count. Ties go to iteration order.
    fn select_target_node(
        solution: &PlanSolution,
        group_key: &str,
        filtered_nodes: &[NodeInfo],
    ) -> Option<String> {
        let candidates: HashSet<&str> = filtered_nodes
            .iter()
            .filter(|n| !n.is_control_plane())
            .map(|n| n.name.as_str())
            .collect();

        let movement = solution.find_movement(group_key)?;

        let mut best: Option<(&str, i32)> = None;
        for (node, &count) in &movement.target {
            if !candidates.contains(node.as_str()) {
                tracing::trace!(node = %node, "planned node not in the filtered candidate set");
                continue;
            }
            if movement.available_on(node) <= 0 {
                continue;
            }
            match best {
                Some((_, max)) if count <= max => {}
                _ => best = Some((node, count)),
            }
        }

        best.map(|(node, _)| node.to_string())
    }
}

#[async_trait]
impl ScoreExtension for MultiObjectiveScorer {
    fn name(&self) -> &'static str {
        PLUGIN_NAME
    }

    async fn pre_score(
        &self,
        cancel: &CancellationToken,
        state: &CycleState,
        pod: &PodSpec,
        filtered_nodes: &[NodeInfo],
    ) -> anyhow::Result<()> {
        let group_key = pod.group_key();
        let mut hint = HintState {
            group_key: group_key.clone(),
            ..Default::default()
        };

        match self.lookup_plan(cancel).await {
            Ok(plan) => {
                // Only the top-ranked solution is ever consulted.
                if let Some(solution) = plan.top_solution() {
                    match Self::select_target_node(solution, &group_key, filtered_nodes) {
                        Some(target) => {
                            tracing::debug!(
                                pod = %pod.name,
                                group = %group_key,
                                target = %target,
                                plan = %plan.name,
                                "selected target node from placement plan"
                            );
                            hint.target_node = target;
                            hint.has_hint = true;
                            hint.plan_name = plan.name.clone();
                        }
                        None => {
                            tracing::debug!(
                                pod = %pod.name,
                                group = %group_key,
                                plan = %plan.name,
                                "no suitable target node in plan"
                            );
                        }
                    }
                }
            }
            Err(err) => {
                tracing::debug!(
                    pod = %pod.name,
                    group = %group_key,
                    error = %err,
                    "no usable plan, deferring to default scoring"
                );
            }
        }

        state.write(STATE_KEY, Arc::new(hint));
        Ok(())
    }

    async fn score(
        &self,
        cancel: &CancellationToken,
        state: &CycleState,
        pod: &PodSpec,
        node_name: &str,
    ) -> i64 {
        let Some(hint) = state.read_as::<HintState>(STATE_KEY) else {
            tracing::debug!(pod = %pod.name, node = node_name, "missing cycle state, scoring minimum");
            return MIN_NODE_SCORE;
        };

        if !hint.has_hint || node_name != hint.target_node {
            return MIN_NODE_SCORE;
        }

        match reservation::consume_slot(
            &self.plans,
            &hint.plan_name,
            &hint.group_key,
            node_name,
            self.config.max_reservation_retries,
            cancel,
        )
        .await
        {
            Ok(()) => {
                tracing::debug!(
                    pod = %pod.name,
                    node = node_name,
                    group = %hint.group_key,
                    score = MAX_NODE_SCORE,
                    "slot reserved, scoring target node maximum"
                );
                MAX_NODE_SCORE
            }
            Err(err) => {
                tracing::debug!(
                    pod = %pod.name,
                    node = node_name,
                    group = %hint.group_key,
                    error = %err,
                    "slot reservation failed, scoring minimum"
                );
                MIN_NODE_SCORE
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mosched_hints::cluster::StaticClusterView;
    use mosched_hints::plan::{GroupMovement, ObjectiveValues};
    use mosched_hints::store::MemoryStore;
    use std::collections::BTreeMap;

    fn movement(target: &[(&str, i32)], available: &[(&str, i32)]) -> GroupMovement {
        GroupMovement {
            group_namespace: "default".to_string(),
            group_name: "web".to_string(),
            target: target.iter().map(|(n, c)| (n.to_string(), *c)).collect(),
            available: available.iter().map(|(n, c)| (n.to_string(), *c)).collect(),
            scheduled: BTreeMap::new(),
            reason: String::new(),
        }
    }

    fn solution(movements: Vec<GroupMovement>) -> PlanSolution {
        PlanSolution {
            rank: 1,
            weighted_score: 0.1,
            objectives: ObjectiveValues::default(),
            movement_count: 0,
            group_movements: movements,
        }
    }

    fn worker(name: &str) -> NodeInfo {
        NodeInfo {
            name: name.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn target_selection_prefers_largest_planned_count() {
        let sol = solution(vec![movement(&[("a", 2), ("b", 1)], &[("a", 2), ("b", 1)])]);
        let filtered = [worker("a"), worker("b"), worker("c")];

        let target = MultiObjectiveScorer::select_target_node(&sol, "default/web", &filtered);
        assert_eq!(target.as_deref(), Some("a"));
    }

    #[test]
    fn target_selection_skips_exhausted_and_filtered_nodes() {
        // "d" has the biggest target but is not a candidate; "a" is a
        // candidate but exhausted.
        let sol = solution(vec![movement(
            &[("a", 3), ("b", 1), ("d", 5)],
            &[("a", 0), ("b", 1), ("d", 5)],
        )]);
        let filtered = [worker("a"), worker("b"), worker("c")];

        let target = MultiObjectiveScorer::select_target_node(&sol, "default/web", &filtered);
        assert_eq!(target.as_deref(), Some("b"));
    }

    #[test]
    fn target_selection_ignores_control_plane_candidates() {
        let mut cp = worker("a");
        cp.labels.insert(
            mosched_hints::cluster::CONTROL_PLANE_LABEL.to_string(),
            String::new(),
        );
        let sol = solution(vec![movement(&[("a", 2), ("b", 1)], &[("a", 2), ("b", 1)])]);

        let target =
            MultiObjectiveScorer::select_target_node(&sol, "default/web", &[cp, worker("b")]);
        assert_eq!(target.as_deref(), Some("b"));
    }

    #[test]
    fn target_selection_without_movement_is_none() {
        let sol = solution(vec![movement(&[("a", 1)], &[("a", 1)])]);
        let target =
            MultiObjectiveScorer::select_target_node(&sol, "default/api", &[worker("a")]);
        assert!(target.is_none());
    }

    #[test]
    fn construction_rejects_invalid_weights() {
        let config = ScorerConfig {
            objective_weights: vec![0.9, 0.9],
            ..Default::default()
        };
        let result = MultiObjectiveScorer::new(
            config,
            Arc::new(StaticClusterView::default()),
            Arc::new(MemoryStore::new()),
        );
        assert!(matches!(result, Err(ConfigError::InvalidWeights(_))));
    }

    #[tokio::test]
    async fn score_without_prescore_state_is_minimum() {
        let scorer = MultiObjectiveScorer::new(
            ScorerConfig::default(),
            Arc::new(StaticClusterView::default()),
            Arc::new(MemoryStore::new()),
        )
        .unwrap();

        let state = CycleState::new();
        let pod = PodSpec::default();
        let score = scorer
            .score(&CancellationToken::new(), &state, &pod, "a")
            .await;
        assert_eq!(score, MIN_NODE_SCORE);
    }

}
