// SPDX-FileCopyrightText: Copyright (c) 2024-2026 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
// SPDX-License-Identifier: Apache-2.0

//! The placement-plan record.
//!
//! A plan is written once by the offline optimizer and then mutated only
//! through its slot ledger: each group movement carries a `target`
//! distribution frozen at generation time, an `available` counter map that
//! reservations decrement, and a `scheduled` map they increment. The
//! invariant `scheduled[n] + available[n] = target[n]` holds at every
//! commit boundary.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A persisted placement plan, keyed in the store by
/// `multiobjective-hints-<fingerprint>`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacementPlan {
    pub name: String,
    pub spec: PlanSpec,
    #[serde(default)]
    pub status: PlanStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanSpec {
    /// Fingerprint of the cluster shape the solutions were optimized for.
    pub cluster_fingerprint: String,

    /// Worker-node names that existed at generation time.
    pub cluster_nodes: Vec<String>,

    /// Observed per-group pod distribution at generation time.
    pub original_replica_set_distribution: Vec<GroupDistribution>,

    /// Pareto solutions ordered by rank ascending; the first entry (rank 1)
    /// is the only one consulted at scoring time.
    pub solutions: Vec<PlanSolution>,

    /// The plan must not be used past this instant.
    pub expiration_time: DateTime<Utc>,

    pub generated_at: DateTime<Utc>,

    /// Version of the producer that generated the plan.
    #[serde(default)]
    pub descheduler_version: String,
}

/// Per-group pod counts per node as observed when the plan was generated.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupDistribution {
    pub group_namespace: String,
    pub group_name: String,
    pub node_distribution: BTreeMap<String, i32>,
}

/// One Pareto-optimal solution with its per-group movement plans.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanSolution {
    /// Rank in the Pareto front; 1 is best.
    pub rank: i32,

    /// Weighted scalarized objective score used to order solutions.
    pub weighted_score: f64,

    pub objectives: ObjectiveValues,

    /// Total pod movements the producer derived for this solution.
    pub movement_count: i32,

    pub group_movements: Vec<GroupMovement>,
}

impl PlanSolution {
    pub fn find_movement(&self, group_key: &str) -> Option<&GroupMovement> {
        self.group_movements.iter().find(|m| m.group_key() == group_key)
    }

    pub fn find_movement_mut(&mut self, group_key: &str) -> Option<&mut GroupMovement> {
        self.group_movements
            .iter_mut()
            .find(|m| m.group_key() == group_key)
    }
}

/// Objective values of one solution, all minimized.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ObjectiveValues {
    pub cost: f64,
    pub disruption: f64,
    pub balance: f64,
}

/// Planned placement of one workload group, with the consumption ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupMovement {
    pub group_namespace: String,
    pub group_name: String,

    /// Desired replica count per node; sums to the group's desired replicas
    /// at generation time.
    pub target: BTreeMap<String, i32>,

    /// Remaining reservation slots per node.
    pub available: BTreeMap<String, i32>,

    /// Pods already placed through this plan, per node.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub scheduled: BTreeMap<String, i32>,

    /// Producer's rationale for the movement.
    #[serde(default)]
    pub reason: String,
}

impl GroupMovement {
    pub fn group_key(&self) -> String {
        format!("{}/{}", self.group_namespace, self.group_name)
    }

    pub fn available_on(&self, node: &str) -> i32 {
        self.available.get(node).copied().unwrap_or(0)
    }

    /// Consume one slot on `node`: decrement `available`, increment
    /// `scheduled` (creating the map entry if missing). Returns `false`
    /// without touching the ledger when no slot is open.
    pub fn reserve(&mut self, node: &str) -> bool {
        match self.available.get_mut(node) {
            Some(slots) if *slots > 0 => {
                *slots -= 1;
                *self.scheduled.entry(node.to_string()).or_insert(0) += 1;
                true
            }
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanStatus {
    #[serde(default)]
    pub phase: PlanPhase,

    #[serde(default)]
    pub applied_movements: i32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_applied_time: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<PlanCondition>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlanPhase {
    #[default]
    Active,
    Expired,
    Applied,
}

/// An observation of the plan's state, recorded by the producer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanCondition {
    #[serde(rename = "type")]
    pub condition_type: String,
    pub status: String,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub message: String,
    pub last_transition_time: DateTime<Utc>,
}

impl PlacementPlan {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.spec.expiration_time <= now
    }

    /// The top-ranked solution, the only one consulted at scoring time.
    pub fn top_solution(&self) -> Option<&PlanSolution> {
        self.spec.solutions.first()
    }

    pub fn top_solution_mut(&mut self) -> Option<&mut PlanSolution> {
        self.spec.solutions.first_mut()
    }
}
