// SPDX-FileCopyrightText: Copyright (c) 2024-2026 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
// SPDX-License-Identifier: Apache-2.0

//! The slot-reservation protocol.
//!
//! A bounded read-modify-write against the plan record: fetch the latest
//! plan, decrement the group's `available` counter for the node, increment
//! `scheduled`, and write back conditionally. The store's compare-and-set
//! serializes concurrent decrements; a rejected write retries from a fresh
//! fetch within the attempt budget. An exhausted ledger is authoritative
//! and never retried.

use tokio_util::sync::CancellationToken;

use mosched_hints::plan_client::PlanClient;
use mosched_hints::store::StoreError;

use crate::error::ScoringError;

/// Atomically consume one reservation slot for `group_key` on `node_name`.
///
/// On success the ledger invariant `scheduled[n] + available[n] =
/// target[n]` holds at the committed revision. Every failure leaves the
/// record untouched; the caller maps it to the minimum node score.
pub async fn consume_slot(
    plans: &PlanClient,
    plan_name: &str,
    group_key: &str,
    node_name: &str,
    max_attempts: u32,
    cancel: &CancellationToken,
) -> Result<(), ScoringError> {
    for attempt in 1..=max_attempts {
        let fetched = match plans.get(plan_name, cancel).await {
            Ok(fetched) => fetched,
            Err(StoreError::Cancelled) => return Err(StoreError::Cancelled.into()),
            Err(err) => {
                tracing::debug!(plan = plan_name, attempt, error = %err, "plan fetch failed during reservation");
                if attempt == max_attempts {
                    return Err(err.into());
                }
                continue;
            }
        };

        let Some((mut plan, revision)) = fetched else {
            return Err(ScoringError::MissingPlan {
                name: plan_name.to_string(),
            });
        };

        {
            let Some(solution) = plan.top_solution_mut() else {
                return Err(ScoringError::EmptyPlan {
                    name: plan_name.to_string(),
                });
            };
            let Some(movement) = solution.find_movement_mut(group_key) else {
                return Err(ScoringError::GroupNotInPlan {
                    name: plan_name.to_string(),
                    group: group_key.to_string(),
                });
            };

            // The fresh ledger is authoritative: an exhausted slot count is
            // a definitive no, not a transient condition.
            if !movement.reserve(node_name) {
                return Err(ScoringError::NoEligibleNode {
                    group: group_key.to_string(),
                });
            }
        }

        match plans.update(&plan, revision, cancel).await {
            Ok(_) => {
                tracing::debug!(
                    plan = plan_name,
                    group = group_key,
                    node = node_name,
                    attempt,
                    "reserved scheduling slot"
                );
                return Ok(());
            }
            Err(StoreError::Conflict { .. }) => {
                tracing::debug!(
                    plan = plan_name,
                    group = group_key,
                    node = node_name,
                    attempt,
                    "reservation lost the write race, refetching"
                );
            }
            Err(StoreError::Cancelled) => return Err(StoreError::Cancelled.into()),
            Err(err) => {
                tracing::debug!(plan = plan_name, attempt, error = %err, "plan update failed during reservation");
                if attempt == max_attempts {
                    return Err(err.into());
                }
            }
        }
    }

    Err(ScoringError::ReservationExhausted {
        attempts: max_attempts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, Utc};
    use mosched_hints::plan::{
        GroupMovement, ObjectiveValues, PlacementPlan, PlanSolution, PlanSpec, PlanStatus,
    };
    use mosched_hints::store::MemoryStore;
    use std::collections::BTreeMap;
    use std::sync::Arc;

    fn plan_fixture(available_on_a: i32) -> PlacementPlan {
        PlacementPlan {
            name: "multiobjective-hints-feedfacefeedface".to_string(),
            spec: PlanSpec {
                cluster_fingerprint: "feedfacefeedface".to_string(),
                cluster_nodes: vec!["a".to_string(), "b".to_string()],
                original_replica_set_distribution: Vec::new(),
                solutions: vec![PlanSolution {
                    rank: 1,
                    weighted_score: 0.1,
                    objectives: ObjectiveValues::default(),
                    movement_count: 3,
                    group_movements: vec![GroupMovement {
                        group_namespace: "default".to_string(),
                        group_name: "web".to_string(),
                        target: BTreeMap::from([("a".to_string(), 2), ("b".to_string(), 1)]),
                        available: BTreeMap::from([
                            ("a".to_string(), available_on_a),
                            ("b".to_string(), 1),
                        ]),
                        scheduled: BTreeMap::new(),
                        reason: String::new(),
                    }],
                }],
                expiration_time: Utc::now() + TimeDelta::minutes(10),
                generated_at: Utc::now(),
                descheduler_version: "v0.1.0".to_string(),
            },
            status: PlanStatus::default(),
        }
    }

    async fn seeded_client(plan: &PlacementPlan) -> PlanClient {
        let client = PlanClient::new(Arc::new(MemoryStore::new()));
        client.put(plan, &CancellationToken::new()).await.unwrap();
        client
    }

    #[tokio::test]
    async fn successful_reservation_moves_a_slot() {
        let plan = plan_fixture(2);
        let client = seeded_client(&plan).await;
        let cancel = CancellationToken::new();

        consume_slot(&client, &plan.name, "default/web", "a", 3, &cancel)
            .await
            .unwrap();

        let (latest, _) = client.get(&plan.name, &cancel).await.unwrap().unwrap();
        let movement = &latest.spec.solutions[0].group_movements[0];
        assert_eq!(movement.available["a"], 1);
        assert_eq!(movement.scheduled["a"], 1);
        assert_eq!(movement.available["b"], 1);
    }

    #[tokio::test]
    async fn exhausted_slot_fails_without_retry() {
        let plan = plan_fixture(0);
        let client = seeded_client(&plan).await;
        let cancel = CancellationToken::new();

        let err = consume_slot(&client, &plan.name, "default/web", "a", 3, &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, ScoringError::NoEligibleNode { .. }));

        // Ledger untouched.
        let (latest, _) = client.get(&plan.name, &cancel).await.unwrap().unwrap();
        let movement = &latest.spec.solutions[0].group_movements[0];
        assert_eq!(movement.available["a"], 0);
        assert!(movement.scheduled.is_empty());
    }

    #[tokio::test]
    async fn missing_group_aborts() {
        let plan = plan_fixture(1);
        let client = seeded_client(&plan).await;

        let err = consume_slot(
            &client,
            &plan.name,
            "default/api",
            "a",
            3,
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ScoringError::GroupNotInPlan { .. }));
    }

    #[tokio::test]
    async fn plan_without_solutions_aborts() {
        let mut plan = plan_fixture(1);
        plan.spec.solutions.clear();
        let client = seeded_client(&plan).await;

        let err = consume_slot(
            &client,
            &plan.name,
            "default/web",
            "a",
            3,
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ScoringError::EmptyPlan { .. }));
    }

    #[tokio::test]
    async fn missing_plan_aborts() {
        let client = PlanClient::new(Arc::new(MemoryStore::new()));
        let err = consume_slot(
            &client,
            "multiobjective-hints-none",
            "default/web",
            "a",
            3,
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ScoringError::MissingPlan { .. }));
    }

    #[tokio::test]
    async fn cancellation_surfaces_without_side_effects() {
        let plan = plan_fixture(1);
        let client = seeded_client(&plan).await;

        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = consume_slot(&client, &plan.name, "default/web", "a", 3, &cancel)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ScoringError::Store(StoreError::Cancelled)
        ));

        let (latest, _) = client
            .get(&plan.name, &CancellationToken::new())
            .await
            .unwrap()
            .unwrap();
        assert!(latest.spec.solutions[0].group_movements[0].scheduled.is_empty());
    }

    #[tokio::test]
    async fn contended_last_slot_admits_exactly_one_pod() {
        // A single slot on the contended node.
        let mut plan = plan_fixture(1);
        plan.spec.solutions[0]
            .group_movements[0]
            .target
            .insert("a".to_string(), 1);
        let client = seeded_client(&plan).await;

        let mut tasks = Vec::new();
        for _ in 0..2 {
            let client = client.clone();
            let name = plan.name.clone();
            tasks.push(tokio::spawn(async move {
                consume_slot(
                    &client,
                    &name,
                    "default/web",
                    "a",
                    3,
                    &CancellationToken::new(),
                )
                .await
                .is_ok()
            }));
        }

        let mut successes = 0;
        for task in tasks {
            if task.await.unwrap() {
                successes += 1;
            }
        }
        assert_eq!(successes, 1);

        let (latest, _) = client
            .get(&plan.name, &CancellationToken::new())
            .await
            .unwrap()
            .unwrap();
        let movement = &latest.spec.solutions[0].group_movements[0];
        assert_eq!(movement.available["a"], 0);
        assert_eq!(movement.scheduled["a"], 1);
        assert_eq!(
            movement.scheduled["a"] + movement.available["a"],
            movement.target["a"]
        );
    }
}
