// SPDX-FileCopyrightText: Copyright (c) 2024-2026 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
// SPDX-License-Identifier: Apache-2.0

//! Scoring-path error kinds.
//!
//! Every kind here is recovered locally: the plugin logs at diagnostic
//! verbosity and returns the minimum node score, deferring placement to the
//! host framework's other plugins. None of them abort a scheduling cycle.

use mosched_hints::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum ScoringError {
    #[error("no plan {name} for the current cluster shape")]
    MissingPlan { name: String },

    #[error("plan {name} expired at {expired_at}")]
    ExpiredPlan {
        name: String,
        expired_at: chrono::DateTime<chrono::Utc>,
    },

    #[error("plan {name} carries no solutions")]
    EmptyPlan { name: String },

    #[error("group {group} has no movement in plan {name}")]
    GroupNotInPlan { name: String, group: String },

    #[error("no candidate node with a target and an open slot for group {group}")]
    NoEligibleNode { group: String },

    #[error("slot reservation retries exhausted after {attempts} attempts")]
    ReservationExhausted { attempts: u32 },

    #[error("cluster view unavailable: {0}")]
    ClusterUnavailable(#[source] anyhow::Error),

    #[error(transparent)]
    Store(#[from] StoreError),
}
