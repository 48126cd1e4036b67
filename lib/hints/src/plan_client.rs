// SPDX-FileCopyrightText: Copyright (c) 2024-2026 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
// SPDX-License-Identifier: Apache-2.0

//! Typed plan access over the keyed record store.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::plan::PlacementPlan;
use crate::store::{KeyValueStore, StoreError};

/// Reads and conditionally writes [`PlacementPlan`] records.
///
/// Every call honors the caller's cancellation token; a cancelled operation
/// fails with [`StoreError::Cancelled`] and leaves the record untouched.
#[derive(Clone)]
pub struct PlanClient {
    store: Arc<dyn KeyValueStore>,
}

impl PlanClient {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Fetch the latest plan by name. Returns the plan together with the
    /// revision to use for a subsequent conditional write.
    pub async fn get(
        &self,
        name: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<(PlacementPlan, u64)>, StoreError> {
        let fetched = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(StoreError::Cancelled),
            result = self.store.get(name) => result?,
        };

        let Some(versioned) = fetched else {
            return Ok(None);
        };

        let plan: PlacementPlan =
            serde_json::from_slice(&versioned.value).map_err(|source| StoreError::Decode {
                key: name.to_string(),
                source,
            })?;
        Ok(Some((plan, versioned.revision)))
    }

    /// Conditionally write a plan back at the revision it was read at. The
    /// store rejects the write when another writer committed in between.
    pub async fn update(
        &self,
        plan: &PlacementPlan,
        revision: u64,
        cancel: &CancellationToken,
    ) -> Result<u64, StoreError> {
        let bytes = serde_json::to_vec(plan).map_err(|source| StoreError::Decode {
            key: plan.name.clone(),
            source,
        })?;

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(StoreError::Cancelled),
            result = self.store.put(&plan.name, bytes, Some(revision)) => result,
        }
    }

    /// Unconditionally create or replace a plan. Producer-side; tests use
    /// it to seed fixtures.
    pub async fn put(
        &self,
        plan: &PlacementPlan,
        cancel: &CancellationToken,
    ) -> Result<u64, StoreError> {
        let bytes = serde_json::to_vec(plan).map_err(|source| StoreError::Decode {
            key: plan.name.clone(),
            source,
        })?;

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(StoreError::Cancelled),
            result = self.store.put(&plan.name, bytes, None) => result,
        }
    }
}
