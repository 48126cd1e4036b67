// SPDX-FileCopyrightText: Copyright (c) 2024-2026 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
// SPDX-License-Identifier: Apache-2.0

//! In-memory store implementation.
//!
//! Backs tests and single-process deployments. Revisions are drawn from one
//! monotonic counter shared across keys, matching the resource-version
//! semantics of the cluster store it stands in for.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use super::{KeyValueStore, StoreError, VersionedValue};

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, VersionedValue>>,
    revision: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_revision(&self) -> u64 {
        self.revision.fetch_add(1, Ordering::Relaxed) + 1
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<VersionedValue>, StoreError> {
        Ok(self.entries.lock().get(key).cloned())
    }

    async fn put(
        &self,
        key: &str,
        value: Vec<u8>,
        expected_revision: Option<u64>,
    ) -> Result<u64, StoreError> {
        let mut entries = self.entries.lock();
        let current = entries.get(key).map(|v| v.revision).unwrap_or(0);

        if let Some(expected) = expected_revision {
            if expected != current {
                return Err(StoreError::Conflict {
                    key: key.to_string(),
                    expected,
                    actual: current,
                });
            }
        }

        let revision = self.next_revision();
        entries.insert(key.to_string(), VersionedValue { revision, value });
        Ok(revision)
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.entries.lock().remove(key);
        Ok(())
    }

    async fn list(&self, prefix: &str) -> Result<Vec<(String, VersionedValue)>, StoreError> {
        let entries = self.entries.lock();
        let mut matched: Vec<(String, VersionedValue)> = entries
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        matched.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(matched)
    }
}
