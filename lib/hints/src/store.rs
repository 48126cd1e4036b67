// SPDX-FileCopyrightText: Copyright (c) 2024-2026 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
// SPDX-License-Identifier: Apache-2.0

//! Keyed record store with optimistic concurrency control.
//!
//! The plan record is the only shared mutable resource in the system, and
//! every mutation goes through fetch → modify → conditional write. The store
//! must reject writes carrying a stale revision; correctness of the slot
//! ledger rides entirely on that compare-and-set, no in-process locking is
//! involved.

pub mod credentials;
pub mod memory;

use async_trait::async_trait;

pub use credentials::StoreCredentials;
pub use memory::MemoryStore;

/// A stored value together with the revision it was read at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionedValue {
    pub revision: u64,
    pub value: Vec<u8>,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("key {key} not found")]
    NotFound { key: String },

    #[error("stale write to {key}: expected revision {expected}, store has {actual}")]
    Conflict {
        key: String,
        expected: u64,
        actual: u64,
    },

    #[error("malformed record at {key}: {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("store operation cancelled")]
    Cancelled,
}

/// The keyed record store the scorer talks to.
///
/// Implementations are expected to provide linearizable revisions: `put`
/// with `expected_revision: Some(r)` commits only when the key is still at
/// revision `r`, and every successful write produces a strictly larger
/// revision.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Fetch the latest value and revision for a key.
    async fn get(&self, key: &str) -> Result<Option<VersionedValue>, StoreError>;

    /// Write a value. `expected_revision: None` upserts unconditionally;
    /// `Some(r)` is a compare-and-set against the current revision and
    /// fails with [`StoreError::Conflict`] when stale. Returns the new
    /// revision.
    async fn put(
        &self,
        key: &str,
        value: Vec<u8>,
        expected_revision: Option<u64>,
    ) -> Result<u64, StoreError>;

    async fn delete(&self, key: &str) -> Result<(), StoreError>;

    /// List all entries under a key prefix.
    async fn list(&self, prefix: &str) -> Result<Vec<(String, VersionedValue)>, StoreError>;
}
