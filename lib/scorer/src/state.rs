// SPDX-FileCopyrightText: Copyright (c) 2024-2026 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
// SPDX-License-Identifier: Apache-2.0

//! Cycle-local scheduling state.
//!
//! The host framework passes an opaque state bag between the PreScore and
//! Score extension points of one pod cycle. PreScore is the single writer;
//! it completes before the framework fans Score out across candidate
//! nodes, so reads during Score are concurrent but the stored values are
//! effectively frozen. Cloning a [`CycleState`] copies the map and shares
//! the frozen values.

use std::any::Any;
use std::sync::Arc;

use dashmap::DashMap;

/// Key under which the scorer stores its [`HintState`].
pub const STATE_KEY: &str = "MultiObjective";

/// A value stored in the cycle state.
pub trait StateData: Any + Send + Sync {
    fn as_any(&self) -> &dyn Any;
}

/// Keyed map of state values scoped to one pod scheduling cycle.
#[derive(Default, Clone)]
pub struct CycleState {
    entries: DashMap<String, Arc<dyn StateData>>,
}

impl CycleState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write(&self, key: &str, value: Arc<dyn StateData>) {
        self.entries.insert(key.to_string(), value);
    }

    pub fn read(&self, key: &str) -> Option<Arc<dyn StateData>> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    /// Typed read; `None` when the key is absent or holds another type.
    pub fn read_as<T: StateData + Clone>(&self, key: &str) -> Option<T> {
        self.read(key)
            .and_then(|value| value.as_any().downcast_ref::<T>().cloned())
    }
}

/// The scorer's per-cycle decision, written by PreScore and read by Score.
#[derive(Debug, Clone, Default)]
pub struct HintState {
    /// Node selected for this pod from the plan; empty when no hint.
    pub target_node: String,

    /// Whether a usable plan produced a target.
    pub has_hint: bool,

    /// Workload-group key of the pod (`<namespace>/<owner>`).
    pub group_key: String,

    /// Store key of the plan backing the hint.
    pub plan_name: String,
}

impl StateData for HintState {
    fn as_any(&self) -> &dyn Any {
        self
    }
}
