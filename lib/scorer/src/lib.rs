// SPDX-FileCopyrightText: Copyright (c) 2024-2026 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
// SPDX-License-Identifier: Apache-2.0

//! Hint-driven scoring extension.
//!
//! For every pod the plugin recomputes the cluster fingerprint, looks up
//! the matching placement plan, selects a target node for the pod's
//! workload group from the top-ranked solution, and atomically consumes a
//! reservation slot so that the group fills the planned distribution
//! exactly once. Without a usable plan the plugin stays silent (every node
//! scores the minimum) and other scoring plugins decide placement.

pub mod config;
pub mod error;
pub mod plugin;
pub mod problem;
pub mod reservation;
pub mod state;

pub use config::{ConfigError, ScorerConfig};
pub use error::ScoringError;
pub use plugin::{MultiObjectiveScorer, ScoreExtension, MAX_NODE_SCORE, MIN_NODE_SCORE};
pub use problem::SchedulingProblem;
pub use state::{CycleState, HintState};
