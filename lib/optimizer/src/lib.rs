// SPDX-FileCopyrightText: Copyright (c) 2024-2026 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
// SPDX-License-Identifier: Apache-2.0

//! Multi-objective evolutionary optimization engine.
//!
//! This crate provides a generic NSGA-II implementation over a pluggable
//! problem abstraction: binary and real-valued solution encodings, fast
//! non-dominated sorting, crowding-distance preservation, tournament
//! selection, and weighted Pareto-front selection. Concrete problems plug in
//! through the [`Problem`] trait; the synthetic ZDT1 benchmark used for
//! algorithm validation lives in [`benchmarks`].

pub mod benchmarks;
pub mod nsga2;
pub mod problem;
pub mod selection;
pub mod solution;

// Re-export key types for convenience
pub use nsga2::{
    crowding_distance, dominates, non_dominated_sort, tournament_select, Nsga2, Nsga2Config,
    Nsga2Error, Ranked,
};
pub use problem::{ConstraintFn, ObjectiveFn, Problem};
pub use selection::{select_by_weights, validate_weights, Normalizer, WeightsError};
pub use solution::{BinarySolution, Bounds, ObjectivePoint, RealSolution, Solution};
