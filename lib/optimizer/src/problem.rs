// SPDX-FileCopyrightText: Copyright (c) 2024-2026 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
// SPDX-License-Identifier: Apache-2.0

//! The problem abstraction the engine optimizes against.

use rand::RngCore;

use crate::solution::{Bounds, ObjectivePoint, Solution};

/// An objective function over a candidate solution. Lower is better.
pub type ObjectiveFn = Box<dyn Fn(&Solution) -> f64 + Send + Sync>;

/// A feasibility constraint. Returns `true` when the solution satisfies it.
pub type ConstraintFn = Box<dyn Fn(&Solution) -> bool + Send + Sync>;

/// Contract a concrete multi-objective problem implements.
///
/// Implementations capture their own data (by value or `Arc`) inside the
/// returned closures so evaluation is a pure function of `(problem,
/// solution)` and the engine stays reusable across problems.
pub trait Problem {
    fn name(&self) -> &str;

    /// Ordered objective functions, all minimized.
    fn objectives(&self) -> Vec<ObjectiveFn>;

    /// Ordered feasibility constraints. Empty means unconstrained.
    fn constraints(&self) -> Vec<ConstraintFn> {
        Vec::new()
    }

    /// Per-variable bounds for real-valued encodings. Empty for discrete
    /// problems.
    fn bounds(&self) -> Vec<Bounds> {
        Vec::new()
    }

    /// Seed a population of `pop_size` candidate solutions.
    fn initialize(&self, pop_size: usize, rng: &mut dyn RngCore) -> Vec<Solution>;

    /// Sample `n` points of the analytically known Pareto front, when the
    /// problem has one. Benchmarks use this for validation; real problems
    /// typically return `None`.
    fn reference_front(&self, _n: usize) -> Option<Vec<ObjectivePoint>> {
        None
    }
}
