// SPDX-FileCopyrightText: Copyright (c) 2024-2026 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
// SPDX-License-Identifier: Apache-2.0

//! Synthetic benchmark problems for algorithm validation.

use std::sync::Arc;

use rand::{Rng, RngCore};

use crate::problem::{ObjectiveFn, Problem};
use crate::solution::{Bounds, ObjectivePoint, RealSolution, Solution};

/// ZDT1: a two-objective benchmark with a known convex Pareto front.
///
/// `f1 = x_0`, `f2 = g · (1 − sqrt(x_0 / g))` with
/// `g = 1 + 9 · Σ_{i≥1} x_i / (n − 1)`, all variables in `[0, 1]`. The true
/// front is `f2 = 1 − sqrt(f1)` at `x_i = 0` for `i ≥ 1`.
pub struct Zdt1 {
    num_vars: usize,
    bounds: Arc<[Bounds]>,
}

impl Zdt1 {
    pub fn new(num_vars: usize) -> Self {
        Self {
            num_vars,
            bounds: vec![Bounds::new(0.0, 1.0); num_vars].into(),
        }
    }
}

impl Problem for Zdt1 {
    fn name(&self) -> &str {
        "ZDT1"
    }

    fn objectives(&self) -> Vec<ObjectiveFn> {
        let num_vars = self.num_vars;
        vec![
            Box::new(|s: &Solution| match s.as_real() {
                Some(real) => real.vars[0],
                None => f64::INFINITY,
            }),
            Box::new(move |s: &Solution| {
                let Some(real) = s.as_real() else {
                    return f64::INFINITY;
                };
                let mut g = 1.0;
                for &x in &real.vars[1..] {
                    g += 9.0 * x / (num_vars - 1) as f64;
                }
                g * (1.0 - (real.vars[0] / g).sqrt())
            }),
        ]
    }

    fn bounds(&self) -> Vec<Bounds> {
        self.bounds.to_vec()
    }

    fn initialize(&self, pop_size: usize, rng: &mut dyn RngCore) -> Vec<Solution> {
        (0..pop_size)
            .map(|_| {
                let vars = self
                    .bounds
                    .iter()
                    .map(|b| b.low + rng.random::<f64>() * (b.high - b.low))
                    .collect();
                Solution::Real(RealSolution::new(vars, self.bounds.clone()))
            })
            .collect()
    }

    fn reference_front(&self, n: usize) -> Option<Vec<ObjectivePoint>> {
        Some(
            (0..n)
                .map(|i| {
                    let x = i as f64 / (n - 1) as f64;
                    vec![x, 1.0 - x.sqrt()]
                })
                .collect(),
        )
    }
}
