// SPDX-FileCopyrightText: Copyright (c) 2024-2026 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
// SPDX-License-Identifier: Apache-2.0

//! Solution encodings and their genetic operators.
//!
//! Two encodings are supported: [`BinarySolution`] (single-point crossover,
//! bit-flip mutation) and [`RealSolution`] (simulated binary crossover and
//! polynomial mutation, both clipped to per-variable bounds). The engine is
//! encoding-agnostic and only ever pairs solutions of the same variant.

use std::sync::Arc;

use rand::{Rng, RngCore};

/// An N-dimensional point in the objective space, one value per objective.
/// All objectives are interpreted as minimization targets.
pub type ObjectivePoint = Vec<f64>;

/// Inclusive `[low, high]` bounds for one real-valued variable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub low: f64,
    pub high: f64,
}

impl Bounds {
    pub fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    /// Clip a value into the bounded interval.
    pub fn clip(&self, value: f64) -> f64 {
        value.clamp(self.low, self.high)
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.low && value <= self.high
    }
}

/// A candidate solution in decision space.
#[derive(Debug, Clone)]
pub enum Solution {
    Binary(BinarySolution),
    Real(RealSolution),
}

impl Solution {
    /// Produce two children from this solution and a partner.
    ///
    /// With probability `rate` the encoding-specific crossover operator is
    /// applied; otherwise the children are plain clones of the parents.
    ///
    /// Panics when the two solutions use different encodings. The engine
    /// only ever selects partners from a single population, so a mismatch is
    /// a programming error in the calling problem.
    pub fn crossover(&self, other: &Solution, rate: f64, rng: &mut dyn RngCore) -> (Solution, Solution) {
        match (self, other) {
            (Solution::Binary(a), Solution::Binary(b)) => {
                let (c1, c2) = a.crossover(b, rate, rng);
                (Solution::Binary(c1), Solution::Binary(c2))
            }
            (Solution::Real(a), Solution::Real(b)) => {
                let (c1, c2) = a.crossover(b, rate, rng);
                (Solution::Real(c1), Solution::Real(c2))
            }
            _ => panic!("crossover requires two solutions with the same encoding"),
        }
    }

    /// Apply the encoding-specific mutation operator in place.
    pub fn mutate(&mut self, rate: f64, rng: &mut dyn RngCore) {
        match self {
            Solution::Binary(s) => s.mutate(rate, rng),
            Solution::Real(s) => s.mutate(rate, rng),
        }
    }

    pub fn as_binary(&self) -> Option<&BinarySolution> {
        match self {
            Solution::Binary(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_real(&self) -> Option<&RealSolution> {
        match self {
            Solution::Real(s) => Some(s),
            _ => None,
        }
    }
}

/// A solution encoded as an ordered bit vector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinarySolution {
    pub bits: Vec<bool>,
}

impl BinarySolution {
    pub fn new(bits: Vec<bool>) -> Self {
        Self { bits }
    }

    /// A vector of `len` bits with only `index` set. Used by one-hot
    /// encodings where the set bit selects one of `len` alternatives.
    pub fn one_hot(len: usize, index: usize) -> Self {
        let mut bits = vec![false; len];
        bits[index] = true;
        Self { bits }
    }

    /// Index of the single set bit, or `None` unless exactly one bit is set.
    pub fn selected_index(&self) -> Option<usize> {
        let mut found = None;
        for (i, &bit) in self.bits.iter().enumerate() {
            if bit {
                if found.is_some() {
                    return None;
                }
                found = Some(i);
            }
        }
        found
    }

    /// Single-point crossover: with probability `rate`, pick a random index
    /// and swap the suffixes of the two parents. Length is invariant.
    pub fn crossover(&self, other: &BinarySolution, rate: f64, rng: &mut dyn RngCore) -> (BinarySolution, BinarySolution) {
        let mut child1 = self.clone();
        let mut child2 = other.clone();

        if !self.bits.is_empty() && rng.random::<f64>() < rate {
            let point = rng.random_range(0..self.bits.len());
            for i in point..self.bits.len() {
                std::mem::swap(&mut child1.bits[i], &mut child2.bits[i]);
            }
        }

        (child1, child2)
    }

    /// Bit-flip mutation: each bit flips independently with probability `rate`.
    pub fn mutate(&mut self, rate: f64, rng: &mut dyn RngCore) {
        for bit in &mut self.bits {
            if rng.random::<f64>() < rate {
                *bit = !*bit;
            }
        }
    }
}

/// A solution encoded as an ordered vector of bounded floats.
///
/// Bounds are immutable and shared between clones.
#[derive(Debug, Clone)]
pub struct RealSolution {
    pub vars: Vec<f64>,
    pub bounds: Arc<[Bounds]>,
}

impl RealSolution {
    pub fn new(vars: Vec<f64>, bounds: Arc<[Bounds]>) -> Self {
        Self { vars, bounds }
    }

    /// Simulated binary crossover (SBX) with bound clipping.
    pub fn crossover(&self, other: &RealSolution, rate: f64, rng: &mut dyn RngCore) -> (RealSolution, RealSolution) {
        let mut child1 = self.clone();
        let mut child2 = other.clone();

        if rng.random::<f64>() < rate {
            for i in 0..self.vars.len() {
                let u = rng.random::<f64>();
                let beta = if u <= 0.5 {
                    (2.0 * u).powf(1.0 / 3.0)
                } else {
                    (1.0 / (2.0 * (1.0 - u))).powf(1.0 / 3.0)
                };

                let a = self.vars[i];
                let b = other.vars[i];
                child1.vars[i] = self.bounds[i].clip(0.5 * ((1.0 + beta) * a + (1.0 - beta) * b));
                child2.vars[i] = self.bounds[i].clip(0.5 * ((1.0 - beta) * a + (1.0 + beta) * b));
            }
        }

        (child1, child2)
    }

    /// Polynomial mutation with bound clipping, applied per index with
    /// probability `rate`.
    pub fn mutate(&mut self, rate: f64, rng: &mut dyn RngCore) {
        for i in 0..self.vars.len() {
            if rng.random::<f64>() < rate {
                let u = rng.random::<f64>();
                let delta = if u <= 0.5 {
                    (2.0 * u).powf(1.0 / 3.0) - 1.0
                } else {
                    1.0 - (2.0 * (1.0 - u)).powf(1.0 / 3.0)
                };

                let span = self.bounds[i].high - self.bounds[i].low;
                self.vars[i] = self.bounds[i].clip(self.vars[i] + delta * span);
            }
        }
    }
}
