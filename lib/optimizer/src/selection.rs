// SPDX-FileCopyrightText: Copyright (c) 2024-2026 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
// SPDX-License-Identifier: Apache-2.0

//! Objective normalization and weighted Pareto-front selection.
//!
//! After a run, callers normalize objective values into `[0, 1]` and pick a
//! single solution by scalarizing with per-objective weights.

use crate::nsga2::Ranked;

/// Tolerance on the weight-sum contract.
const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

#[derive(Debug, thiserror::Error)]
pub enum WeightsError {
    #[error("no objective weights configured")]
    Empty,

    #[error("weight {index} is {value}, outside [0, 1]")]
    OutOfRange { index: usize, value: f64 },

    #[error("objective weights sum to {sum}, expected 1 within {WEIGHT_SUM_TOLERANCE}")]
    NotNormalized { sum: f64 },
}

/// Validate the weights contract: one non-negative weight per objective,
/// each in `[0, 1]`, summing to 1 within tolerance.
pub fn validate_weights(weights: &[f64]) -> Result<(), WeightsError> {
    if weights.is_empty() {
        return Err(WeightsError::Empty);
    }
    for (index, &value) in weights.iter().enumerate() {
        if !(0.0..=1.0).contains(&value) || value.is_nan() {
            return Err(WeightsError::OutOfRange { index, value });
        }
    }
    let sum: f64 = weights.iter().sum();
    if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
        return Err(WeightsError::NotNormalized { sum });
    }
    Ok(())
}

/// Min–max normalizer over a fixed per-objective range.
#[derive(Debug, Clone)]
pub struct Normalizer {
    min: Vec<f64>,
    max: Vec<f64>,
}

impl Normalizer {
    pub fn new(min: Vec<f64>, max: Vec<f64>) -> Self {
        Self { min, max }
    }

    /// Map each objective value into `[0, 1]`. A degenerate range
    /// (`max == min`) maps to 0.
    pub fn normalize(&self, values: &[f64]) -> Vec<f64> {
        values
            .iter()
            .enumerate()
            .map(|(k, &v)| {
                let range = self.max[k] - self.min[k];
                if range == 0.0 {
                    0.0
                } else {
                    (v - self.min[k]) / range
                }
            })
            .collect()
    }

    /// Inverse of [`Normalizer::normalize`] for non-degenerate ranges.
    pub fn denormalize(&self, values: &[f64]) -> Vec<f64> {
        values
            .iter()
            .enumerate()
            .map(|(k, &v)| self.min[k] + v * (self.max[k] - self.min[k]))
            .collect()
    }
}

/// Pick the best solution by weighted scalarization of normalized
/// objective values.
///
/// Each candidate scores `Σ_k v_k · (1 − w_k)`: a higher weight reduces the
/// penalty on its objective, so the comparison is driven by the objectives
/// carrying the smaller weights. Lower score wins; ties go to the earliest
/// candidate.
///
/// The caller is responsible for passing already-normalized points and a
/// weight vector that satisfies [`validate_weights`].
pub fn select_by_weights<'a>(population: &'a [Ranked], weights: &[f64]) -> Option<&'a Ranked> {
    let mut best: Option<(&Ranked, f64)> = None;
    for candidate in population {
        let score: f64 = candidate
            .point
            .iter()
            .zip(weights.iter())
            .map(|(v, w)| v * (1.0 - w))
            .sum();
        match best {
            Some((_, best_score)) if score >= best_score => {}
            _ => best = Some((candidate, score)),
        }
    }
    best.map(|(candidate, _)| candidate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solution::{BinarySolution, Solution};

    fn ranked(point: &[f64]) -> Ranked {
        Ranked::new(
            Solution::Binary(BinarySolution::new(vec![true])),
            point.to_vec(),
        )
    }

    #[test]
    fn weights_must_sum_to_one() {
        assert!(validate_weights(&[0.5, 0.5]).is_ok());
        assert!(validate_weights(&[0.3, 0.3, 0.4]).is_ok());
        // Within tolerance.
        assert!(validate_weights(&[0.5, 0.5 + 5e-7]).is_ok());

        assert!(matches!(
            validate_weights(&[0.5, 0.6]),
            Err(WeightsError::NotNormalized { .. })
        ));
        assert!(matches!(
            validate_weights(&[1.2, -0.2]),
            Err(WeightsError::OutOfRange { index: 0, .. })
        ));
        assert!(matches!(validate_weights(&[]), Err(WeightsError::Empty)));
    }

    #[test]
    fn normalize_maps_range_to_unit_interval() {
        let norm = Normalizer::new(vec![10.0, 0.0], vec![20.0, 3.0]);
        let out = norm.normalize(&[15.0, 3.0]);
        assert_eq!(out, vec![0.5, 1.0]);
    }

    #[test]
    fn normalize_degenerate_range_is_zero() {
        let norm = Normalizer::new(vec![5.0], vec![5.0]);
        assert_eq!(norm.normalize(&[5.0]), vec![0.0]);
        assert_eq!(norm.normalize(&[7.0]), vec![0.0]);
    }

    #[test]
    fn normalize_denormalize_roundtrip() {
        let norm = Normalizer::new(vec![10.0, -1.0], vec![20.0, 1.0]);
        let original = vec![12.5, 0.25];
        let back = norm.denormalize(&norm.normalize(&original));
        for (a, b) in original.iter().zip(back.iter()) {
            assert!((a - b).abs() < 1e-12);
        }
    }

    #[test]
    fn select_prefers_heavily_weighted_objective() {
        // Candidate 0 is best on objective 0, candidate 1 on objective 1.
        let population = vec![ranked(&[0.0, 1.0]), ranked(&[1.0, 0.0])];

        // Weighting objective 0 discounts its penalty, so the candidate that
        // is worst on objective 0 wins: with weights [0.9, 0.1] the scores
        // are 0·0.1 + 1·0.9 = 0.9 versus 1·0.1 + 0·0.9 = 0.1.
        let chosen = select_by_weights(&population, &[0.9, 0.1]).unwrap();
        assert_eq!(chosen.point, vec![1.0, 0.0]);

        let chosen = select_by_weights(&population, &[0.1, 0.9]).unwrap();
        assert_eq!(chosen.point, vec![0.0, 1.0]);
    }

    #[test]
    fn select_ties_break_by_iteration_order() {
        let population = vec![ranked(&[0.5, 0.5]), ranked(&[0.5, 0.5])];
        let chosen = select_by_weights(&population, &[0.5, 0.5]).unwrap();
        assert!(std::ptr::eq(chosen, &population[0]));
    }

    #[test]
    fn select_on_empty_population() {
        assert!(select_by_weights(&[], &[1.0]).is_none());
    }
}
