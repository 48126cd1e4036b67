// SPDX-FileCopyrightText: Copyright (c) 2024-2026 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
// SPDX-License-Identifier: Apache-2.0

//! NSGA-II: elitist non-dominated sorting genetic algorithm.
//!
//! The engine is single-threaded per invocation and pure aside from its
//! PRNG. Seed it with [`Nsga2::with_seed`] for reproducible runs; separate
//! invocations may run concurrently as long as each holds its own instance.

use std::cmp::Ordering;

use rand::rngs::SmallRng;
use rand::{Rng, RngCore, SeedableRng};

use crate::problem::Problem;
use crate::solution::{ObjectivePoint, Solution};

/// Tournament size for mating selection.
const TOURNAMENT_SIZE: usize = 2;

/// Engine configuration.
#[derive(Debug, Clone, Copy)]
pub struct Nsga2Config {
    pub pop_size: usize,
    pub generations: usize,
    pub crossover_rate: f64,
    pub mutation_rate: f64,
}

impl Default for Nsga2Config {
    fn default() -> Self {
        Self {
            pop_size: 100,
            generations: 250,
            crossover_rate: 0.8,
            mutation_rate: 0.1,
        }
    }
}

/// A solution annotated with its objective-space value, Pareto rank
/// (0 = first front) and crowding distance.
#[derive(Debug, Clone)]
pub struct Ranked {
    pub solution: Solution,
    pub point: ObjectivePoint,
    pub rank: usize,
    pub crowding: f64,
}

impl Ranked {
    pub fn new(solution: Solution, point: ObjectivePoint) -> Self {
        Self {
            solution,
            point,
            rank: 0,
            crowding: 0.0,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Nsga2Error {
    #[error("problem seeded {actual} individuals, expected {expected}")]
    SeedPopulationSize { expected: usize, actual: usize },

    #[error("seed individual violates constraint {index}")]
    InfeasibleSeed { index: usize },
}

/// `a` dominates `b` iff `a` is no worse on every objective and strictly
/// better on at least one (minimization).
pub fn dominates(a: &[f64], b: &[f64]) -> bool {
    let mut better = false;
    for (x, y) in a.iter().zip(b.iter()) {
        if x > y {
            return false;
        }
        if x < y {
            better = true;
        }
    }
    better
}

/// Fast non-dominated sort. Assigns `rank` to every individual and returns
/// the fronts as index lists, best front first. Ties inside a front are
/// unordered.
pub fn non_dominated_sort(population: &mut [Ranked]) -> Vec<Vec<usize>> {
    let n = population.len();
    if n == 0 {
        return Vec::new();
    }

    let mut dominated: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut dom_count = vec![0usize; n];

    for i in 0..n {
        for j in 0..n {
            if i == j {
                continue;
            }
            if dominates(&population[i].point, &population[j].point) {
                dominated[i].push(j);
            } else if dominates(&population[j].point, &population[i].point) {
                dom_count[i] += 1;
            }
        }
    }

    let mut fronts = Vec::new();
    let mut current: Vec<usize> = (0..n).filter(|&i| dom_count[i] == 0).collect();
    for &i in &current {
        population[i].rank = 0;
    }
    fronts.push(current.clone());

    let mut front_index = 0;
    while !current.is_empty() {
        let mut next = Vec::new();
        for &i in &current {
            for &d in &dominated[i] {
                dom_count[d] -= 1;
                if dom_count[d] == 0 {
                    population[d].rank = front_index + 1;
                    next.push(d);
                }
            }
        }
        front_index += 1;
        if !next.is_empty() {
            fronts.push(next.clone());
        }
        current = next;
    }

    fronts
}

/// Compute crowding distances for the individuals of one front.
///
/// Boundary points per objective receive infinite distance so the extremes
/// of the front survive truncation.
pub fn crowding_distance(population: &mut [Ranked], front: &[usize]) {
    if front.len() <= 2 {
        for &i in front {
            population[i].crowding = f64::INFINITY;
        }
        return;
    }

    for &i in front {
        population[i].crowding = 0.0;
    }

    let num_objectives = population[front[0]].point.len();
    let mut order = front.to_vec();

    for m in 0..num_objectives {
        order.sort_by(|&a, &b| {
            population[a].point[m]
                .partial_cmp(&population[b].point[m])
                .unwrap_or(Ordering::Equal)
        });

        let first = order[0];
        let last = order[order.len() - 1];
        population[first].crowding = f64::INFINITY;
        population[last].crowding = f64::INFINITY;

        let range = population[last].point[m] - population[first].point[m];
        if range == 0.0 {
            continue;
        }

        for w in 1..order.len() - 1 {
            let delta = population[order[w + 1]].point[m] - population[order[w - 1]].point[m];
            population[order[w]].crowding += delta / range;
        }
    }
}

/// Binary tournament: sample two indices uniformly with replacement; the
/// winner has the smaller rank, ties broken by larger crowding distance.
pub fn tournament_select(population: &[Ranked], rng: &mut dyn RngCore) -> usize {
    let mut best = rng.random_range(0..population.len());
    for _ in 1..TOURNAMENT_SIZE {
        let contender = rng.random_range(0..population.len());
        let better_rank = population[contender].rank < population[best].rank;
        let better_crowding = population[contender].rank == population[best].rank
            && population[contender].crowding > population[best].crowding;
        if better_rank || better_crowding {
            best = contender;
        }
    }
    best
}

/// NSGA-II engine bound to one problem instance.
pub struct Nsga2<P: Problem> {
    problem: P,
    config: Nsga2Config,
    rng: SmallRng,
}

impl<P: Problem> Nsga2<P> {
    pub fn new(problem: P, config: Nsga2Config) -> Self {
        Self {
            problem,
            config,
            rng: SmallRng::from_os_rng(),
        }
    }

    /// Seed the engine's PRNG for a reproducible run.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = SmallRng::seed_from_u64(seed);
        self
    }

    pub fn problem(&self) -> &P {
        &self.problem
    }

    /// Run the generational loop and return the final population with ranks
    /// and crowding distances assigned.
    pub fn run(&mut self) -> Result<Vec<Ranked>, Nsga2Error> {
        let pop_size = self.config.pop_size;
        if pop_size == 0 {
            return Ok(Vec::new());
        }

        let objectives = self.problem.objectives();
        let constraints = self.problem.constraints();
        let evaluate = |solution: &Solution| -> Result<ObjectivePoint, usize> {
            for (index, constraint) in constraints.iter().enumerate() {
                if !constraint(solution) {
                    return Err(index);
                }
            }
            Ok(objectives.iter().map(|f| f(solution)).collect())
        };

        let seeds = self.problem.initialize(pop_size, &mut self.rng);
        if seeds.len() != pop_size {
            return Err(Nsga2Error::SeedPopulationSize {
                expected: pop_size,
                actual: seeds.len(),
            });
        }

        let mut population = Vec::with_capacity(pop_size);
        for solution in seeds {
            let point =
                evaluate(&solution).map_err(|index| Nsga2Error::InfeasibleSeed { index })?;
            population.push(Ranked::new(solution, point));
        }

        tracing::debug!(
            problem = self.problem.name(),
            pop_size,
            generations = self.config.generations,
            "starting NSGA-II run"
        );

        for _ in 0..self.config.generations {
            // Offspring generation: deterministic pairing by iteration
            // index; a trailing pair with a missing partner produces one
            // child. A child violating a constraint is replaced by a clone
            // of its contributing parent.
            let mut offspring = Vec::with_capacity(pop_size);
            while offspring.len() < pop_size {
                let p1 = tournament_select(&population, &mut self.rng);
                let p2 = tournament_select(&population, &mut self.rng);

                let (mut child1, mut child2) = population[p1].solution.crossover(
                    &population[p2].solution,
                    self.config.crossover_rate,
                    &mut self.rng,
                );
                child1.mutate(self.config.mutation_rate, &mut self.rng);
                child2.mutate(self.config.mutation_rate, &mut self.rng);

                offspring.push(match evaluate(&child1) {
                    Ok(point) => Ranked::new(child1, point),
                    Err(_) => Ranked::new(
                        population[p1].solution.clone(),
                        population[p1].point.clone(),
                    ),
                });
                if offspring.len() >= pop_size {
                    break;
                }
                offspring.push(match evaluate(&child2) {
                    Ok(point) => Ranked::new(child2, point),
                    Err(_) => Ranked::new(
                        population[p2].solution.clone(),
                        population[p2].point.clone(),
                    ),
                });
            }

            // Elitist survivor selection over parents + offspring.
            let mut combined = std::mem::take(&mut population);
            combined.extend(offspring);
            let fronts = non_dominated_sort(&mut combined);

            let mut selected: Vec<usize> = Vec::with_capacity(pop_size);
            for front in &fronts {
                crowding_distance(&mut combined, front);
                if selected.len() + front.len() <= pop_size {
                    selected.extend_from_slice(front);
                    if selected.len() == pop_size {
                        break;
                    }
                } else {
                    let mut rest = front.clone();
                    rest.sort_by(|&a, &b| {
                        combined[b]
                            .crowding
                            .partial_cmp(&combined[a].crowding)
                            .unwrap_or(Ordering::Equal)
                    });
                    rest.truncate(pop_size - selected.len());
                    selected.extend(rest);
                    break;
                }
            }

            population = selected.into_iter().map(|i| combined[i].clone()).collect();
        }

        tracing::debug!(problem = self.problem.name(), "NSGA-II run complete");
        Ok(population)
    }
}
