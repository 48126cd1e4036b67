// SPDX-FileCopyrightText: Copyright (c) 2024-2026 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
// SPDX-License-Identifier: Apache-2.0

//! The concrete placement problem fed to the optimizer.
//!
//! A solution is a one-hot bit vector over the candidate nodes: the set bit
//! selects the node the pod lands on. Two objectives are minimized, a power
//! model built from the node's idle/busy annotations and a spread measure
//! that keeps per-resource utilization near the configured ideal.

use std::sync::Arc;

use rand::{Rng, RngCore};

use mosched_hints::cluster::{NodeInfo, PodSpec};
use mosched_optimizer::{
    BinarySolution, ConstraintFn, Normalizer, ObjectiveFn, Problem, Solution,
};

/// Utilization of a resource after adding `used`; a node with nothing
/// allocatable reads as saturated.
fn utilization(used: i64, allocatable: i64) -> f64 {
    if allocatable <= 0 {
        return 1.0;
    }
    used as f64 / allocatable as f64
}

/// Power objective for placing `pod` on `node`.
///
/// Models dynamic power as linear between the annotated idle and busy
/// draws, plus an exponential penalty on nearly idle nodes
/// (`p_idle · exp(−5·u/threshold)` below the threshold) so small pods
/// consolidate instead of keeping an idle node awake.
pub fn power_objective(node: &NodeInfo, pod: &PodSpec, low_utilization_threshold: f64) -> f64 {
    let p_idle = node.power_idle();
    let p_busy = node.power_busy();

    let u_now = utilization(node.requested_cpu_millis, node.allocatable_cpu_millis);
    let u_new = utilization(
        node.requested_cpu_millis.saturating_add(pod.cpu_millis()),
        node.allocatable_cpu_millis,
    );

    let penalty = if u_now < low_utilization_threshold {
        p_idle * (-5.0 * u_now / low_utilization_threshold).exp()
    } else {
        0.0
    };

    p_idle + (p_busy - p_idle) * u_new + penalty
}

/// Spread objective for placing `pod` on `node`.
///
/// Mean absolute deviation of post-placement CPU and memory utilization
/// from the ideal, plus a pod-density term that discourages nodes already
/// dense with pods.
pub fn spread_objective(node: &NodeInfo, pod: &PodSpec, ideal_spread: f64) -> f64 {
    let u_cpu = utilization(
        node.requested_cpu_millis.saturating_add(pod.cpu_millis()),
        node.allocatable_cpu_millis,
    );
    let u_mem = utilization(
        node.requested_memory_bytes.saturating_add(pod.memory_bytes()),
        node.allocatable_memory_bytes,
    );

    let imbalance = ((u_cpu - ideal_spread).abs() + (u_mem - ideal_spread).abs()) / 2.0;

    let density = if node.allowed_pods <= 0 {
        1.0
    } else {
        node.pod_count as f64 / node.allowed_pods as f64
    };

    imbalance + density
}

/// One-hot node selection problem for a single pod.
pub struct SchedulingProblem {
    nodes: Arc<Vec<NodeInfo>>,
    pod: Arc<PodSpec>,
    low_utilization_threshold: f64,
    ideal_spread: f64,
}

impl SchedulingProblem {
    pub fn new(
        nodes: Vec<NodeInfo>,
        pod: PodSpec,
        low_utilization_threshold: f64,
        ideal_spread: f64,
    ) -> Self {
        Self {
            nodes: Arc::new(nodes),
            pod: Arc::new(pod),
            low_utilization_threshold,
            ideal_spread,
        }
    }

    pub fn nodes(&self) -> &[NodeInfo] {
        &self.nodes
    }

    /// Per-objective normalization ranges: power spans
    /// `[min p_idle, max (p_idle + p_busy)]` over the candidates, spread
    /// spans `[0, max_spread_value]`.
    pub fn normalizer(&self, max_spread_value: f64) -> Normalizer {
        let min_power = self
            .nodes
            .iter()
            .map(|n| n.power_idle())
            .fold(f64::INFINITY, f64::min);
        let max_power = self
            .nodes
            .iter()
            .map(|n| n.power_idle() + n.power_busy())
            .fold(f64::NEG_INFINITY, f64::max);

        let (min_power, max_power) = if self.nodes.is_empty() {
            (0.0, 0.0)
        } else {
            (min_power, max_power)
        };

        Normalizer::new(vec![min_power, 0.0], vec![max_power, max_spread_value])
    }

    fn selected_node<'a>(nodes: &'a [NodeInfo], solution: &Solution) -> Option<&'a NodeInfo> {
        let index = solution.as_binary()?.selected_index()?;
        nodes.get(index)
    }
}

impl Problem for SchedulingProblem {
    fn name(&self) -> &str {
        "pod-placement"
    }

    fn objectives(&self) -> Vec<ObjectiveFn> {
        let nodes = self.nodes.clone();
        let pod = self.pod.clone();
        let threshold = self.low_utilization_threshold;
        let power: ObjectiveFn = Box::new(move |s: &Solution| {
            match Self::selected_node(&nodes, s) {
                Some(node) => power_objective(node, &pod, threshold),
                None => f64::INFINITY,
            }
        });

        let nodes = self.nodes.clone();
        let pod = self.pod.clone();
        let ideal = self.ideal_spread;
        let spread: ObjectiveFn = Box::new(move |s: &Solution| {
            match Self::selected_node(&nodes, s) {
                Some(node) => spread_objective(node, &pod, ideal),
                None => f64::INFINITY,
            }
        });

        vec![power, spread]
    }

    fn constraints(&self) -> Vec<ConstraintFn> {
        // Exactly one node selected; anything else is rejected during
        // evaluation and the engine substitutes the parent.
        let len = self.nodes.len();
        vec![Box::new(move |s: &Solution| {
            s.as_binary()
                .is_some_and(|b| b.bits.len() == len && b.selected_index().is_some())
        })]
    }

    fn initialize(&self, pop_size: usize, rng: &mut dyn RngCore) -> Vec<Solution> {
        if self.nodes.is_empty() {
            return Vec::new();
        }
        (0..pop_size)
            .map(|_| {
                let index = rng.random_range(0..self.nodes.len());
                Solution::Binary(BinarySolution::one_hot(self.nodes.len(), index))
            })
            .collect()
    }
}
