// SPDX-FileCopyrightText: Copyright (c) 2024-2026 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
// SPDX-License-Identifier: Apache-2.0

//! Deterministic cluster fingerprinting.
//!
//! A plan only applies to the cluster shape it was optimized for. The
//! fingerprint digests the worker-node set and the desired replica counts of
//! non-system workload groups, so the scorer can look up the matching plan
//! with a single keyed read. The canonical form and digest are a wire
//! contract with the plan producer and must not change independently.

use sha2::{Digest, Sha256};

use crate::cluster::{NodeInfo, WorkloadGroup};

/// Plans are keyed by this prefix plus the 16-hex-character fingerprint.
const PLAN_NAME_PREFIX: &str = "multiobjective-hints-";

/// Length of the hex fingerprint kept from the SHA-256 digest.
const FINGERPRINT_HEX_LEN: usize = 16;

/// Compute the fingerprint of the current cluster shape.
///
/// Canonical form:
/// `nodes:<sorted worker names, ','-joined>|replicasets:<sorted "<ns>/<name>=<replicas>" specs, ';'-joined>`
///
/// Control-plane nodes, groups in system namespaces, and groups with zero
/// desired replicas are excluded, making the digest invariant under input
/// ordering and under system churn that placement plans never cover.
pub fn cluster_fingerprint(
    nodes: &[NodeInfo],
    groups: &[WorkloadGroup],
    system_namespaces: &[String],
) -> String {
    let mut node_names: Vec<&str> = nodes
        .iter()
        .filter(|n| !n.is_control_plane())
        .map(|n| n.name.as_str())
        .collect();
    node_names.sort_unstable();

    let mut group_specs: Vec<String> = groups
        .iter()
        .filter(|g| g.replicas > 0 && !system_namespaces.iter().any(|ns| ns == &g.namespace))
        .map(|g| format!("{}/{}={}", g.namespace, g.name, g.replicas))
        .collect();
    group_specs.sort_unstable();

    let cluster_spec = format!(
        "nodes:{}|replicasets:{}",
        node_names.join(","),
        group_specs.join(";")
    );
    tracing::trace!(spec = %cluster_spec, "canonical cluster spec");

    let digest = Sha256::digest(cluster_spec.as_bytes());
    digest
        .iter()
        .take(FINGERPRINT_HEX_LEN / 2)
        .map(|b| format!("{:02x}", b))
        .collect()
}

/// The store key of the plan for a fingerprint.
pub fn plan_name(fingerprint: &str) -> String {
    format!("{PLAN_NAME_PREFIX}{fingerprint}")
}
