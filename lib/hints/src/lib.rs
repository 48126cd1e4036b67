// SPDX-FileCopyrightText: Copyright (c) 2024-2026 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
// SPDX-License-Identifier: Apache-2.0

//! Placement-plan plumbing shared by the scorer and by offline tooling.
//!
//! A plan is a cluster-scoped record produced by the offline optimizer and
//! consumed by the scheduler extension. This crate holds the record schema
//! and its slot ledger, the deterministic cluster fingerprint that keys
//! plans, the external cluster view, and the optimistic-concurrency keyed
//! store the reservation protocol rides on.

pub mod cluster;
pub mod fingerprint;
pub mod logging;
pub mod plan;
pub mod plan_client;
pub mod store;

pub use cluster::{ClusterClient, NodeInfo, PodSpec, StaticClusterView, WorkloadGroup};
pub use fingerprint::{cluster_fingerprint, plan_name};
pub use plan::{GroupMovement, PlacementPlan, PlanPhase, PlanSolution, PlanSpec, PlanStatus};
pub use plan_client::PlanClient;
pub use store::{KeyValueStore, MemoryStore, StoreError, VersionedValue};
