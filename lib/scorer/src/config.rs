// SPDX-FileCopyrightText: Copyright (c) 2024-2026 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
// SPDX-License-Identifier: Apache-2.0

//! Scorer configuration.
//!
//! Loaded from an optional TOML file (path in `MOSCHED_CONFIG_PATH`,
//! falling back to `/etc/mosched/config.toml`) merged with
//! `MOSCHED_`-prefixed environment variables. The objective-weight contract
//! is enforced at construction; a plugin with invalid weights never starts.

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use mosched_hints::cluster::default_system_namespaces;
use mosched_optimizer::{validate_weights, Nsga2Config, WeightsError};

/// ENV naming the config file path.
const CONFIG_PATH_ENV: &str = "MOSCHED_CONFIG_PATH";

/// Default config file location.
const DEFAULT_CONFIG_PATH: &str = "/etc/mosched/config.toml";

/// ENV prefix for field overrides.
const ENV_PREFIX: &str = "MOSCHED_";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScorerConfig {
    /// One weight per optimization objective, each in `[0, 1]`, summing to
    /// 1 within 1e-6. Candidates score `Σ v·(1 − w)`, so a higher weight
    /// shrinks the penalty of its objective: the pick tolerates being worse
    /// on heavily weighted objectives, not better.
    pub objective_weights: Vec<f64>,

    pub population_size: usize,
    pub generations: usize,
    pub crossover_rate: f64,
    pub mutation_rate: f64,

    /// Attempt budget of the slot-reservation protocol.
    pub max_reservation_retries: u32,

    /// CPU utilization below which the power objective penalizes placement,
    /// favoring consolidation.
    pub low_utilization_threshold: f64,

    /// Target per-resource utilization of the spread objective.
    pub ideal_spread: f64,

    /// Upper normalization bound of the spread objective.
    pub max_spread_value: f64,

    /// Workload groups in these namespaces are ignored for fingerprinting.
    pub system_namespaces: Vec<String>,
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            objective_weights: vec![0.5, 0.5],
            population_size: 100,
            generations: 250,
            crossover_rate: 0.8,
            mutation_rate: 0.1,
            max_reservation_retries: 3,
            low_utilization_threshold: 0.2,
            ideal_spread: 0.5,
            max_spread_value: 3.0,
            system_namespaces: default_system_namespaces(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid objective weights: {0}")]
    InvalidWeights(#[from] WeightsError),

    #[error("rate {name} is {value}, outside [0, 1]")]
    RateOutOfRange { name: &'static str, value: f64 },

    #[error("failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),
}

impl ScorerConfig {
    /// Load configuration from file and environment, then validate.
    pub fn load() -> Result<Self, ConfigError> {
        let path =
            std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

        let config: Self = Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX))
            .extract()
            .map_err(Box::new)?;

        config.validate()?;
        Ok(config)
    }

    /// Enforce the weights contract and rate sanity. Fatal at plugin
    /// construction.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_weights(&self.objective_weights)?;
        for (name, value) in [
            ("crossover_rate", self.crossover_rate),
            ("mutation_rate", self.mutation_rate),
            ("low_utilization_threshold", self.low_utilization_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) || value.is_nan() {
                return Err(ConfigError::RateOutOfRange { name, value });
            }
        }
        Ok(())
    }

    /// Engine configuration derived from the optimizer knobs.
    pub fn nsga2(&self) -> Nsga2Config {
        Nsga2Config {
            pop_size: self.population_size,
            generations: self.generations,
            crossover_rate: self.crossover_rate,
            mutation_rate: self.mutation_rate,
        }
    }
}
