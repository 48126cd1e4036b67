// SPDX-FileCopyrightText: Copyright (c) 2024-2026 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
// SPDX-License-Identifier: Apache-2.0

//! Process-wide tracing setup.
//!
//! Filters come from the `MOSCHED_LOG` environment variable using the
//! standard `EnvFilter` directive syntax (e.g.
//! `info,mosched_scorer=debug`). The default level is `info`. Scoring-path
//! recoveries log at `debug`, so raise the scorer's level when diagnosing
//! why pods fall through to default scoring.

use std::sync::Once;

use tracing_subscriber::EnvFilter;

/// ENV used to set the log filter.
const FILTER_ENV: &str = "MOSCHED_LOG";

/// Default log level.
const DEFAULT_FILTER_LEVEL: &str = "info";

static INIT: Once = Once::new();

/// Initialize the global tracing subscriber. Safe to call more than once;
/// only the first call installs a subscriber.
pub fn init() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env(FILTER_ENV)
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER_LEVEL));

        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    });
}
