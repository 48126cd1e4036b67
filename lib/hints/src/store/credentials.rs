// SPDX-FileCopyrightText: Copyright (c) 2024-2026 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
// SPDX-License-Identifier: Apache-2.0

//! Store endpoint discovery.
//!
//! The scorer first looks for in-process configuration (environment), then
//! falls back to a credentials file at the conventional path, the same
//! two-step resolution the host orchestrator uses for its own API clients.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

const ENDPOINT_ENV: &str = "MOSCHED_STORE_ENDPOINT";
const TOKEN_ENV: &str = "MOSCHED_STORE_TOKEN";

/// Conventional credentials file location, relative to `$HOME`.
const CREDENTIALS_FILE: &str = ".mosched/credentials.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreCredentials {
    pub endpoint: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum CredentialsError {
    #[error("no store endpoint in the environment and no credentials file at {path}")]
    NotFound { path: String },

    #[error("unreadable credentials file {path}: {source}")]
    Unreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed credentials file {path}: {source}")]
    Malformed {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

impl StoreCredentials {
    /// Resolve credentials: environment first, credentials file second.
    pub fn discover() -> Result<Self, CredentialsError> {
        if let Ok(endpoint) = std::env::var(ENDPOINT_ENV) {
            tracing::debug!(endpoint = %endpoint, "store endpoint from environment");
            return Ok(Self {
                endpoint,
                token: std::env::var(TOKEN_ENV).ok(),
            });
        }

        let path = Self::default_path();
        Self::from_file(&path)
    }

    pub fn default_path() -> PathBuf {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(CREDENTIALS_FILE)
    }

    pub fn from_file(path: &std::path::Path) -> Result<Self, CredentialsError> {
        let display = path.display().to_string();
        let raw = std::fs::read(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                CredentialsError::NotFound {
                    path: display.clone(),
                }
            } else {
                CredentialsError::Unreadable {
                    path: display.clone(),
                    source,
                }
            }
        })?;

        serde_json::from_slice(&raw).map_err(|source| CredentialsError::Malformed {
            path: display,
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn reads_credentials_file() {
        let dir = std::env::temp_dir().join("mosched-credentials-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("credentials.json");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(br#"{"endpoint":"https://store:2379","token":"abc"}"#)
            .unwrap();

        let creds = StoreCredentials::from_file(&path).unwrap();
        assert_eq!(creds.endpoint, "https://store:2379");
        assert_eq!(creds.token.as_deref(), Some("abc"));

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = StoreCredentials::from_file(std::path::Path::new("/nonexistent/creds.json"))
            .unwrap_err();
        assert!(matches!(err, CredentialsError::NotFound { .. }));
    }
}
