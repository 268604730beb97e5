// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants;
use crate::sync::SyncPolicy;
use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Operator configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// YAML file with the declared clusters and namespaces
    pub declared_state_file: PathBuf,
    pub declared_state_poll_interval: Duration,
    /// For testing, every cluster is reached through the inferred local kubeconfig
    pub testing_mode: bool,
    pub sync_policy: SyncPolicy,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let declared_state_file = env::var("DECLARED_STATE_FILE")
            .context("DECLARED_STATE_FILE environment variable not set")?
            .into();
        let testing_mode: bool = env::var("TESTING_MODE")
            .unwrap_or("false".to_string())
            .parse()
            .unwrap_or(false);

        let sync_policy = SyncPolicy {
            deploy_timeout: Duration::from_secs(env_or(
                "SYNC_DEPLOY_TIMEOUT_SECS",
                constants::sync::DEPLOY_TIMEOUT_SECS,
            )?),
            retry_base: Duration::from_secs(env_or(
                "SYNC_RETRY_BASE_SECS",
                constants::sync::RETRY_BASE_SECS,
            )?),
            redeliver_delay: Duration::from_secs(env_or(
                "SYNC_REDELIVER_DELAY_SECS",
                constants::sync::REDELIVER_DELAY_SECS,
            )?),
            max_retries: env_or("SYNC_MAX_RETRIES", constants::sync::MAX_RETRIES)?,
        };

        Ok(Config {
            declared_state_file,
            declared_state_poll_interval: Duration::from_secs(env_or(
                "DECLARED_STATE_POLL_SECS",
                constants::declared::POLL_INTERVAL_SECS,
            )?),
            testing_mode,
            sync_policy,
        })
    }
}

/// Read a numeric variable, falling back to the default when unset
fn env_or<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(value) => value
            .parse()
            .with_context(|| format!("{} has an invalid value '{}'", name, value)),
        Err(_) => Ok(default),
    }
}
