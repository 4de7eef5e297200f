// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Environment configuration.
//!
//! - `HDDS_DOMAIN_ID`: domain to join (default: 0, or `ROS_DOMAIN_ID` if set)
//! - `HDDS_LOG_LEVEL`: default log filter when `RUST_LOG` is unset (default: "info")

use std::env;

pub const ENV_DOMAIN_ID: &str = "HDDS_DOMAIN_ID";
pub const ENV_LOG_LEVEL: &str = "HDDS_LOG_LEVEL";
/// ROS 2 environment variable for domain ID (fallback)
pub const ENV_ROS_DOMAIN_ID: &str = "ROS_DOMAIN_ID";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvConfig {
    pub domain_id: u32,
    /// Logging level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            domain_id: 0,
            log_level: "info".to_string(),
        }
    }
}

impl EnvConfig {
    /// Load configuration from the process environment.
    ///
    /// Domain ID priority:
    /// 1. HDDS_DOMAIN_ID
    /// 2. ROS_DOMAIN_ID
    /// 3. 0
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`EnvConfig::from_env`] with a custom variable source.
    ///
    /// Values that do not parse are ignored.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let parse_domain = |key: &str| {
            lookup(key).and_then(|s| s.trim().parse::<u32>().ok())
        };
        let defaults = Self::default();
        Self {
            domain_id: parse_domain(ENV_DOMAIN_ID)
                .or_else(|| parse_domain(ENV_ROS_DOMAIN_ID))
                .unwrap_or(defaults.domain_id),
            log_level: lookup(ENV_LOG_LEVEL)
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .unwrap_or(defaults.log_level),
        }
    }
}
