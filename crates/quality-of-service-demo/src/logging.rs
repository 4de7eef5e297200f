// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Console logging for the demo binaries.
//!
//! Node loggers and the runtime log through the `log` facade; the fmt
//! subscriber installed here picks those records up through its `log`
//! bridge. `RUST_LOG` wins over `HDDS_LOG_LEVEL`.

use crate::config::EnvConfig;
use crate::error::DemoError;
use tracing_subscriber::{fmt, EnvFilter};

/// Build the filter: `RUST_LOG` if set, otherwise the configured level for
/// the demo nodes and `warn` for the runtime internals.
pub fn env_filter(config: &EnvConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("{},hdds_qos=warn", config.log_level))
    })
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init(config: &EnvConfig) -> Result<(), DemoError> {
    fmt()
        .with_env_filter(env_filter(config))
        .with_target(true)
        .try_init()
        .map_err(|e| DemoError::Logging(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_uses_configured_level() {
        if std::env::var("RUST_LOG").is_ok() {
            return;
        }
        let config = EnvConfig {
            log_level: "debug".to_string(),
            ..EnvConfig::default()
        };
        let filter = env_filter(&config).to_string();
        assert!(filter.contains("debug"));
        assert!(filter.contains("hdds_qos=warn"));
    }
}
