// Configuration validation - rules applied after loading

use std::collections::HashSet;

use thiserror::Error;

use crate::config::AppConfig;

const MAX_STRATEGY_TIMEOUT_MS: u64 = 300_000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}

fn invalid(field: impl Into<String>, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field: field.into(),
        reason: reason.into(),
    }
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - there are no strategies, or two share a name
    /// - a strategy timeout is 0 or exceeds 5 minutes
    /// - `cache_ttl_ms` or `max_diagnostic_len` is 0
    /// - `allowed_hosts` is empty
    /// - `lookup_path` is not an absolute path other than `/`
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.strategies.is_empty() {
            return Err(invalid("strategies", "at least one strategy is required"));
        }

        let mut seen = HashSet::new();
        for strategy in &self.strategies {
            if strategy.name.trim().is_empty() {
                return Err(invalid("strategies", "strategy name must not be empty"));
            }
            if !seen.insert(strategy.name.as_str()) {
                return Err(invalid(
                    "strategies",
                    format!("duplicate strategy name '{}'", strategy.name),
                ));
            }
            if strategy.timeout_ms == 0 {
                return Err(invalid(
                    format!("strategies.{}.timeout_ms", strategy.name),
                    "must be greater than 0",
                ));
            }
            if strategy.timeout_ms > MAX_STRATEGY_TIMEOUT_MS {
                return Err(invalid(
                    format!("strategies.{}.timeout_ms", strategy.name),
                    "must not exceed 5 minutes (300000ms)",
                ));
            }
        }

        if self.cache_ttl_ms == 0 {
            return Err(invalid("cache_ttl_ms", "must be greater than 0"));
        }

        if self.max_diagnostic_len == 0 {
            return Err(invalid("max_diagnostic_len", "must be greater than 0"));
        }

        if self.allowed_hosts.iter().all(|h| h.trim().is_empty()) {
            return Err(invalid("allowed_hosts", "must contain at least one host"));
        }

        let path = self.lookup_path.as_str();
        if !path.starts_with('/') || path == "/" || path == "/health" {
            return Err(invalid(
                "lookup_path",
                "must start with '/' and not collide with '/' or '/health'",
            ));
        }

        Ok(())
    }
}
