// SPDX-FileCopyrightText: 2026 Huddle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as valid bind addresses and non-zero windows.

use crate::diagnostic::ConfigError;
use crate::model::HuddleConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or all collected validation
/// errors (does not fail fast).
pub fn validate_config(config: &HuddleConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let host = config.server.host.trim();
    if host.is_empty() {
        errors.push(ConfigError::Validation {
            message: "server.host must not be empty".to_string(),
        });
    } else {
        let is_valid_ip = host.parse::<std::net::IpAddr>().is_ok();
        let is_valid_hostname = host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-' || c == ':');
        if !is_valid_ip && !is_valid_hostname {
            errors.push(ConfigError::Validation {
                message: format!("server.host `{host}` is not a valid IP address or hostname"),
            });
        }
    }

    if config.server.port == 0 {
        errors.push(ConfigError::Validation {
            message: "server.port must be non-zero".to_string(),
        });
    }

    if !LOG_LEVELS.contains(&config.server.log_level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "server.log_level must be one of {}, got `{}`",
                LOG_LEVELS.join(", "),
                config.server.log_level
            ),
        });
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    if config.storage.transcript_flush_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "storage.transcript_flush_secs must be at least 1".to_string(),
        });
    }

    if config.storage.transcript_buffer_max == 0 {
        errors.push(ConfigError::Validation {
            message: "storage.transcript_buffer_max must be at least 1".to_string(),
        });
    }

    if config.bus.channel_capacity == 0 {
        errors.push(ConfigError::Validation {
            message: "bus.channel_capacity must be at least 1".to_string(),
        });
    }

    if config.relay.dedup_ttl_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "relay.dedup_ttl_secs must be at least 1".to_string(),
        });
    }

    if config.relay.dedup_capacity == 0 {
        errors.push(ConfigError::Validation {
            message: "relay.dedup_capacity must be at least 1".to_string(),
        });
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
