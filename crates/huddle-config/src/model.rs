// SPDX-FileCopyrightText: 2026 Huddle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Huddle realtime subsystem.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, producing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Huddle configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. All sections are optional and default to sensible
/// values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HuddleConfig {
    /// Gateway server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Durable store settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Cross-instance relay bus settings.
    #[serde(default)]
    pub bus: BusConfig,

    /// Relay core settings (dedup window).
    #[serde(default)]
    pub relay: RelayConfig,
}

/// Gateway server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    4100
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Durable store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,

    /// Seconds between periodic transcript buffer flushes.
    #[serde(default = "default_transcript_flush_secs")]
    pub transcript_flush_secs: u64,

    /// Buffered transcript lines that force an early flush.
    #[serde(default = "default_transcript_buffer_max")]
    pub transcript_buffer_max: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
            transcript_flush_secs: default_transcript_flush_secs(),
            transcript_buffer_max: default_transcript_buffer_max(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("huddle").join("huddle.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("huddle.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

fn default_transcript_flush_secs() -> u64 {
    10
}

fn default_transcript_buffer_max() -> usize {
    128
}

/// Cross-instance relay bus configuration.
///
/// When disabled, the relay degrades to single-process synchronous delivery.
/// This is a documented fallback, not an error.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BusConfig {
    /// Enable the shared relay channel.
    #[serde(default)]
    pub enabled: bool,

    /// Per-subscriber buffer on the shared channel. Slow subscribers beyond
    /// this depth lose events (logged as lag).
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            channel_capacity: default_channel_capacity(),
        }
    }
}

fn default_channel_capacity() -> usize {
    1024
}

/// Relay core configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RelayConfig {
    /// Seconds a dedup fingerprint stays live.
    #[serde(default = "default_dedup_ttl_secs")]
    pub dedup_ttl_secs: u64,

    /// Fingerprint cache capacity; expired entries are swept on access
    /// once this is exceeded.
    #[serde(default = "default_dedup_capacity")]
    pub dedup_capacity: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            dedup_ttl_secs: default_dedup_ttl_secs(),
            dedup_capacity: default_dedup_capacity(),
        }
    }
}

fn default_dedup_ttl_secs() -> u64 {
    5
}

fn default_dedup_capacity() -> usize {
    4096
}
