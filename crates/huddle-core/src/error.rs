// SPDX-FileCopyrightText: 2026 Huddle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Huddle realtime subsystem.

use thiserror::Error;

/// The primary error type used across all Huddle trait seams and core operations.
///
/// Relay-path failures are caught and logged at the relay boundary and never
/// reach the transport layer; this type propagates below that boundary
/// (storage, bus, gateway startup).
#[derive(Debug, Error)]
pub enum HuddleError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Relay bus errors (publish failure, closed channel, codec failure).
    #[error("bus error: {message}")]
    Bus {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Gateway/transport errors (bind failure, socket errors).
    #[error("channel error: {message}")]
    Channel {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}
