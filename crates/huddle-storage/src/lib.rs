// SPDX-FileCopyrightText: 2026 Huddle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence for the Huddle realtime subsystem.
//!
//! One serialized connection (tokio-rusqlite) carries all reads and writes.
//! [`SqliteStore`] implements the collaborator traits the relay consumes;
//! [`TranscriptWriter`] batches transcript lines behind it.

pub mod adapter;
pub mod database;
mod migrations;
pub mod queries;
pub mod writer;

pub use adapter::SqliteStore;
pub use database::Database;
pub use writer::TranscriptWriter;
