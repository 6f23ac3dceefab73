// SPDX-FileCopyrightText: 2026 Huddle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared integer counter store for cross-process mutable state.
//!
//! The meeting participant counter is the only cross-process shared mutable
//! state in the core. Increments and decrements must be atomic primitives of
//! the backing store; read-modify-write at this seam reintroduces the
//! double-join undercount.

use async_trait::async_trait;

use crate::error::HuddleError;

/// Atomic integer key/value operations against the shared store.
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Atomically increments the key, creating it at 1 if absent.
    /// Returns the post-increment value.
    async fn incr(&self, key: &str) -> Result<i64, HuddleError>;

    /// Atomically decrements the key. Returns the post-decrement value,
    /// or 0 if the key is absent.
    async fn decr(&self, key: &str) -> Result<i64, HuddleError>;

    /// Reads the current value, if the key exists.
    async fn get(&self, key: &str) -> Result<Option<i64>, HuddleError>;

    /// Sets the key to an explicit value.
    async fn set(&self, key: &str, value: i64) -> Result<(), HuddleError>;

    /// Deletes the key unconditionally.
    async fn delete(&self, key: &str) -> Result<(), HuddleError>;

    /// Deletes the key only if it currently holds `expected`.
    /// Returns whether the delete happened. Used for the zero-crossing
    /// COMPLETED transition so a racing join cannot be wiped out.
    async fn delete_if_eq(&self, key: &str, expected: i64) -> Result<bool, HuddleError>;
}
