// SPDX-FileCopyrightText: 2026 Huddle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait seams to the subsystem's external collaborators.
//!
//! The durable store, the shared counter store, and the cross-instance bus
//! are all consumed through these traits so the relay core stays independent
//! of concrete backends.

pub mod bus;
pub mod counter;
pub mod storage;

pub use bus::{BusSubscription, RelayBus};
pub use counter::CounterStore;
pub use storage::MessageStore;
