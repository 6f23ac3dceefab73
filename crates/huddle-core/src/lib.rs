// SPDX-FileCopyrightText: 2026 Huddle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Huddle realtime subsystem.
//!
//! Provides the shared model types, the relay event taxonomy, the error type,
//! and the trait seams to the subsystem's external collaborators (durable
//! store, shared counter store, cross-instance bus).

pub mod error;
pub mod event;
pub mod traits;
pub mod types;

pub use error::HuddleError;
pub use event::{Notification, NotificationPriority, RelayEvent, ServerEvent};
pub use traits::{BusSubscription, CounterStore, MessageStore, RelayBus};
pub use types::{
    CallStatus, ChatMessage, ConnectionId, MeetingId, MeetingStatus, ProjectId, TranscriptLine,
    UserId,
};
