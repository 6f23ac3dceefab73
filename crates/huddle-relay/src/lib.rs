// SPDX-FileCopyrightText: 2026 Huddle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Presence tracking and message relay for the Huddle realtime subsystem.
//!
//! The [`PresenceRegistry`] maps users to live connections on this process.
//! The [`MessageRelay`] validates, persists, and fans out inbound events,
//! either locally or across processes through the relay bus. Call signaling
//! and the meeting participant counter ride on top of the same event flow.

pub mod bus_listener;
pub mod calls;
pub mod dedup;
pub mod meetings;
pub mod notify;
pub mod presence;
pub mod relay;

pub use bus_listener::spawn_bus_listener;
pub use dedup::{fingerprint, DedupWindow};
pub use meetings::MeetingTracker;
pub use notify::NotificationFanout;
pub use presence::{ConnectionHandle, PresenceRegistry};
pub use relay::MessageRelay;
