// SPDX-FileCopyrightText: 2026 Huddle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! WebSocket gateway for the Huddle realtime subsystem.
//!
//! Owns the socket surface: connection lifecycle (presence registration and
//! the durable online flag), inbound frame parsing, project room membership,
//! and the health endpoint. Everything message-shaped is handed to the relay.

pub mod events;
pub mod handlers;
pub mod rooms;
pub mod server;
pub mod ws;

pub use rooms::RoomDirectory;
pub use server::{start_server, GatewayState, ServerConfig};
