// SPDX-FileCopyrightText: 2026 Huddle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed query modules, one per table family.

pub mod counters;
pub mod meetings;
pub mod messages;
pub mod transcripts;
pub mod users;
