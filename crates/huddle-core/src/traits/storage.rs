// SPDX-FileCopyrightText: 2026 Huddle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage collaborator trait for the durable relational store.

use async_trait::async_trait;

use crate::error::HuddleError;
use crate::types::{
    CallStatus, ChatMessage, MeetingId, MeetingStatus, ProjectId, TranscriptLine, UserId,
};

/// The durable store consumed by the relay through create/read/update calls.
///
/// Persistence failures during relay are logged and swallowed by the caller;
/// delivery is still attempted with the original payload.
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Persists a new chat message row.
    async fn insert_message(&self, msg: &ChatMessage) -> Result<(), HuddleError>;

    /// Reads the current call status recorded on a message row, if any.
    async fn call_status(&self, message_id: &str) -> Result<Option<CallStatus>, HuddleError>;

    /// Writes a new call status (and duration, for ENDED) onto a message row.
    async fn update_call_status(
        &self,
        message_id: &str,
        status: CallStatus,
        duration_secs: Option<i64>,
    ) -> Result<(), HuddleError>;

    /// Marks a user online or offline.
    async fn set_user_online(&self, user: UserId, online: bool) -> Result<(), HuddleError>;

    /// All members of a project, for project-scoped notification fanout.
    async fn project_members(&self, project: &ProjectId) -> Result<Vec<UserId>, HuddleError>;

    /// Membership gate for project-room join.
    async fn is_project_member(
        &self,
        project: &ProjectId,
        user: UserId,
    ) -> Result<bool, HuddleError>;

    /// Transitions a meeting's lifecycle status, recording duration when completed.
    async fn set_meeting_status(
        &self,
        meeting: &MeetingId,
        status: MeetingStatus,
        duration_secs: Option<i64>,
    ) -> Result<(), HuddleError>;

    /// Appends one line to the durable transcript log.
    async fn append_transcripts(&self, lines: &[TranscriptLine]) -> Result<(), HuddleError>;
}
