// SPDX-FileCopyrightText: 2026 Huddle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite-backed implementation of the storage collaborator traits.

use std::sync::Arc;

use async_trait::async_trait;
use huddle_core::traits::{CounterStore, MessageStore};
use huddle_core::types::{
    CallStatus, ChatMessage, MeetingId, MeetingStatus, ProjectId, TranscriptLine, UserId,
};
use huddle_core::HuddleError;

use crate::database::Database;
use crate::queries;

/// Durable store over a single serialized SQLite connection.
#[derive(Clone)]
pub struct SqliteStore {
    db: Arc<Database>,
}

impl SqliteStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// The wrapped database handle, for callers that need raw queries.
    pub fn database(&self) -> &Arc<Database> {
        &self.db
    }
}

#[async_trait]
impl MessageStore for SqliteStore {
    async fn insert_message(&self, msg: &ChatMessage) -> Result<(), HuddleError> {
        queries::messages::insert_message(&self.db, msg).await
    }

    async fn call_status(&self, message_id: &str) -> Result<Option<CallStatus>, HuddleError> {
        queries::messages::call_status(&self.db, message_id).await
    }

    async fn update_call_status(
        &self,
        message_id: &str,
        status: CallStatus,
        duration_secs: Option<i64>,
    ) -> Result<(), HuddleError> {
        queries::messages::update_call_status(&self.db, message_id, status, duration_secs).await
    }

    async fn set_user_online(&self, user: UserId, online: bool) -> Result<(), HuddleError> {
        queries::users::set_user_online(&self.db, user, online).await
    }

    async fn project_members(&self, project: &ProjectId) -> Result<Vec<UserId>, HuddleError> {
        queries::users::project_members(&self.db, project).await
    }

    async fn is_project_member(
        &self,
        project: &ProjectId,
        user: UserId,
    ) -> Result<bool, HuddleError> {
        queries::users::is_project_member(&self.db, project, user).await
    }

    async fn set_meeting_status(
        &self,
        meeting: &MeetingId,
        status: MeetingStatus,
        duration_secs: Option<i64>,
    ) -> Result<(), HuddleError> {
        queries::meetings::set_meeting_status(&self.db, meeting, status, duration_secs).await
    }

    async fn append_transcripts(&self, lines: &[TranscriptLine]) -> Result<(), HuddleError> {
        queries::transcripts::append_transcripts(&self.db, lines).await
    }
}

#[async_trait]
impl CounterStore for SqliteStore {
    async fn incr(&self, key: &str) -> Result<i64, HuddleError> {
        queries::counters::incr(&self.db, key).await
    }

    async fn decr(&self, key: &str) -> Result<i64, HuddleError> {
        queries::counters::decr(&self.db, key).await
    }

    async fn get(&self, key: &str) -> Result<Option<i64>, HuddleError> {
        queries::counters::get(&self.db, key).await
    }

    async fn set(&self, key: &str, value: i64) -> Result<(), HuddleError> {
        queries::counters::set(&self.db, key, value).await
    }

    async fn delete(&self, key: &str) -> Result<(), HuddleError> {
        queries::counters::delete(&self.db, key).await
    }

    async fn delete_if_eq(&self, key: &str, expected: i64) -> Result<bool, HuddleError> {
        queries::counters::delete_if_eq(&self.db, key, expected).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn adapter_exposes_both_trait_surfaces() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("adapter.db");
        let db = Arc::new(Database::open(path.to_str().unwrap(), false).await.unwrap());
        let store = SqliteStore::new(db);

        let messages: Arc<dyn MessageStore> = Arc::new(store.clone());
        let counters: Arc<dyn CounterStore> = Arc::new(store);

        messages.set_user_online(UserId(1), true).await.unwrap();
        assert_eq!(counters.incr("meeting:m1:count").await.unwrap(), 1);
        assert_eq!(counters.decr("meeting:m1:count").await.unwrap(), 0);
    }
}
