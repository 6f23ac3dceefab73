// SPDX-FileCopyrightText: 2026 Huddle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory fakes of the storage and counter collaborators.
//!
//! `MemoryStore` keeps everything behind plain mutexes and supports failure
//! injection for exercising the relay's best-effort persistence path.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use huddle_core::traits::{CounterStore, MessageStore};
use huddle_core::types::{
    CallStatus, ChatMessage, MeetingId, MeetingStatus, ProjectId, TranscriptLine, UserId,
};
use huddle_core::HuddleError;

#[derive(Debug)]
struct InjectedFailure;

impl std::fmt::Display for InjectedFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "injected storage failure")
    }
}

impl std::error::Error for InjectedFailure {}

fn injected() -> HuddleError {
    HuddleError::Storage {
        source: Box::new(InjectedFailure),
    }
}

/// In-memory store implementing both collaborator traits.
#[derive(Default)]
pub struct MemoryStore {
    messages: Mutex<HashMap<String, ChatMessage>>,
    online: Mutex<HashMap<UserId, bool>>,
    members: Mutex<HashMap<ProjectId, Vec<UserId>>>,
    meetings: Mutex<HashMap<MeetingId, (MeetingStatus, Option<i64>)>>,
    transcripts: Mutex<Vec<TranscriptLine>>,
    counters: Mutex<HashMap<String, i64>>,
    fail_inserts: AtomicBool,
    fail_membership: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent `insert_message` fail.
    pub fn fail_inserts(&self, fail: bool) {
        self.fail_inserts.store(fail, Ordering::SeqCst);
    }

    /// Makes every subsequent `is_project_member` fail.
    pub fn fail_membership_checks(&self, fail: bool) {
        self.fail_membership.store(fail, Ordering::SeqCst);
    }

    pub fn add_project_member(&self, project: &ProjectId, user: UserId) {
        let mut members = self.members.lock().unwrap();
        let list = members.entry(project.clone()).or_default();
        if !list.contains(&user) {
            list.push(user);
        }
    }

    pub fn message_count(&self) -> usize {
        self.messages.lock().unwrap().len()
    }

    pub fn message(&self, id: &str) -> Option<ChatMessage> {
        self.messages.lock().unwrap().get(id).cloned()
    }

    pub fn is_online(&self, user: UserId) -> bool {
        self.online.lock().unwrap().get(&user).copied().unwrap_or(false)
    }

    pub fn meeting(&self, meeting: &MeetingId) -> Option<(MeetingStatus, Option<i64>)> {
        self.meetings.lock().unwrap().get(meeting).copied()
    }

    pub fn transcript_count(&self) -> usize {
        self.transcripts.lock().unwrap().len()
    }

    pub fn counter(&self, key: &str) -> Option<i64> {
        self.counters.lock().unwrap().get(key).copied()
    }
}

#[async_trait]
impl MessageStore for MemoryStore {
    async fn insert_message(&self, msg: &ChatMessage) -> Result<(), HuddleError> {
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(injected());
        }
        self.messages
            .lock()
            .unwrap()
            .insert(msg.id.clone(), msg.clone());
        Ok(())
    }

    async fn call_status(&self, message_id: &str) -> Result<Option<CallStatus>, HuddleError> {
        Ok(self
            .messages
            .lock()
            .unwrap()
            .get(message_id)
            .and_then(|m| m.call_status))
    }

    async fn update_call_status(
        &self,
        message_id: &str,
        status: CallStatus,
        duration_secs: Option<i64>,
    ) -> Result<(), HuddleError> {
        let mut messages = self.messages.lock().unwrap();
        if let Some(msg) = messages.get_mut(message_id) {
            msg.call_status = Some(status);
            if duration_secs.is_some() {
                msg.call_duration_secs = duration_secs;
            }
        }
        Ok(())
    }

    async fn set_user_online(&self, user: UserId, online: bool) -> Result<(), HuddleError> {
        self.online.lock().unwrap().insert(user, online);
        Ok(())
    }

    async fn project_members(&self, project: &ProjectId) -> Result<Vec<UserId>, HuddleError> {
        Ok(self
            .members
            .lock()
            .unwrap()
            .get(project)
            .cloned()
            .unwrap_or_default())
    }

    async fn is_project_member(
        &self,
        project: &ProjectId,
        user: UserId,
    ) -> Result<bool, HuddleError> {
        if self.fail_membership.load(Ordering::SeqCst) {
            return Err(injected());
        }
        Ok(self
            .members
            .lock()
            .unwrap()
            .get(project)
            .is_some_and(|m| m.contains(&user)))
    }

    async fn set_meeting_status(
        &self,
        meeting: &MeetingId,
        status: MeetingStatus,
        duration_secs: Option<i64>,
    ) -> Result<(), HuddleError> {
        let mut meetings = self.meetings.lock().unwrap();
        let entry = meetings.entry(meeting.clone()).or_insert((status, None));
        entry.0 = status;
        if duration_secs.is_some() {
            entry.1 = duration_secs;
        }
        Ok(())
    }

    async fn append_transcripts(&self, lines: &[TranscriptLine]) -> Result<(), HuddleError> {
        self.transcripts.lock().unwrap().extend_from_slice(lines);
        Ok(())
    }
}

#[async_trait]
impl CounterStore for MemoryStore {
    async fn incr(&self, key: &str) -> Result<i64, HuddleError> {
        let mut counters = self.counters.lock().unwrap();
        let value = counters.entry(key.to_owned()).or_insert(0);
        *value += 1;
        Ok(*value)
    }

    async fn decr(&self, key: &str) -> Result<i64, HuddleError> {
        let mut counters = self.counters.lock().unwrap();
        match counters.get_mut(key) {
            Some(value) => {
                *value -= 1;
                Ok(*value)
            }
            None => Ok(0),
        }
    }

    async fn get(&self, key: &str) -> Result<Option<i64>, HuddleError> {
        Ok(self.counters.lock().unwrap().get(key).copied())
    }

    async fn set(&self, key: &str, value: i64) -> Result<(), HuddleError> {
        self.counters.lock().unwrap().insert(key.to_owned(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), HuddleError> {
        self.counters.lock().unwrap().remove(key);
        Ok(())
    }

    async fn delete_if_eq(&self, key: &str, expected: i64) -> Result<bool, HuddleError> {
        let mut counters = self.counters.lock().unwrap();
        if counters.get(key) == Some(&expected) {
            counters.remove(key);
            Ok(true)
        } else {
            Ok(false)
        }
    }
}
