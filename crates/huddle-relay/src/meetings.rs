// SPDX-FileCopyrightText: 2026 Huddle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Meeting participant counter over the shared counter store.
//!
//! The count and start-time keys are the only cross-process mutable state
//! in the subsystem. Increments and decrements are atomic primitives of the
//! store, and the zero-crossing COMPLETED transition is guarded by a
//! compare-and-delete so a racing join cannot be wiped out.

use std::sync::Arc;

use chrono::Utc;
use huddle_core::traits::{CounterStore, MessageStore};
use huddle_core::types::{MeetingId, MeetingStatus};
use huddle_core::HuddleError;
use tracing::{debug, info};

pub struct MeetingTracker {
    counters: Arc<dyn CounterStore>,
    store: Arc<dyn MessageStore>,
}

fn count_key(meeting: &MeetingId) -> String {
    format!("meeting:{}:count", meeting.0)
}

fn started_key(meeting: &MeetingId) -> String {
    format!("meeting:{}:started_at", meeting.0)
}

impl MeetingTracker {
    pub fn new(counters: Arc<dyn CounterStore>, store: Arc<dyn MessageStore>) -> Self {
        Self { counters, store }
    }

    /// Records one participant joining. The first join stamps the start time
    /// and moves the meeting to PROCESSING. Returns the post-join count.
    pub async fn join(&self, meeting: &MeetingId) -> Result<i64, HuddleError> {
        let count = self.counters.incr(&count_key(meeting)).await?;
        if count == 1 {
            self.counters
                .set(&started_key(meeting), Utc::now().timestamp())
                .await?;
            self.store
                .set_meeting_status(meeting, MeetingStatus::Processing, None)
                .await?;
            info!(meeting_id = %meeting.0, "meeting started");
        } else {
            debug!(meeting_id = %meeting.0, count, "participant joined");
        }
        Ok(count)
    }

    /// Records one participant leaving. When the count crosses zero the
    /// meeting completes: duration is computed from the stored start time,
    /// both keys are removed, and the status becomes COMPLETED. Returns the
    /// post-leave count.
    pub async fn leave(&self, meeting: &MeetingId) -> Result<i64, HuddleError> {
        let key = count_key(meeting);
        let count = self.counters.decr(&key).await?;
        if count > 0 {
            debug!(meeting_id = %meeting.0, count, "participant left");
            return Ok(count);
        }

        // Only the leave that actually removes the zeroed key completes the
        // meeting; a concurrent join that bumped it back wins otherwise.
        if self.counters.delete_if_eq(&key, count).await? {
            let started = self.counters.get(&started_key(meeting)).await?;
            self.counters.delete(&started_key(meeting)).await?;
            let duration = started
                .map(|s| (Utc::now().timestamp() - s).max(0))
                .unwrap_or(0);
            self.store
                .set_meeting_status(meeting, MeetingStatus::Completed, Some(duration))
                .await?;
            info!(meeting_id = %meeting.0, duration_secs = duration, "meeting completed");
        }
        Ok(count)
    }

    /// Current participant count, 0 if the meeting has none.
    pub async fn participant_count(&self, meeting: &MeetingId) -> Result<i64, HuddleError> {
        Ok(self.counters.get(&count_key(meeting)).await?.unwrap_or(0))
    }
}
