// SPDX-FileCopyrightText: 2026 Huddle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Meeting lifecycle rows written by the participant counter.

use std::str::FromStr;

use chrono::Utc;
use huddle_core::types::{MeetingId, MeetingStatus};
use huddle_core::HuddleError;
use rusqlite::{params, OptionalExtension};

use crate::database::{map_tr_err, Database};

/// Upserts the status (and optional final duration) of a meeting.
pub async fn set_meeting_status(
    db: &Database,
    meeting_id: &MeetingId,
    status: MeetingStatus,
    duration_secs: Option<i64>,
) -> Result<(), HuddleError> {
    let meeting_id = meeting_id.0.clone();
    let now = Utc::now().to_rfc3339();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO meetings (id, status, duration_secs, updated_at)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(id) DO UPDATE SET
                    status = ?2,
                    duration_secs = COALESCE(?3, duration_secs),
                    updated_at = ?4",
                params![meeting_id, status.to_string(), duration_secs, now],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Reads a meeting's status and recorded duration.
pub async fn meeting_status(
    db: &Database,
    meeting_id: &MeetingId,
) -> Result<Option<(MeetingStatus, Option<i64>)>, HuddleError> {
    let meeting_id = meeting_id.0.clone();
    db.connection()
        .call(move |conn| {
            let row: Option<(String, Option<i64>)> = conn
                .query_row(
                    "SELECT status, duration_secs FROM meetings WHERE id = ?1",
                    params![meeting_id],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )
                .optional()?;
            Ok(row.and_then(|(status, duration)| {
                MeetingStatus::from_str(&status)
                    .ok()
                    .map(|s| (s, duration))
            }))
        })
        .await
        .map_err(map_tr_err)
}
