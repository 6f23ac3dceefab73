// SPDX-FileCopyrightText: 2026 Huddle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message rows: inserts, call-status reads and transitions.

use std::str::FromStr;

use huddle_core::types::{CallStatus, ChatMessage, ProjectId, UserId};
use huddle_core::HuddleError;
use rusqlite::{params, OptionalExtension, Row};

use crate::database::{map_tr_err, Database};

fn row_to_message(row: &Row<'_>) -> rusqlite::Result<ChatMessage> {
    let call_status: Option<String> = row.get("call_status")?;
    Ok(ChatMessage {
        id: row.get("id")?,
        conversation_id: row.get("conversation_id")?,
        sender_id: UserId(row.get("sender_id")?),
        receiver_id: row.get::<_, Option<i64>>("receiver_id")?.map(UserId),
        content: row.get("content")?,
        content_type: row.get("content_type")?,
        project_id: row.get::<_, Option<String>>("project_id")?.map(ProjectId),
        task_id: row.get("task_id")?,
        is_group_chat: row.get("is_group_chat")?,
        call_status: call_status.and_then(|s| CallStatus::from_str(&s).ok()),
        call_duration_secs: row.get("call_duration_secs")?,
        created_at: row.get("created_at")?,
    })
}

/// Inserts a message row. The id is caller-assigned and must be unique.
pub async fn insert_message(db: &Database, message: &ChatMessage) -> Result<(), HuddleError> {
    let m = message.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO messages (
                    id, conversation_id, sender_id, receiver_id, content,
                    content_type, project_id, task_id, is_group_chat,
                    call_status, call_duration_secs, created_at
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
                params![
                    m.id,
                    m.conversation_id,
                    m.sender_id.0,
                    m.receiver_id.map(|u| u.0),
                    m.content,
                    m.content_type,
                    m.project_id.as_ref().map(|p| p.0.as_str()),
                    m.task_id,
                    m.is_group_chat,
                    m.call_status.map(|s| s.to_string()),
                    m.call_duration_secs,
                    m.created_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Fetches a single message by id.
pub async fn get_message(db: &Database, id: &str) -> Result<Option<ChatMessage>, HuddleError> {
    let id = id.to_owned();
    db.connection()
        .call(move |conn| {
            Ok(conn
                .query_row("SELECT * FROM messages WHERE id = ?1", params![id], |row| {
                    row_to_message(row)
                })
                .optional()?)
        })
        .await
        .map_err(map_tr_err)
}

/// Reads the call status of a message, if the row exists and carries one.
pub async fn call_status(db: &Database, id: &str) -> Result<Option<CallStatus>, HuddleError> {
    let id = id.to_owned();
    db.connection()
        .call(move |conn| {
            let status: Option<Option<String>> = conn
                .query_row(
                    "SELECT call_status FROM messages WHERE id = ?1",
                    params![id],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(status
                .flatten()
                .and_then(|s| CallStatus::from_str(&s).ok()))
        })
        .await
        .map_err(map_tr_err)
}

/// Writes a new call status (and optional final duration) onto a message row.
pub async fn update_call_status(
    db: &Database,
    id: &str,
    status: CallStatus,
    duration_secs: Option<i64>,
) -> Result<(), HuddleError> {
    let id = id.to_owned();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE messages
                 SET call_status = ?2,
                     call_duration_secs = COALESCE(?3, call_duration_secs)
                 WHERE id = ?1",
                params![id, status.to_string(), duration_secs],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Messages for one conversation, oldest first.
pub async fn messages_for_conversation(
    db: &Database,
    conversation_id: &str,
) -> Result<Vec<ChatMessage>, HuddleError> {
    let conversation_id = conversation_id.to_owned();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT * FROM messages WHERE conversation_id = ?1 ORDER BY created_at, id",
            )?;
            let rows = stmt
                .query_map(params![conversation_id], row_to_message)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
        .await
        .map_err(map_tr_err)
}
