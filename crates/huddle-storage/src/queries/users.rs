// SPDX-FileCopyrightText: 2026 Huddle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User presence flags and project membership lookups.

use chrono::Utc;
use huddle_core::types::{ProjectId, UserId};
use huddle_core::HuddleError;
use rusqlite::{params, OptionalExtension};

use crate::database::{map_tr_err, Database};

/// Upserts the online flag for a user, stamping last_seen_at.
pub async fn set_user_online(
    db: &Database,
    user_id: UserId,
    online: bool,
) -> Result<(), HuddleError> {
    let now = Utc::now().to_rfc3339();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO users (id, online, last_seen_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(id) DO UPDATE SET online = ?2, last_seen_at = ?3",
                params![user_id.0, online, now],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Reads the online flag. Unknown users read as offline.
pub async fn is_user_online(db: &Database, user_id: UserId) -> Result<bool, HuddleError> {
    db.connection()
        .call(move |conn| {
            let online: Option<bool> = conn
                .query_row(
                    "SELECT online FROM users WHERE id = ?1",
                    params![user_id.0],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(online.unwrap_or(false))
        })
        .await
        .map_err(map_tr_err)
}

/// Adds a user to a project. Idempotent.
pub async fn add_project_member(
    db: &Database,
    project_id: &ProjectId,
    user_id: UserId,
) -> Result<(), HuddleError> {
    let project_id = project_id.0.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT OR IGNORE INTO project_members (project_id, user_id) VALUES (?1, ?2)",
                params![project_id, user_id.0],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// All members of a project, ascending by user id.
pub async fn project_members(
    db: &Database,
    project_id: &ProjectId,
) -> Result<Vec<UserId>, HuddleError> {
    let project_id = project_id.0.clone();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT user_id FROM project_members WHERE project_id = ?1 ORDER BY user_id",
            )?;
            let rows = stmt
                .query_map(params![project_id], |row| row.get::<_, i64>(0))?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows.into_iter().map(UserId).collect())
        })
        .await
        .map_err(map_tr_err)
}

/// Membership check used to gate project room joins.
pub async fn is_project_member(
    db: &Database,
    project_id: &ProjectId,
    user_id: UserId,
) -> Result<bool, HuddleError> {
    let project_id = project_id.0.clone();
    db.connection()
        .call(move |conn| {
            let found: Option<i64> = conn
                .query_row(
                    "SELECT 1 FROM project_members WHERE project_id = ?1 AND user_id = ?2",
                    params![project_id, user_id.0],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(found.is_some())
        })
        .await
        .map_err(map_tr_err)
}
