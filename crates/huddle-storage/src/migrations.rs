// SPDX-FileCopyrightText: 2026 Huddle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Schema migrations tracked via `PRAGMA user_version`.
//!
//! Each entry runs inside its own transaction; the user_version is bumped
//! only after the batch commits.

use huddle_core::HuddleError;
use tokio_rusqlite::Connection;

use crate::database::map_tr_err;

const MIGRATIONS: &[&str] = &[
    // v1: initial schema
    "CREATE TABLE IF NOT EXISTS messages (
        id                 TEXT PRIMARY KEY,
        conversation_id    TEXT NOT NULL,
        sender_id          INTEGER NOT NULL,
        receiver_id        INTEGER,
        content            TEXT NOT NULL,
        content_type       TEXT NOT NULL DEFAULT 'text',
        project_id         TEXT,
        task_id            TEXT,
        is_group_chat      INTEGER NOT NULL DEFAULT 0,
        call_status        TEXT,
        call_duration_secs INTEGER,
        created_at         TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_messages_conversation
        ON messages (conversation_id, created_at);

    CREATE TABLE IF NOT EXISTS users (
        id           INTEGER PRIMARY KEY,
        online       INTEGER NOT NULL DEFAULT 0,
        last_seen_at TEXT
    );

    CREATE TABLE IF NOT EXISTS project_members (
        project_id TEXT NOT NULL,
        user_id    INTEGER NOT NULL,
        PRIMARY KEY (project_id, user_id)
    );

    CREATE TABLE IF NOT EXISTS meetings (
        id            TEXT PRIMARY KEY,
        status        TEXT NOT NULL,
        duration_secs INTEGER,
        updated_at    TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS transcript_lines (
        id         INTEGER PRIMARY KEY AUTOINCREMENT,
        meeting_id TEXT NOT NULL,
        user_id    INTEGER NOT NULL,
        content    TEXT NOT NULL,
        created_at TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_transcript_meeting
        ON transcript_lines (meeting_id, id);

    CREATE TABLE IF NOT EXISTS kv_counters (
        key   TEXT PRIMARY KEY,
        value INTEGER NOT NULL
    );",
];

/// Applies all pending migrations.
pub(crate) async fn run(conn: &Connection) -> Result<(), HuddleError> {
    conn.call(|c| {
        let version: i64 = c.query_row("PRAGMA user_version", [], |row| row.get(0))?;
        for (i, sql) in MIGRATIONS.iter().enumerate() {
            let target = (i + 1) as i64;
            if version < target {
                let tx = c.transaction()?;
                tx.execute_batch(sql)?;
                tx.pragma_update(None, "user_version", target)?;
                tx.commit()?;
            }
        }
        Ok(())
    })
    .await
    .map_err(map_tr_err)
}
