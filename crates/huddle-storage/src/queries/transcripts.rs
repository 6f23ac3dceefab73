// SPDX-FileCopyrightText: 2026 Huddle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Append-only transcript log, written in batches.

use huddle_core::types::{MeetingId, TranscriptLine, UserId};
use huddle_core::HuddleError;
use rusqlite::params;

use crate::database::{map_tr_err, Database};

/// Appends a batch of transcript lines in one transaction.
pub async fn append_transcripts(
    db: &Database,
    lines: &[TranscriptLine],
) -> Result<(), HuddleError> {
    if lines.is_empty() {
        return Ok(());
    }
    let lines = lines.to_vec();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            {
                let mut stmt = tx.prepare(
                    "INSERT INTO transcript_lines (meeting_id, user_id, content, created_at)
                     VALUES (?1, ?2, ?3, ?4)",
                )?;
                for line in &lines {
                    stmt.execute(params![
                        line.meeting_id.0,
                        line.user_id.0,
                        line.content,
                        line.created_at,
                    ])?;
                }
            }
            tx.commit()?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// All lines for one meeting in append order.
pub async fn transcript_lines(
    db: &Database,
    meeting_id: &MeetingId,
) -> Result<Vec<TranscriptLine>, HuddleError> {
    let meeting_id = meeting_id.0.clone();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT meeting_id, user_id, content, created_at
                 FROM transcript_lines WHERE meeting_id = ?1 ORDER BY id",
            )?;
            let rows = stmt
                .query_map(params![meeting_id], |row| {
                    Ok(TranscriptLine {
                        meeting_id: MeetingId(row.get(0)?),
                        user_id: UserId(row.get(1)?),
                        content: row.get(2)?,
                        created_at: row.get(3)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn line(meeting: &str, user: i64, content: &str) -> TranscriptLine {
        TranscriptLine {
            meeting_id: MeetingId(meeting.to_owned()),
            user_id: UserId(user),
            content: content.to_owned(),
            created_at: "2026-08-30T12:00:00Z".to_owned(),
        }
    }

    #[tokio::test]
    async fn batch_append_preserves_order() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("transcripts.db");
        let db = Database::open(path.to_str().unwrap(), false).await.unwrap();

        let batch = vec![
            line("meet-1", 1, "first"),
            line("meet-1", 2, "second"),
            line("meet-2", 1, "other meeting"),
        ];
        append_transcripts(&db, &batch).await.unwrap();
        // Empty batch is a no-op, not an error.
        append_transcripts(&db, &[]).await.unwrap();

        let rows = transcript_lines(&db, &MeetingId("meet-1".to_owned()))
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].content, "first");
        assert_eq!(rows[1].content, "second");
    }
}
