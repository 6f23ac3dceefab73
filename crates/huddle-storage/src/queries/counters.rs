// SPDX-FileCopyrightText: 2026 Huddle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Atomic keyed counters over the kv_counters table.
//!
//! Each operation is one SQL statement, so concurrent increments through
//! the serialized connection never interleave read-modify-write halves.

use huddle_core::HuddleError;
use rusqlite::{params, OptionalExtension};

use crate::database::{map_tr_err, Database};

/// Increments a counter, creating it at 1 if absent. Returns the new value.
pub async fn incr(db: &Database, key: &str) -> Result<i64, HuddleError> {
    let key = key.to_owned();
    db.connection()
        .call(move |conn| {
            let value: i64 = conn.query_row(
                "INSERT INTO kv_counters (key, value) VALUES (?1, 1)
                 ON CONFLICT(key) DO UPDATE SET value = value + 1
                 RETURNING value",
                params![key],
                |row| row.get(0),
            )?;
            Ok(value)
        })
        .await
        .map_err(map_tr_err)
}

/// Decrements a counter. An absent key reads as 0 and is not created.
pub async fn decr(db: &Database, key: &str) -> Result<i64, HuddleError> {
    let key = key.to_owned();
    db.connection()
        .call(move |conn| {
            let value: Option<i64> = conn
                .query_row(
                    "UPDATE kv_counters SET value = value - 1 WHERE key = ?1
                     RETURNING value",
                    params![key],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(value.unwrap_or(0))
        })
        .await
        .map_err(map_tr_err)
}

/// Reads a counter. Absent keys read as None.
pub async fn get(db: &Database, key: &str) -> Result<Option<i64>, HuddleError> {
    let key = key.to_owned();
    db.connection()
        .call(move |conn| {
            Ok(conn
                .query_row(
                    "SELECT value FROM kv_counters WHERE key = ?1",
                    params![key],
                    |row| row.get(0),
                )
                .optional()?)
        })
        .await
        .map_err(map_tr_err)
}

/// Sets a counter unconditionally.
pub async fn set(db: &Database, key: &str, value: i64) -> Result<(), HuddleError> {
    let key = key.to_owned();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO kv_counters (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = ?2",
                params![key, value],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Deletes a counter if present.
pub async fn delete(db: &Database, key: &str) -> Result<(), HuddleError> {
    let key = key.to_owned();
    db.connection()
        .call(move |conn| {
            conn.execute("DELETE FROM kv_counters WHERE key = ?1", params![key])?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Deletes a counter only if its current value equals `expected`.
/// Returns whether a row was removed.
pub async fn delete_if_eq(db: &Database, key: &str, expected: i64) -> Result<bool, HuddleError> {
    let key = key.to_owned();
    db.connection()
        .call(move |conn| {
            let removed = conn.execute(
                "DELETE FROM kv_counters WHERE key = ?1 AND value = ?2",
                params![key, expected],
            )?;
            Ok(removed > 0)
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn open_db(dir: &tempfile::TempDir) -> Database {
        let path = dir.path().join("counters.db");
        Database::open(path.to_str().unwrap(), false).await.unwrap()
    }

    #[tokio::test]
    async fn incr_creates_then_counts() {
        let dir = tempdir().unwrap();
        let db = open_db(&dir).await;

        assert_eq!(incr(&db, "k").await.unwrap(), 1);
        assert_eq!(incr(&db, "k").await.unwrap(), 2);
        assert_eq!(get(&db, "k").await.unwrap(), Some(2));
    }

    #[tokio::test]
    async fn decr_on_absent_key_reads_zero() {
        let dir = tempdir().unwrap();
        let db = open_db(&dir).await;

        assert_eq!(decr(&db, "missing").await.unwrap(), 0);
        assert_eq!(get(&db, "missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn delete_if_eq_is_conditional() {
        let dir = tempdir().unwrap();
        let db = open_db(&dir).await;

        set(&db, "k", 3).await.unwrap();
        assert!(!delete_if_eq(&db, "k", 0).await.unwrap());
        assert_eq!(get(&db, "k").await.unwrap(), Some(3));
        assert!(delete_if_eq(&db, "k", 3).await.unwrap());
        assert_eq!(get(&db, "k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn concurrent_increments_are_exact() {
        let dir = tempdir().unwrap();
        let db = std::sync::Arc::new(open_db(&dir).await);

        let mut handles = Vec::new();
        for _ in 0..50 {
            let db = db.clone();
            handles.push(tokio::spawn(async move { incr(&db, "stress").await }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }
        assert_eq!(get(&db, "stress").await.unwrap(), Some(50));
    }
}
