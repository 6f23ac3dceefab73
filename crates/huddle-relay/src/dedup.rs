// SPDX-FileCopyrightText: 2026 Huddle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fixed-capacity deduplication window.
//!
//! Fingerprints expire after a short TTL and are swept on access when the
//! map is full. At capacity with no expired entries, new fingerprints are
//! not recorded; the window degrades to letting duplicates through rather
//! than growing without bound.

use std::time::{Duration, Instant};

use dashmap::DashMap;
use huddle_core::types::UserId;
use sha2::{Digest, Sha256};
use tracing::debug;

/// Short-lived fingerprint of (conversation, sender, content).
pub fn fingerprint(conversation_id: &str, sender_id: UserId, content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(conversation_id.as_bytes());
    hasher.update(b"\x1f");
    hasher.update(sender_id.0.to_le_bytes());
    hasher.update(b"\x1f");
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

pub struct DedupWindow {
    entries: DashMap<String, Instant>,
    ttl: Duration,
    capacity: usize,
}

impl DedupWindow {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
            capacity: capacity.max(1),
        }
    }

    /// Records the fingerprint and reports whether it was already seen
    /// within the window.
    pub fn check_and_record(&self, fp: &str) -> bool {
        let now = Instant::now();
        if let Some(seen) = self.entries.get(fp) {
            if now.duration_since(*seen) < self.ttl {
                return true;
            }
        }
        if self.entries.len() >= self.capacity {
            self.sweep(now);
        }
        if self.entries.len() < self.capacity {
            self.entries.insert(fp.to_owned(), now);
        } else {
            debug!("dedup window full, fingerprint not recorded");
        }
        false
    }

    fn sweep(&self, now: Instant) {
        self.entries
            .retain(|_, seen| now.duration_since(*seen) < self.ttl);
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_within_window_is_flagged() {
        let window = DedupWindow::new(Duration::from_secs(5), 16);
        let fp = fingerprint("c1", UserId(1), "hi");

        assert!(!window.check_and_record(&fp));
        assert!(window.check_and_record(&fp));
    }

    #[test]
    fn expired_fingerprint_is_accepted_again() {
        let window = DedupWindow::new(Duration::from_millis(10), 16);
        let fp = fingerprint("c1", UserId(1), "hi");

        assert!(!window.check_and_record(&fp));
        std::thread::sleep(Duration::from_millis(20));
        assert!(!window.check_and_record(&fp));
    }

    #[test]
    fn distinct_content_produces_distinct_fingerprints() {
        assert_ne!(
            fingerprint("c1", UserId(1), "hi"),
            fingerprint("c1", UserId(1), "hi!")
        );
        assert_ne!(
            fingerprint("c1", UserId(1), "hi"),
            fingerprint("c1", UserId(2), "hi")
        );
        assert_ne!(
            fingerprint("c1", UserId(1), "hi"),
            fingerprint("c2", UserId(1), "hi")
        );
    }

    #[test]
    fn capacity_bounds_the_window() {
        let window = DedupWindow::new(Duration::from_secs(60), 4);
        for i in 0..10 {
            window.check_and_record(&fingerprint("c1", UserId(i), "x"));
        }
        assert!(window.len() <= 4);
    }

    #[test]
    fn sweep_frees_room_for_fresh_fingerprints() {
        let window = DedupWindow::new(Duration::from_millis(10), 2);
        window.check_and_record(&fingerprint("c1", UserId(1), "a"));
        window.check_and_record(&fingerprint("c1", UserId(2), "b"));
        std::thread::sleep(Duration::from_millis(20));

        let fp = fingerprint("c1", UserId(3), "c");
        assert!(!window.check_and_record(&fp));
        assert!(window.check_and_record(&fp));
    }
}
