// SPDX-FileCopyrightText: 2026 Huddle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-process project room membership.
//!
//! Rooms only scope presence-change broadcasts; they are ephemeral and
//! rebuilt from client joins after a restart.

use std::collections::HashSet;

use dashmap::DashMap;
use huddle_core::types::{ProjectId, UserId};

#[derive(Default)]
pub struct RoomDirectory {
    rooms: DashMap<ProjectId, HashSet<UserId>>,
}

impl RoomDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn join(&self, project: &ProjectId, user: UserId) {
        self.rooms.entry(project.clone()).or_default().insert(user);
    }

    pub fn leave(&self, project: &ProjectId, user: UserId) {
        if let Some(mut members) = self.rooms.get_mut(project) {
            members.remove(&user);
        }
        self.rooms.remove_if(project, |_, members| members.is_empty());
    }

    /// Current members of a room, empty if the room does not exist.
    pub fn members(&self, project: &ProjectId) -> Vec<UserId> {
        self.rooms
            .get(project)
            .map(|m| m.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Drops the user from every room; returns the rooms they were in.
    pub fn remove_from_all(&self, user: UserId) -> Vec<ProjectId> {
        let mut left = Vec::new();
        for mut entry in self.rooms.iter_mut() {
            if entry.value_mut().remove(&user) {
                left.push(entry.key().clone());
            }
        }
        self.rooms.retain(|_, members| !members.is_empty());
        left
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_leave_round_trip() {
        let rooms = RoomDirectory::new();
        let p = ProjectId("p1".to_owned());

        rooms.join(&p, UserId(1));
        rooms.join(&p, UserId(2));
        assert_eq!(rooms.members(&p).len(), 2);

        rooms.leave(&p, UserId(1));
        assert_eq!(rooms.members(&p), vec![UserId(2)]);
    }

    #[test]
    fn disconnect_clears_all_memberships() {
        let rooms = RoomDirectory::new();
        let p1 = ProjectId("p1".to_owned());
        let p2 = ProjectId("p2".to_owned());
        rooms.join(&p1, UserId(1));
        rooms.join(&p2, UserId(1));
        rooms.join(&p2, UserId(2));

        let mut left = rooms.remove_from_all(UserId(1));
        left.sort_by(|a, b| a.0.cmp(&b.0));
        assert_eq!(left, vec![p1.clone(), p2.clone()]);
        assert!(rooms.members(&p1).is_empty());
        assert_eq!(rooms.members(&p2), vec![UserId(2)]);
    }
}
