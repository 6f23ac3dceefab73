// SPDX-FileCopyrightText: 2026 Huddle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Secondary notification fanout, invoked after delivery.
//!
//! Best-effort: recipients without a local connection are skipped, storage
//! errors during recipient resolution are logged and shrink the set to
//! nothing. There is no queue and no retry.

use std::sync::Arc;

use huddle_core::traits::MessageStore;
use huddle_core::types::UserId;
use huddle_core::{Notification, NotificationPriority, RelayEvent, ServerEvent};
use tracing::warn;

use crate::presence::PresenceRegistry;

const BODY_PREVIEW_MAX: usize = 120;

pub struct NotificationFanout {
    presence: Arc<PresenceRegistry>,
    store: Arc<dyn MessageStore>,
}

impl NotificationFanout {
    pub fn new(presence: Arc<PresenceRegistry>, store: Arc<dyn MessageStore>) -> Self {
        Self { presence, store }
    }

    /// Emits a notification to every computed recipient with a connection
    /// registered on this process.
    pub async fn fan_out(&self, event: &RelayEvent) {
        let Some(notification) = payload(event) else {
            return;
        };
        for recipient in self.recipients(event).await {
            self.presence
                .push_to(recipient, ServerEvent::Notification(notification.clone()));
        }
    }

    async fn recipients(&self, event: &RelayEvent) -> Vec<UserId> {
        let sender = event.sender();
        match event {
            RelayEvent::MessageSend {
                receiver_id: Some(receiver),
                is_group_chat: false,
                ..
            } => vec![*receiver],

            RelayEvent::MessageSend {
                project_id: Some(project),
                ..
            } => match self.store.project_members(project).await {
                Ok(members) => members.into_iter().filter(|m| *m != sender).collect(),
                Err(e) => {
                    warn!(error = %e, project_id = %project.0,
                          "member lookup failed, skipping notification fanout");
                    Vec::new()
                }
            },

            // Public broadcast: everyone connected here except the sender.
            RelayEvent::MessageSend { .. } => self
                .presence
                .registered_users()
                .into_iter()
                .filter(|u| *u != sender)
                .collect(),

            RelayEvent::PrivateMessageSend { receiver_id, .. } => vec![*receiver_id],
            RelayEvent::CallInvite { callee_id, .. } => vec![*callee_id],
            RelayEvent::CallAnswer { caller_id, .. } => vec![*caller_id],
            RelayEvent::CallEnd {
                caller_id,
                callee_id,
                ..
            } => [*caller_id, *callee_id]
                .into_iter()
                .filter(|u| *u != sender)
                .collect(),
            RelayEvent::CallNoResponse { callee_id, .. } => vec![*callee_id],
            RelayEvent::CallSignal { .. } => Vec::new(),
        }
    }
}

fn preview(content: &str) -> String {
    if content.len() <= BODY_PREVIEW_MAX {
        content.to_owned()
    } else {
        let mut cut = BODY_PREVIEW_MAX;
        while !content.is_char_boundary(cut) {
            cut -= 1;
        }
        content[..cut].to_owned()
    }
}

/// Notification metadata per event kind. `None` for kinds that never notify.
fn payload(event: &RelayEvent) -> Option<Notification> {
    match event {
        RelayEvent::MessageSend {
            content,
            is_group_chat,
            ..
        } => Some(Notification {
            title: "New message".to_owned(),
            body: preview(content),
            priority: if *is_group_chat {
                NotificationPriority::Low
            } else {
                NotificationPriority::Normal
            },
        }),
        RelayEvent::PrivateMessageSend { content, .. } => Some(Notification {
            title: "New message".to_owned(),
            body: preview(content),
            priority: NotificationPriority::Normal,
        }),
        RelayEvent::CallInvite { .. } => Some(Notification {
            title: "Incoming call".to_owned(),
            body: String::new(),
            priority: NotificationPriority::High,
        }),
        RelayEvent::CallAnswer { accepted, .. } => Some(Notification {
            title: if *accepted {
                "Call answered".to_owned()
            } else {
                "Call declined".to_owned()
            },
            body: String::new(),
            priority: NotificationPriority::High,
        }),
        RelayEvent::CallEnd { .. } => Some(Notification {
            title: "Call ended".to_owned(),
            body: String::new(),
            priority: NotificationPriority::High,
        }),
        RelayEvent::CallNoResponse { .. } => Some(Notification {
            title: "Missed call".to_owned(),
            body: String::new(),
            priority: NotificationPriority::High,
        }),
        RelayEvent::CallSignal { .. } => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn call_signal_has_no_payload() {
        let ev = RelayEvent::CallSignal {
            sender_id: UserId(1),
            receiver_id: UserId(2),
            payload: serde_json::json!({"ice": []}),
        };
        assert!(payload(&ev).is_none());
    }

    #[test]
    fn group_messages_are_low_priority() {
        let ev = RelayEvent::MessageSend {
            conversation_id: "c1".into(),
            sender_id: UserId(1),
            receiver_id: None,
            content: "standup in 5".into(),
            content_type: "text".into(),
            project_id: None,
            task_id: None,
            is_group_chat: true,
            message_id: None,
        };
        let n = payload(&ev).unwrap();
        assert_eq!(n.priority, NotificationPriority::Low);
        assert_eq!(n.body, "standup in 5");
    }

    #[test]
    fn preview_truncates_on_char_boundary() {
        let long = "é".repeat(200);
        let p = preview(&long);
        assert!(p.len() <= BODY_PREVIEW_MAX);
        assert!(long.starts_with(&p));
    }
}
