// SPDX-FileCopyrightText: 2026 Huddle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The message relay: validate, persist, then fan out.
//!
//! `relay` is the single entry point for inbound events; `dispatch` is the
//! single delivery point, shared between the local (no-bus) path and the
//! bus subscriber. Every failure past validation is logged and swallowed;
//! nothing propagates back to the transport layer.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use huddle_core::traits::{MessageStore, RelayBus};
use huddle_core::types::{CallStatus, ChatMessage};
use huddle_core::{HuddleError, RelayEvent, ServerEvent};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::calls::{self, CallPersistOutcome};
use crate::dedup::{fingerprint, DedupWindow};
use crate::notify::NotificationFanout;
use crate::presence::PresenceRegistry;

pub struct MessageRelay {
    presence: Arc<PresenceRegistry>,
    store: Arc<dyn MessageStore>,
    bus: Option<Arc<dyn RelayBus>>,
    dedup: DedupWindow,
    notify: NotificationFanout,
}

impl MessageRelay {
    pub fn new(
        presence: Arc<PresenceRegistry>,
        store: Arc<dyn MessageStore>,
        bus: Option<Arc<dyn RelayBus>>,
        dedup_ttl: Duration,
        dedup_capacity: usize,
    ) -> Self {
        let notify = NotificationFanout::new(Arc::clone(&presence), Arc::clone(&store));
        Self {
            presence,
            store,
            bus,
            dedup: DedupWindow::new(dedup_ttl, dedup_capacity),
            notify,
        }
    }

    /// Accepts one inbound event. Fire-and-forget: the caller learns nothing
    /// about validation, persistence, or delivery failures.
    pub async fn relay(&self, event: RelayEvent) {
        if let Err(reason) = event.validate() {
            warn!(kind = event.kind(), reason, "dropping malformed event");
            return;
        }

        if let RelayEvent::PrivateMessageSend {
            private_conversation_id,
            sender_id,
            content,
            ..
        } = &event
        {
            let fp = fingerprint(private_conversation_id, *sender_id, content);
            if self.dedup.check_and_record(&fp) {
                debug!(kind = event.kind(), "suppressing duplicate within dedup window");
                return;
            }
        }

        let event = enrich(event);

        match self.persist(&event).await {
            Ok(CallPersistOutcome::Applied) => {}
            Ok(CallPersistOutcome::DroppedTerminal) => {
                debug!(kind = event.kind(), "ignoring event against a terminal call");
                return;
            }
            // Durability lost, liveness kept: deliver the original payload.
            Err(e) => {
                warn!(error = %e, kind = event.kind(),
                      "persistence failed, continuing best-effort delivery");
            }
        }

        if let Some(bus) = &self.bus {
            if let Err(e) = bus.publish(&event).await {
                warn!(error = %e, kind = event.kind(), "bus publish failed, event lost");
            }
            return;
        }

        self.dispatch(&event).await;
    }

    /// Delivers an already-persisted event to local connections and runs
    /// notification fanout. Invoked directly in single-process mode and by
    /// the bus subscriber for events published anywhere.
    pub async fn dispatch(&self, event: &RelayEvent) {
        self.deliver(event);
        if !event.skips_notification() {
            self.notify.fan_out(event).await;
        }
    }

    async fn persist(&self, event: &RelayEvent) -> Result<CallPersistOutcome, HuddleError> {
        match event {
            RelayEvent::MessageSend { .. } | RelayEvent::PrivateMessageSend { .. } => {
                if let Some(msg) = chat_message_from(event) {
                    self.store.insert_message(&msg).await?;
                }
                Ok(CallPersistOutcome::Applied)
            }
            RelayEvent::CallSignal { .. } => Ok(CallPersistOutcome::Applied),
            _ => calls::apply(&self.store, event).await,
        }
    }

    fn deliver(&self, event: &RelayEvent) {
        match event {
            RelayEvent::MessageSend {
                sender_id,
                receiver_id,
                is_group_chat,
                ..
            } => {
                let Some(message) = chat_message_from(event) else {
                    return;
                };
                match (receiver_id, is_group_chat) {
                    (Some(receiver), false) => {
                        self.presence
                            .push_to(*receiver, ServerEvent::Message { message: message.clone() });
                        self.presence.push_to(
                            *sender_id,
                            ServerEvent::MessageAck {
                                message_id: message.id,
                                conversation_id: message.conversation_id,
                            },
                        );
                    }
                    // Group/project/public: every local connection gets it.
                    _ => self.presence.broadcast(&ServerEvent::Message { message }),
                }
            }

            RelayEvent::PrivateMessageSend {
                sender_id,
                receiver_id,
                ..
            } => {
                let Some(message) = chat_message_from(event) else {
                    return;
                };
                self.presence
                    .push_to(*receiver_id, ServerEvent::Message { message: message.clone() });
                self.presence.push_to(
                    *sender_id,
                    ServerEvent::MessageAck {
                        message_id: message.id,
                        conversation_id: message.conversation_id,
                    },
                );
            }

            RelayEvent::CallInvite {
                conversation_id,
                caller_id,
                callee_id,
                message_id,
            } => {
                self.presence.push_to(
                    *callee_id,
                    ServerEvent::CallInvite {
                        message_id: message_id.clone().unwrap_or_default(),
                        conversation_id: conversation_id.clone(),
                        caller_id: *caller_id,
                    },
                );
            }

            RelayEvent::CallAnswer {
                message_id,
                caller_id,
                accepted,
                ..
            } => {
                self.presence.push_to(
                    *caller_id,
                    ServerEvent::CallAnswer {
                        message_id: message_id.clone(),
                        accepted: *accepted,
                    },
                );
            }

            RelayEvent::CallSignal {
                sender_id,
                receiver_id,
                payload,
            } => {
                self.presence.push_to(
                    *receiver_id,
                    ServerEvent::CallSignal {
                        sender_id: *sender_id,
                        payload: payload.clone(),
                    },
                );
            }

            RelayEvent::CallEnd {
                message_id,
                caller_id,
                callee_id,
                duration_secs,
            } => {
                let ev = ServerEvent::CallEnd {
                    message_id: message_id.clone(),
                    duration_secs: *duration_secs,
                };
                self.presence.push_to(*caller_id, ev.clone());
                self.presence.push_to(*callee_id, ev);
            }

            RelayEvent::CallNoResponse {
                message_id,
                caller_id,
                callee_id,
            } => {
                let ev = ServerEvent::CallNoResponse {
                    message_id: message_id.clone(),
                };
                self.presence.push_to(*caller_id, ev.clone());
                self.presence.push_to(*callee_id, ev);
            }
        }
    }
}

/// Attaches a persisted identifier to events that create a message row.
/// Events arriving off the bus are already enriched and pass through.
fn enrich(mut event: RelayEvent) -> RelayEvent {
    match &mut event {
        RelayEvent::MessageSend { message_id, .. }
        | RelayEvent::PrivateMessageSend { message_id, .. }
        | RelayEvent::CallInvite { message_id, .. }
            if message_id.is_none() =>
        {
            *message_id = Some(Uuid::new_v4().to_string());
        }
        _ => {}
    }
    event
}

/// The message row an event persists, if it persists one.
pub(crate) fn chat_message_from(event: &RelayEvent) -> Option<ChatMessage> {
    let now = Utc::now().to_rfc3339();
    match event {
        RelayEvent::MessageSend {
            conversation_id,
            sender_id,
            receiver_id,
            content,
            content_type,
            project_id,
            task_id,
            is_group_chat,
            message_id,
        } => Some(ChatMessage {
            id: message_id.clone().unwrap_or_default(),
            conversation_id: conversation_id.clone(),
            sender_id: *sender_id,
            receiver_id: *receiver_id,
            content: content.clone(),
            content_type: content_type.clone(),
            project_id: project_id.clone(),
            task_id: task_id.clone(),
            is_group_chat: *is_group_chat,
            call_status: None,
            call_duration_secs: None,
            created_at: now,
        }),
        RelayEvent::PrivateMessageSend {
            private_conversation_id,
            sender_id,
            receiver_id,
            content,
            content_type,
            message_id,
        } => Some(ChatMessage {
            id: message_id.clone().unwrap_or_default(),
            conversation_id: private_conversation_id.clone(),
            sender_id: *sender_id,
            receiver_id: Some(*receiver_id),
            content: content.clone(),
            content_type: content_type.clone(),
            project_id: None,
            task_id: None,
            is_group_chat: false,
            call_status: None,
            call_duration_secs: None,
            created_at: now,
        }),
        RelayEvent::CallInvite {
            conversation_id,
            caller_id,
            callee_id,
            message_id,
        } => Some(ChatMessage {
            id: message_id.clone().unwrap_or_default(),
            conversation_id: conversation_id.clone(),
            sender_id: *caller_id,
            receiver_id: Some(*callee_id),
            content: "Call".to_owned(),
            content_type: "call".to_owned(),
            project_id: None,
            task_id: None,
            is_group_chat: false,
            call_status: Some(CallStatus::Ringing),
            call_duration_secs: None,
            created_at: now,
        }),
        _ => None,
    }
}
