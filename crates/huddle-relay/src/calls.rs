// SPDX-FileCopyrightText: 2026 Huddle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Call signaling transitions persisted onto the call's message row.
//!
//! RINGING moves to PROCESSING or REJECTED on answer, ENDED on hangup,
//! NO_RESPONSE on a caller-reported ring timeout. Terminal states absorb
//! every later event. Duration and no-response are client-reported; there
//! is no server-side timer.

use std::sync::Arc;

use huddle_core::traits::MessageStore;
use huddle_core::types::CallStatus;
use huddle_core::{HuddleError, RelayEvent};

use crate::relay::chat_message_from;

/// Result of persisting a call event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallPersistOutcome {
    /// Transition recorded (or no call row was involved).
    Applied,
    /// The call is already terminal; the event must not be delivered.
    DroppedTerminal,
}

/// The status a call event drives toward, given the currently recorded one.
/// `None` means no transition: either the event kind carries none or the
/// call is already terminal.
pub(crate) fn next_status(current: Option<CallStatus>, event: &RelayEvent) -> Option<CallStatus> {
    if current.is_some_and(CallStatus::is_terminal) {
        return None;
    }
    match event {
        RelayEvent::CallAnswer { accepted: true, .. } => Some(CallStatus::Processing),
        RelayEvent::CallAnswer {
            accepted: false, ..
        } => Some(CallStatus::Rejected),
        RelayEvent::CallEnd { .. } => Some(CallStatus::Ended),
        RelayEvent::CallNoResponse { .. } => Some(CallStatus::NoResponse),
        _ => None,
    }
}

/// Persists the state machine effect of one call event.
pub(crate) async fn apply(
    store: &Arc<dyn MessageStore>,
    event: &RelayEvent,
) -> Result<CallPersistOutcome, HuddleError> {
    match event {
        RelayEvent::CallInvite { .. } => {
            // New call: one message row in RINGING state.
            if let Some(msg) = chat_message_from(event) {
                store.insert_message(&msg).await?;
            }
            Ok(CallPersistOutcome::Applied)
        }
        RelayEvent::CallAnswer { message_id, .. }
        | RelayEvent::CallNoResponse { message_id, .. } => {
            let current = store.call_status(message_id).await?;
            match next_status(current, event) {
                Some(status) => {
                    store.update_call_status(message_id, status, None).await?;
                    Ok(CallPersistOutcome::Applied)
                }
                None => Ok(CallPersistOutcome::DroppedTerminal),
            }
        }
        RelayEvent::CallEnd {
            message_id,
            duration_secs,
            ..
        } => {
            let current = store.call_status(message_id).await?;
            match next_status(current, event) {
                Some(status) => {
                    store
                        .update_call_status(message_id, status, *duration_secs)
                        .await?;
                    Ok(CallPersistOutcome::Applied)
                }
                None => Ok(CallPersistOutcome::DroppedTerminal),
            }
        }
        // Signals are transient and never touch storage.
        _ => Ok(CallPersistOutcome::Applied),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use huddle_core::UserId;

    fn answer(accepted: bool) -> RelayEvent {
        RelayEvent::CallAnswer {
            message_id: "m1".into(),
            caller_id: UserId(1),
            callee_id: UserId(2),
            accepted,
        }
    }

    fn end() -> RelayEvent {
        RelayEvent::CallEnd {
            message_id: "m1".into(),
            caller_id: UserId(1),
            callee_id: UserId(2),
            duration_secs: Some(30),
        }
    }

    fn no_response() -> RelayEvent {
        RelayEvent::CallNoResponse {
            message_id: "m1".into(),
            caller_id: UserId(1),
            callee_id: UserId(2),
        }
    }

    #[test]
    fn ringing_branches_on_answer() {
        assert_eq!(
            next_status(Some(CallStatus::Ringing), &answer(true)),
            Some(CallStatus::Processing)
        );
        assert_eq!(
            next_status(Some(CallStatus::Ringing), &answer(false)),
            Some(CallStatus::Rejected)
        );
        assert_eq!(
            next_status(Some(CallStatus::Ringing), &no_response()),
            Some(CallStatus::NoResponse)
        );
    }

    #[test]
    fn active_call_can_end() {
        assert_eq!(
            next_status(Some(CallStatus::Processing), &end()),
            Some(CallStatus::Ended)
        );
    }

    #[test]
    fn terminal_states_absorb_everything() {
        for terminal in [
            CallStatus::Ended,
            CallStatus::Rejected,
            CallStatus::NoResponse,
        ] {
            assert_eq!(next_status(Some(terminal), &answer(true)), None);
            assert_eq!(next_status(Some(terminal), &end()), None);
            assert_eq!(next_status(Some(terminal), &no_response()), None);
        }
    }

    #[test]
    fn unknown_call_still_transitions() {
        // The row may not exist yet; the update is then a no-op downstream.
        assert_eq!(next_status(None, &end()), Some(CallStatus::Ended));
    }
}
