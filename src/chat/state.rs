//! Chat request state machine

use crate::models::MessageId;
use thiserror::Error;

/// Whether the session has a request out to the assistant
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ChatState {
    #[default]
    Idle,
    /// `request` is the id of the user message awaiting its reply
    AwaitingResponse { request: MessageId },
}

/// Events that move the session between states
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEvent {
    /// A user message was accepted and dispatched
    Dispatched { request: MessageId },
    /// The assistant answered, or the call failed; either way the request is done
    Settled { request: MessageId },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidTransition {
    #[error("request {pending} is still awaiting a reply")]
    Busy { pending: MessageId },
    #[error("reply for {got} does not match pending request {expected:?}")]
    Stale {
        got: MessageId,
        expected: Option<MessageId>,
    },
}

impl ChatState {
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::AwaitingResponse { .. })
    }

    /// Next state for `event`, or why the event is not allowed now
    pub fn transition(&self, event: &ChatEvent) -> Result<ChatState, InvalidTransition> {
        match (self, event) {
            (Self::Idle, ChatEvent::Dispatched { request }) => Ok(Self::AwaitingResponse {
                request: request.clone(),
            }),
            (Self::AwaitingResponse { request: pending }, ChatEvent::Dispatched { .. }) => {
                Err(InvalidTransition::Busy {
                    pending: pending.clone(),
                })
            }
            (Self::AwaitingResponse { request: pending }, ChatEvent::Settled { request })
                if pending == request =>
            {
                Ok(Self::Idle)
            }
            (Self::AwaitingResponse { request: pending }, ChatEvent::Settled { request }) => {
                Err(InvalidTransition::Stale {
                    got: request.clone(),
                    expected: Some(pending.clone()),
                })
            }
            (Self::Idle, ChatEvent::Settled { request }) => Err(InvalidTransition::Stale {
                got: request.clone(),
                expected: None,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: u64) -> MessageId {
        MessageId::Local(n)
    }

    #[test]
    fn dispatch_then_settle_returns_to_idle() {
        let state = ChatState::Idle
            .transition(&ChatEvent::Dispatched { request: id(1) })
            .unwrap();
        assert!(state.is_busy());

        let state = state
            .transition(&ChatEvent::Settled { request: id(1) })
            .unwrap();
        assert_eq!(state, ChatState::Idle);
    }

    #[test]
    fn second_dispatch_is_refused() {
        let state = ChatState::AwaitingResponse { request: id(1) };
        assert_eq!(
            state.transition(&ChatEvent::Dispatched { request: id(2) }),
            Err(InvalidTransition::Busy { pending: id(1) })
        );
    }

    #[test]
    fn stray_settlements_are_refused() {
        assert!(matches!(
            ChatState::Idle.transition(&ChatEvent::Settled { request: id(1) }),
            Err(InvalidTransition::Stale { expected: None, .. })
        ));

        let state = ChatState::AwaitingResponse { request: id(2) };
        assert!(matches!(
            state.transition(&ChatEvent::Settled { request: id(1) }),
            Err(InvalidTransition::Stale { .. })
        ));
    }
}
