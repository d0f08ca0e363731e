//! Conversation with the property assistant.
//!
//! A [`ChatSession`] owns the ordered message history for one session
//! identity and allows a single outstanding request at a time. Every accepted
//! send appends the user message immediately and exactly one bot message when
//! the request settles, whether the assistant answered or the call failed.
//! Transport failures never escape `send`; they become an error message in
//! the history.

use super::state::{ChatEvent, ChatState};
use super::{EMPTY_REPLY_TEXT, ERROR_REPLY_TEXT, MAX_MESSAGE_LENGTH};
use crate::api::{ApiResult, ChatApi, ChatReply};
use crate::error::TransportError;
use crate::models::{Message, MessageId, Property};
use chrono::Utc;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Why a send was not dispatched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Nothing left after trimming
    Blank,
    /// Longer than [`MAX_MESSAGE_LENGTH`] characters
    TooLong,
    /// A previous send has not settled yet
    Busy,
}

/// What happened to one call to [`ChatSession::send`]
#[derive(Debug, Clone, PartialEq)]
pub enum SendOutcome {
    Rejected(RejectReason),
    Replied {
        properties: Vec<Property>,
        suggestions: Vec<String>,
    },
    /// The assistant call failed; an error message was appended
    Failed,
}

#[derive(Debug, Default)]
struct Inner {
    state: ChatState,
    history: Vec<Message>,
    last_id: u64,
    subscribers: Vec<mpsc::UnboundedSender<Vec<Property>>>,
}

impl Inner {
    /// Millisecond clock, bumped so ids never repeat or go backwards
    fn mint_id(&mut self) -> MessageId {
        let now = u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0);
        self.last_id = now.max(self.last_id + 1);
        MessageId::Local(self.last_id)
    }

    fn publish(&mut self, found: &[Property]) {
        self.subscribers
            .retain(|tx| tx.send(found.to_vec()).is_ok());
    }
}

pub struct ChatSession {
    api: Arc<dyn ChatApi>,
    session_id: String,
    inner: Arc<Mutex<Inner>>,
}

fn lock(inner: &Mutex<Inner>) -> MutexGuard<'_, Inner> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

impl ChatSession {
    /// Session with empty history; see [`ChatSession::start`] to load stored history
    pub fn new(api: Arc<dyn ChatApi>, session_id: impl Into<String>) -> Self {
        Self {
            api,
            session_id: session_id.into(),
            inner: Arc::new(Mutex::new(Inner::default())),
        }
    }

    /// Create a session and hydrate it from the stored history. A failed
    /// fetch leaves the history empty.
    pub async fn start(api: Arc<dyn ChatApi>, session_id: impl Into<String>) -> Self {
        let session = Self::new(api, session_id);
        session.hydrate().await;
        session
    }

    async fn hydrate(&self) {
        let stored = match self.api.chat_history(&self.session_id).await {
            Ok(history) => history.messages,
            Err(e) => {
                warn!(session = %self.session_id, "Could not load chat history: {}", e);
                return;
            }
        };

        let loaded_at = Utc::now();
        let messages: Vec<Message> = stored
            .into_iter()
            .map(|m| m.into_message(loaded_at))
            .collect();
        info!(session = %self.session_id, "Loaded {} messages from history", messages.len());

        lock(&self.inner).history = messages;
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Snapshot of the history, oldest first
    pub fn history(&self) -> Vec<Message> {
        lock(&self.inner).history.clone()
    }

    pub fn len(&self) -> usize {
        lock(&self.inner).history.len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.inner).history.is_empty()
    }

    pub fn state(&self) -> ChatState {
        lock(&self.inner).state.clone()
    }

    pub fn is_busy(&self) -> bool {
        lock(&self.inner).state.is_busy()
    }

    /// Receive every non-empty property list the assistant returns
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<Vec<Property>> {
        let (tx, rx) = mpsc::unbounded_channel();
        lock(&self.inner).subscribers.push(tx);
        rx
    }

    /// Send `text` to the assistant.
    ///
    /// The request runs on its own task, so the reply is recorded even if the
    /// returned future is dropped before it resolves. Must be called from
    /// within a tokio runtime.
    pub async fn send(&self, text: &str) -> SendOutcome {
        let text = text.trim();
        if text.is_empty() {
            return SendOutcome::Rejected(RejectReason::Blank);
        }
        if text.chars().count() > MAX_MESSAGE_LENGTH {
            return SendOutcome::Rejected(RejectReason::TooLong);
        }

        let request = {
            let mut inner = lock(&self.inner);
            let request = inner.mint_id();
            match inner.state.transition(&ChatEvent::Dispatched {
                request: request.clone(),
            }) {
                Ok(next) => inner.state = next,
                Err(e) => {
                    debug!("Send rejected: {}", e);
                    return SendOutcome::Rejected(RejectReason::Busy);
                }
            }
            inner.history.push(Message::user(request.clone(), text));
            request
        };
        debug!(%request, "Dispatching chat message");

        let api = Arc::clone(&self.api);
        let inner = Arc::clone(&self.inner);
        let session_id = self.session_id.clone();
        let owned_text = text.to_string();
        let pending = request.clone();
        let task = tokio::spawn(async move {
            let call = AssertUnwindSafe(api.send_chat_message(&owned_text, &session_id));
            let result = match call.catch_unwind().await {
                Ok(result) => result,
                Err(_) => {
                    warn!(request = %pending, "Chat transport panicked");
                    Err(TransportError::network("chat request aborted"))
                }
            };
            settle(&inner, &pending, result)
        });

        match task.await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(%request, "Chat request task ended abnormally: {}", e);
                settle(
                    &self.inner,
                    &request,
                    Err(TransportError::network(e.to_string())),
                )
            }
        }
    }

    /// Empty the history, locally and on the service. A failed remote clear is
    /// logged; the local history is emptied regardless.
    pub async fn clear(&self) {
        let dropped = {
            let mut inner = lock(&self.inner);
            let n = inner.history.len();
            inner.history.clear();
            n
        };
        info!(session = %self.session_id, "Cleared {} messages", dropped);

        match self.api.clear_chat_history(&self.session_id).await {
            Ok(receipt) if receipt.success => debug!("Remote history cleared"),
            Ok(receipt) => warn!("Remote history not cleared: {}", receipt.message),
            Err(e) => warn!("Failed to clear remote history: {}", e),
        }
    }
}

/// Record the result of request `request` and return the session to idle
fn settle(inner: &Mutex<Inner>, request: &MessageId, result: ApiResult<ChatReply>) -> SendOutcome {
    let mut inner = lock(inner);
    match inner.state.transition(&ChatEvent::Settled {
        request: request.clone(),
    }) {
        Ok(next) => inner.state = next,
        Err(e) => {
            warn!("Ignoring settlement: {}", e);
            return SendOutcome::Failed;
        }
    }

    let id = inner.mint_id();
    match result {
        Ok(reply) => {
            let text = if reply.text.trim().is_empty() {
                EMPTY_REPLY_TEXT.to_string()
            } else {
                reply.text
            };
            info!(%request, properties = reply.properties.len(), "Assistant replied");
            inner
                .history
                .push(Message::bot(id, text, reply.properties.clone()));
            if !reply.properties.is_empty() {
                inner.publish(&reply.properties);
            }
            SendOutcome::Replied {
                properties: reply.properties,
                suggestions: reply.suggestions,
            }
        }
        Err(e) => {
            warn!(%request, "Assistant call failed: {}", e);
            inner.history.push(Message::error(id, ERROR_REPLY_TEXT));
            SendOutcome::Failed
        }
    }
}
