//! Scripted backend for tests
//!
//! Every operation pops the next queued result; an empty queue answers with a
//! network failure.

use super::traits::{ApiResult, ChatApi, PropertyApi};
use super::types::{
    ChatHistory, ChatReply, ClearReceipt, PriceEstimate, PropertyFilter, PropertyList, SaveReceipt,
};
use crate::error::TransportError;
use crate::models::{ComparisonPair, PropertyId};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use tokio::sync::{oneshot, Notify};

/// One recorded call against the mock
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    List,
    Search(PropertyFilter),
    Save(PropertyId, String),
    Saved(String),
    Compare(PropertyId, PropertyId),
    Predict(PropertyId),
    Chat(String, String),
    History(String),
    Clear(String),
}

type Queue<T> = Mutex<VecDeque<ApiResult<T>>>;

#[derive(Default)]
pub struct MockBackend {
    lists: Queue<PropertyList>,
    saves: Queue<SaveReceipt>,
    compares: Queue<ComparisonPair>,
    predictions: Queue<PriceEstimate>,
    replies: Queue<ChatReply>,
    histories: Queue<ChatHistory>,
    clears: Queue<ClearReceipt>,
    calls: Mutex<Vec<Call>>,
    chat_gate: Mutex<Option<oneshot::Receiver<()>>>,
    chat_started: Notify,
    chat_panics: AtomicBool,
}

fn next<T>(queue: &Queue<T>) -> ApiResult<T> {
    queue
        .lock()
        .unwrap()
        .pop_front()
        .unwrap_or_else(|| Err(TransportError::network("No mock response queued")))
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a result for list, search and saved calls (they share one queue)
    pub fn queue_list(&self, result: ApiResult<PropertyList>) {
        self.lists.lock().unwrap().push_back(result);
    }

    pub fn queue_save(&self, result: ApiResult<SaveReceipt>) {
        self.saves.lock().unwrap().push_back(result);
    }

    pub fn queue_compare(&self, result: ApiResult<ComparisonPair>) {
        self.compares.lock().unwrap().push_back(result);
    }

    pub fn queue_prediction(&self, result: ApiResult<PriceEstimate>) {
        self.predictions.lock().unwrap().push_back(result);
    }

    pub fn queue_reply(&self, result: ApiResult<ChatReply>) {
        self.replies.lock().unwrap().push_back(result);
    }

    pub fn queue_history(&self, result: ApiResult<ChatHistory>) {
        self.histories.lock().unwrap().push_back(result);
    }

    pub fn queue_clear(&self, result: ApiResult<ClearReceipt>) {
        self.clears.lock().unwrap().push_back(result);
    }

    /// Hold the next chat reply until the returned sender fires (or is dropped)
    pub fn hold_next_chat(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.chat_gate.lock().unwrap() = Some(rx);
        tx
    }

    /// Make the next chat call panic once it passes the gate
    pub fn panic_next_chat(&self) {
        self.chat_panics.store(true, Ordering::SeqCst);
    }

    /// Resolves once a chat call has reached the mock
    pub async fn chat_started(&self) {
        self.chat_started.notified().await;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl PropertyApi for MockBackend {
    async fn list_properties(&self) -> ApiResult<PropertyList> {
        self.record(Call::List);
        next(&self.lists)
    }

    async fn search_properties(&self, filter: &PropertyFilter) -> ApiResult<PropertyList> {
        self.record(Call::Search(filter.clone()));
        next(&self.lists)
    }

    async fn save_property(&self, id: PropertyId, session_id: &str) -> ApiResult<SaveReceipt> {
        self.record(Call::Save(id, session_id.to_string()));
        next(&self.saves)
    }

    async fn list_saved(&self, session_id: &str) -> ApiResult<PropertyList> {
        self.record(Call::Saved(session_id.to_string()));
        next(&self.lists)
    }

    async fn compare_properties(&self, a: PropertyId, b: PropertyId) -> ApiResult<ComparisonPair> {
        self.record(Call::Compare(a, b));
        next(&self.compares)
    }

    async fn predict_price(&self, id: PropertyId) -> ApiResult<PriceEstimate> {
        self.record(Call::Predict(id));
        next(&self.predictions)
    }
}

#[async_trait]
impl ChatApi for MockBackend {
    async fn send_chat_message(&self, text: &str, session_id: &str) -> ApiResult<ChatReply> {
        self.record(Call::Chat(text.to_string(), session_id.to_string()));
        self.chat_started.notify_one();

        let gate = self.chat_gate.lock().unwrap().take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        if self.chat_panics.swap(false, Ordering::SeqCst) {
            panic!("chat transport blew up");
        }
        next(&self.replies)
    }

    async fn chat_history(&self, session_id: &str) -> ApiResult<ChatHistory> {
        self.record(Call::History(session_id.to_string()));
        next(&self.histories)
    }

    async fn clear_chat_history(&self, session_id: &str) -> ApiResult<ClearReceipt> {
        self.record(Call::Clear(session_id.to_string()));
        next(&self.clears)
    }
}
