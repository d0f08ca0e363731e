use crate::api::types::{
    ChatHistory, ChatReply, ClearReceipt, PriceEstimate, PropertyFilter, PropertyList, SaveReceipt,
};
use crate::error::TransportError;
use crate::models::{ComparisonPair, PropertyId};
use async_trait::async_trait;

pub type ApiResult<T> = Result<T, TransportError>;

/// Listing side of the search service
#[async_trait]
pub trait PropertyApi: Send + Sync {
    async fn list_properties(&self) -> ApiResult<PropertyList>;

    async fn search_properties(&self, filter: &PropertyFilter) -> ApiResult<PropertyList>;

    async fn save_property(&self, id: PropertyId, session_id: &str) -> ApiResult<SaveReceipt>;

    async fn list_saved(&self, session_id: &str) -> ApiResult<PropertyList>;

    /// Fetch both records, each with a prediction attached by the service
    async fn compare_properties(&self, a: PropertyId, b: PropertyId) -> ApiResult<ComparisonPair>;

    async fn predict_price(&self, id: PropertyId) -> ApiResult<PriceEstimate>;
}

/// Conversational side of the search service
#[async_trait]
pub trait ChatApi: Send + Sync {
    async fn send_chat_message(&self, text: &str, session_id: &str) -> ApiResult<ChatReply>;

    async fn chat_history(&self, session_id: &str) -> ApiResult<ChatHistory>;

    async fn clear_chat_history(&self, session_id: &str) -> ApiResult<ClearReceipt>;
}
