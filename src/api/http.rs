use crate::api::traits::{ApiResult, ChatApi, PropertyApi};
use crate::api::types::{
    ChatHistory, ChatReply, ChatRequest, ClearReceipt, CompareRequest, PriceEstimate,
    PropertyFilter, PropertyList, SaveReceipt, SaveRequest,
};
use crate::config::ClientConfig;
use crate::error::TransportError;
use crate::models::{ComparisonPair, PropertyId};
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

/// REST client for the property search service
pub struct HttpBackend {
    client: Client,
    base_url: Url,
}

impl HttpBackend {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("housing-chat/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        let base_url = Url::parse(&config.base_url)
            .with_context(|| format!("Invalid service URL {:?}", config.base_url))?;
        if base_url.cannot_be_a_base() {
            bail!("Service URL {:?} cannot take a path", config.base_url);
        }

        Ok(Self { client, base_url })
    }

    /// Append path segments to the base URL, escaping each one
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Send, check status, decode JSON
    async fn call<T: DeserializeOwned>(&self, what: &str, request: RequestBuilder) -> ApiResult<T> {
        let response = request.send().await.map_err(|e| {
            warn!("{} request failed: {}", what, e);
            TransportError::from(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("{} returned status {}", what, status);
            return Err(TransportError::status(
                status.as_u16(),
                format!("{} returned {}: {}", what, status, body.trim()),
            ));
        }

        let bytes = response.bytes().await.map_err(TransportError::from)?;
        debug!("{} returned {} bytes", what, bytes.len());
        serde_json::from_slice(&bytes)
            .map_err(|e| TransportError::decode(format!("{} response: {}", what, e)))
    }
}

#[async_trait]
impl PropertyApi for HttpBackend {
    async fn list_properties(&self) -> ApiResult<PropertyList> {
        let request = self.client.get(self.url(&["api", "properties"]));
        self.call("list properties", request).await
    }

    async fn search_properties(&self, filter: &PropertyFilter) -> ApiResult<PropertyList> {
        let request = self
            .client
            .post(self.url(&["api", "properties", "search"]))
            .json(filter);
        self.call("search properties", request).await
    }

    async fn save_property(&self, id: PropertyId, session_id: &str) -> ApiResult<SaveReceipt> {
        let request = self
            .client
            .post(self.url(&["api", "properties", "save"]))
            .json(&SaveRequest {
                property_id: id,
                user_id: session_id,
            });
        self.call("save property", request).await
    }

    async fn list_saved(&self, session_id: &str) -> ApiResult<PropertyList> {
        let request = self
            .client
            .get(self.url(&["api", "properties", "saved", session_id]));
        self.call("list saved", request).await
    }

    async fn compare_properties(&self, a: PropertyId, b: PropertyId) -> ApiResult<ComparisonPair> {
        let request = self
            .client
            .post(self.url(&["api", "properties", "compare"]))
            .json(&CompareRequest {
                property_ids: [a, b],
            });
        self.call("compare properties", request).await
    }

    async fn predict_price(&self, id: PropertyId) -> ApiResult<PriceEstimate> {
        let request = self
            .client
            .post(self.url(&["api", "properties", id.to_string().as_str(), "predict"]));
        self.call("predict price", request).await
    }
}

#[async_trait]
impl ChatApi for HttpBackend {
    async fn send_chat_message(&self, text: &str, session_id: &str) -> ApiResult<ChatReply> {
        let request = self.client.post(self.url(&["api", "chat"])).json(&ChatRequest {
            message: text,
            user_id: session_id,
        });
        self.call("chat", request).await
    }

    async fn chat_history(&self, session_id: &str) -> ApiResult<ChatHistory> {
        let request = self
            .client
            .get(self.url(&["api", "chat", "history", session_id]));
        self.call("chat history", request).await
    }

    async fn clear_chat_history(&self, session_id: &str) -> ApiResult<ClearReceipt> {
        let request = self
            .client
            .delete(self.url(&["api", "chat", "history", session_id]));
        self.call("clear chat history", request).await
    }
}
