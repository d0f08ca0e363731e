use crate::models::{Message, MessageId, Property, PropertyId, Role};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Search parameters for the property search endpoint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyFilter {
    /// City or neighbourhood substring
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_price: Option<f64>,
    /// Minimum number of bedrooms
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bedrooms: Option<u32>,
    /// Minimum number of bathrooms
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bathrooms: Option<u32>,
    /// Minimum size, in the service's area unit
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_size: Option<f64>,
    /// Amenities every match must have
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amenities: Option<Vec<String>>,
}

impl PropertyFilter {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// `{properties, count}` envelope used by list, search and saved routes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyList {
    #[serde(default)]
    pub properties: Vec<Property>,
    #[serde(default)]
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct SaveRequest<'a> {
    pub property_id: PropertyId,
    pub user_id: &'a str,
}

/// Result of saving a listing to the session's favourites
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveReceipt {
    pub message: String,
    #[serde(rename = "saved_properties", default)]
    pub saved_ids: Vec<PropertyId>,
    /// Backing store the service used; informational only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage: Option<String>,
}

impl SaveReceipt {
    pub const SAVED: &'static str = "Property saved";

    pub fn is_saved(&self) -> bool {
        self.message == Self::SAVED
    }
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct CompareRequest {
    pub property_ids: [PropertyId; 2],
}

/// Response of the predict route
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceEstimate {
    #[serde(default)]
    pub property_id: Option<PropertyId>,
    pub predicted_price: f64,
    #[serde(default)]
    pub listed_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_input: Option<serde_json::Value>,
}

impl From<PriceEstimate> for crate::models::Prediction {
    fn from(estimate: PriceEstimate) -> Self {
        Self {
            predicted_price: estimate.predicted_price,
            listed_price: estimate.listed_price,
            model_input: estimate.model_input,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct ChatRequest<'a> {
    pub message: &'a str,
    pub user_id: &'a str,
}

/// Assistant reply to one chat message
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatReply {
    #[serde(rename = "message", default)]
    pub text: String,
    #[serde(default)]
    pub properties: Vec<Property>,
    #[serde(default)]
    pub suggestions: Vec<String>,
}

/// A message as the service stores it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredMessage {
    pub id: MessageId,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub properties: Option<Vec<Property>>,
    #[serde(rename = "isError", default)]
    pub is_error: Option<bool>,
}

impl StoredMessage {
    /// Convert to a history entry. `fallback` stamps messages whose timestamp
    /// cannot be read.
    pub fn into_message(self, fallback: DateTime<Utc>) -> Message {
        let role = match self.kind.as_deref() {
            Some("user") => Role::User,
            _ => Role::Bot,
        };
        Message {
            id: self.id,
            role,
            text: self.text,
            timestamp: parse_timestamp(&self.timestamp).unwrap_or(fallback),
            properties: self.properties.unwrap_or_default(),
            is_error: self.is_error.unwrap_or(false),
        }
    }
}

/// RFC 3339, or naive ISO-8601 read as UTC
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatHistory {
    #[serde(default)]
    pub messages: Vec<StoredMessage>,
    #[serde(default)]
    pub count: usize,
}

/// Response of the clear-history route
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClearReceipt {
    pub success: bool,
    #[serde(default)]
    pub message: String,
}
