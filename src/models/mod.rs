use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier assigned to a listing by the search service
pub type PropertyId = u64;

/// Price estimate attached to a property after a predict call
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Prediction {
    pub predicted_price: f64,
    #[serde(default)]
    pub listed_price: Option<f64>,
    /// Model features echoed back by the service, kept opaque
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_input: Option<serde_json::Value>,
}

/// Core property data model
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Property {
    pub id: PropertyId,
    pub title: String,
    pub price: f64,
    pub location: String,
    pub bedrooms: u32,
    pub bathrooms: u32,
    pub size: f64,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prediction: Option<Prediction>,
}

impl Property {
    /// First image, used as the card thumbnail
    pub fn primary_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }

    /// Copy of this record with `prediction` attached; identity is untouched
    pub fn with_prediction(&self, prediction: Prediction) -> Self {
        Self {
            prediction: Some(prediction),
            ..self.clone()
        }
    }
}

/// Who authored a chat message
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Bot,
}

/// Message identity. Locally minted ids are numeric, stored ones come back as strings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(untagged)]
pub enum MessageId {
    Local(u64),
    Remote(String),
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local(n) => write!(f, "{}", n),
            Self::Remote(s) => f.write_str(s),
        }
    }
}

/// One entry in the chat history
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub id: MessageId,
    pub role: Role,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    /// Listings returned alongside a bot reply
    #[serde(default)]
    pub properties: Vec<Property>,
    #[serde(default)]
    pub is_error: bool,
}

impl Message {
    pub fn user(id: MessageId, text: impl Into<String>) -> Self {
        Self {
            id,
            role: Role::User,
            text: text.into(),
            timestamp: Utc::now(),
            properties: Vec::new(),
            is_error: false,
        }
    }

    pub fn bot(id: MessageId, text: impl Into<String>, properties: Vec<Property>) -> Self {
        Self {
            id,
            role: Role::Bot,
            text: text.into(),
            timestamp: Utc::now(),
            properties,
            is_error: false,
        }
    }

    /// Bot message standing in for a failed assistant call
    pub fn error(id: MessageId, text: impl Into<String>) -> Self {
        Self {
            is_error: true,
            ..Self::bot(id, text, Vec::new())
        }
    }
}

/// The two records fetched for a side-by-side comparison
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ComparisonPair {
    #[serde(rename = "property1")]
    pub first: Property,
    #[serde(rename = "property2")]
    pub second: Property,
}
