//! Conversational property search client.
//!
//! - [`chat`]: ordered chat history with a single outstanding request
//! - [`selection`]: the two-item compare set
//! - [`comparison`]: field-by-field comparison of two listings
//! - [`coordinator`]: list, saved and compare view state
//! - [`api`]: the remote search service boundary and its HTTP client

pub mod api;
pub mod chat;
pub mod comparison;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod format;
pub mod models;
pub mod selection;

pub use chat::{ChatSession, SendOutcome};
pub use comparison::{Comparison, Verdict};
pub use config::ClientConfig;
pub use coordinator::Coordinator;
pub use models::{Message, Prediction, Property, PropertyId, Role};
pub use selection::Selection;
