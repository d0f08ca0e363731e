//! Error taxonomy shared by the client components.

use thiserror::Error;

/// Classification of a failed remote call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// Connection refused, reset, DNS
    Network,
    /// The transport gave up waiting
    Timeout,
    /// Non-2xx response
    Status,
    /// Body did not match the expected shape
    Decode,
}

/// Any failure crossing the remote boundary
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
    pub status: Option<u16>,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Network, message)
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Decode, message)
    }

    pub fn status(code: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(code),
            ..Self::new(TransportErrorKind::Status, message)
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::new(TransportErrorKind::Timeout, err.to_string())
        } else if err.is_decode() {
            Self::decode(err.to_string())
        } else if let Some(code) = err.status() {
            Self::status(code.as_u16(), err.to_string())
        } else {
            Self::network(err.to_string())
        }
    }
}

/// Comparison was requested without exactly two selected listings
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("select exactly 2 properties to compare ({selected} selected)")]
    InsufficientSelection { selected: usize },
}

/// The comparison engine was handed something other than two distinct records
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ComparisonError {
    #[error("invalid comparison input: {0}")]
    InvalidComparisonInput(String),
}

/// Failures surfaced by the view coordinator
#[derive(Debug, Error)]
pub enum CoordinatorError {
    #[error(transparent)]
    Selection(#[from] SelectionError),
    #[error(transparent)]
    Comparison(#[from] ComparisonError),
    #[error("remote call failed: {0}")]
    Transport(#[from] TransportError),
    #[error("property {0} is not in the current list")]
    UnknownProperty(u64),
}

/// Configuration could not be read from the environment
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} must be a positive number of seconds, got {value:?}")]
    InvalidTimeout { var: &'static str, value: String },
    #[error("{var} must not be empty")]
    Empty { var: &'static str },
}
