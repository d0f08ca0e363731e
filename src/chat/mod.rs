pub mod session;
pub mod state;

pub use session::{ChatSession, RejectReason, SendOutcome};
pub use state::{ChatEvent, ChatState, InvalidTransition};

/// Longest message a user may send, in characters
pub const MAX_MESSAGE_LENGTH: usize = 500;

/// Shown when the assistant answers with no text
pub const EMPTY_REPLY_TEXT: &str = "I found some properties for you!";

/// Shown in place of a reply when the assistant call fails
pub const ERROR_REPLY_TEXT: &str = "Sorry, I encountered an error. Please try again.";

/// Canned query offered before the conversation starts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuickAction {
    pub label: &'static str,
    pub query: &'static str,
}

pub const QUICK_ACTIONS: &[QuickAction] = &[
    QuickAction {
        label: "Cheapest Properties",
        query: "Show me the cheapest properties",
    },
    QuickAction {
        label: "Under $500k",
        query: "Show me properties under $500,000",
    },
    QuickAction {
        label: "3BR in SF",
        query: "3 bedroom house in San Francisco",
    },
    QuickAction {
        label: "With Pool",
        query: "Properties with pool and garage",
    },
    QuickAction {
        label: "Show All",
        query: "Show all properties",
    },
];
