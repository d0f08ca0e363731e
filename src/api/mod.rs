pub mod http;
#[cfg(test)]
pub(crate) mod mock;
pub mod traits;
pub mod types;

pub use http::HttpBackend;
pub use traits::{ApiResult, ChatApi, PropertyApi};
pub use types::{
    ChatHistory, ChatReply, ClearReceipt, PriceEstimate, PropertyFilter, PropertyList,
    SaveReceipt, StoredMessage,
};
