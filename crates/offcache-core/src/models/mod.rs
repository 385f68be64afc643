//! Data types flowing through the proxy.
//!
//! - Requests and their normalized cache identity ([`ProxyRequest`],
//!   [`CacheKey`])
//! - Response snapshots and persisted cache entries ([`ProxyResponse`],
//!   [`CachedEntry`])
//! - Control-plane messages from the hosting page ([`ControlMessage`])

pub mod message;
pub mod request;
pub mod response;

pub use message::ControlMessage;
pub use request::{CacheKey, ProxyRequest};
pub use response::{CachedEntry, ProxyResponse, ResponseKind, ResponseSource};
