// src/feed/mod.rs
pub mod http;
pub mod types;

pub use http::HttpFeed;
pub use types::{Event, EventFeed, FeedResponse};
