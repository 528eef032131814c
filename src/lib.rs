// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod config;
pub mod error;
pub mod feed;
pub mod metrics;
pub mod notify;
pub mod pipeline;
pub mod poller;

// ---- Re-exports for stable public API ----
pub use crate::config::{AppConfig, Args};
pub use crate::error::{ConfigError, FetchError, NotifyError};
pub use crate::feed::{Event, EventFeed, FeedResponse, HttpFeed};
pub use crate::notify::{format_alert, Alert, BarkSink, Notifier, PushSink};
pub use crate::pipeline::{Pipeline, PipelineSettings};
pub use crate::poller::{evaluate, PollCursor, Poller, TickOutcome};
