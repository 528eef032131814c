// src/error.rs
//! Error taxonomy for the poll → hand-off → notify pipeline.
//!
//! None of these ever cross a component boundary: the poller logs a
//! `FetchError` and skips the tick, the notifier logs a `NotifyError` and
//! drops the event. Only `ConfigError` reaches `main`, before anything runs.

use reqwest::StatusCode;
use thiserror::Error;

/// Feed request construction, transport, or decode failure.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("feed request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("feed returned HTTP {status}")]
    Status { status: StatusCode },

    #[error("feed body could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        FetchError::Request(e)
    }
}

/// Anything that stops one alert from reaching the push endpoint.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("event start time {0} ms is not a representable timestamp")]
    Timestamp(i64),

    /// Transport or body-read failure. The URL is stripped because it carries the key.
    #[error("push request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("push endpoint returned HTTP {status}: {body}")]
    Status { status: StatusCode, body: String },
}

impl From<reqwest::Error> for NotifyError {
    fn from(e: reqwest::Error) -> Self {
        NotifyError::Request(e.without_url())
    }
}

/// Startup problems. These abort the process before the loops are spawned.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("push key is required (--key or QUAKE_PUSH_KEY)")]
    MissingKey,

    #[error("poll interval must be greater than zero")]
    ZeroInterval,

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
}
