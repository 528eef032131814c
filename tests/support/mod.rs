// tests/support/mod.rs
// In-process fakes for the feed and the push endpoint.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use quake_alert::{Event, EventFeed, FeedResponse, FetchError, NotifyError, PushSink};
use tokio::time::Instant;

pub const MIN: i64 = 60_000;

pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

pub fn ev(id: i64, start_at: i64) -> Event {
    Event {
        event_id: id,
        updates: 1,
        latitude: 30.12,
        longitude: 103.34,
        depth: 12.0,
        epicenter: "四川雅安市芦山县".into(),
        start_at,
        update_at: start_at + 2_000,
        magnitude: 5.2,
        inside_net: 1,
        stations: 14,
    }
}

pub fn resp(events: Vec<Event>) -> FeedResponse {
    FeedResponse::from_events(events)
}

pub fn decode_error() -> FetchError {
    FetchError::Decode(serde_json::from_str::<serde_json::Value>("{not json").unwrap_err())
}

/// Replays queued results in order, then answers with an empty list forever.
pub struct ScriptedFeed {
    script: Mutex<VecDeque<Result<FeedResponse, FetchError>>>,
    calls: Mutex<Vec<(i64, Instant)>>,
    latency: Duration,
}

impl ScriptedFeed {
    pub fn new(script: Vec<Result<FeedResponse, FetchError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            calls: Mutex::new(Vec::new()),
            latency: Duration::ZERO,
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// `start_at` cursor seen on each call, in order.
    pub fn cursors(&self) -> Vec<i64> {
        self.calls.lock().unwrap().iter().map(|(c, _)| *c).collect()
    }

    pub fn call_times(&self) -> Vec<Instant> {
        self.calls.lock().unwrap().iter().map(|(_, t)| *t).collect()
    }
}

#[async_trait::async_trait]
impl EventFeed for ScriptedFeed {
    async fn fetch(&self, start_at: i64) -> Result<FeedResponse, FetchError> {
        self.calls.lock().unwrap().push((start_at, Instant::now()));
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        let next = self.script.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Ok(FeedResponse::default()))
    }
}

/// Same fresh event on every call; handy for backpressure tests.
pub struct RepeatingFeed {
    pub event: Event,
    pub calls: Mutex<usize>,
}

impl RepeatingFeed {
    pub fn new(event: Event) -> Self {
        Self {
            event,
            calls: Mutex::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait::async_trait]
impl EventFeed for RepeatingFeed {
    async fn fetch(&self, _start_at: i64) -> Result<FeedResponse, FetchError> {
        *self.calls.lock().unwrap() += 1;
        Ok(resp(vec![self.event.clone()]))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sent {
    pub key: String,
    pub title: String,
    pub body: String,
}

/// Records every push; fails the calls whose index is listed in `fail_on`.
pub struct RecordingSink {
    sent: Mutex<Vec<Sent>>,
    fail_on: Vec<usize>,
    fail_all: bool,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::failing_on(Vec::new())
    }

    pub fn failing_on(fail_on: Vec<usize>) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail_on,
            fail_all: false,
        }
    }

    pub fn always_failing() -> Self {
        Self {
            fail_all: true,
            ..Self::new()
        }
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl PushSink for RecordingSink {
    async fn send(&self, key: &str, title: &str, body: &str) -> Result<String, NotifyError> {
        let idx = {
            let mut sent = self.sent.lock().unwrap();
            sent.push(Sent {
                key: key.to_string(),
                title: title.to_string(),
                body: body.to_string(),
            });
            sent.len() - 1
        };
        if self.fail_all || self.fail_on.contains(&idx) {
            return Err(NotifyError::Status {
                status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
                body: "push backend down".into(),
            });
        }
        Ok(r#"{"code":200,"message":"success"}"#.into())
    }
}
