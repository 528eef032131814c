// src/notify/mod.rs
//! Consumer half of the pipeline: take events off the hand-off, render them,
//! push them. A failed push is logged and forgotten; there is no retry and the
//! loop keeps going.

pub mod alert;
pub mod bark;

use chrono_tz::Tz;
use metrics::counter;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::error::NotifyError;
use crate::feed::Event;
use crate::metrics::{ensure_metrics_described, NOTIFY_FAILED_TOTAL, NOTIFY_SENT_TOTAL};

pub use alert::{format_alert, Alert, DEFAULT_TIME_ZONE};
pub use bark::BarkSink;

/// Push provider seam. Returns the provider's raw response body on success.
#[async_trait::async_trait]
pub trait PushSink: Send + Sync {
    async fn send(&self, key: &str, title: &str, body: &str) -> Result<String, NotifyError>;

    fn name(&self) -> &'static str {
        "sink"
    }
}

#[async_trait::async_trait]
impl<S: PushSink + ?Sized> PushSink for std::sync::Arc<S> {
    async fn send(&self, key: &str, title: &str, body: &str) -> Result<String, NotifyError> {
        (**self).send(key, title, body).await
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

pub struct Notifier<S> {
    sink: S,
    key: String,
    tz: Tz,
}

impl<S: PushSink> Notifier<S> {
    pub fn new(sink: S, key: impl Into<String>) -> Self {
        Self {
            sink,
            key: key.into(),
            tz: DEFAULT_TIME_ZONE,
        }
    }

    pub fn with_time_zone(mut self, tz: Tz) -> Self {
        self.tz = tz;
        self
    }

    /// Format + push a single event.
    pub async fn deliver(&self, event: &Event) -> Result<String, NotifyError> {
        let alert = format_alert(event, self.tz)?;
        self.sink.send(&self.key, &alert.title, &alert.body).await
    }

    /// Runs until cancelled or until the poller drops its sender. Whatever is
    /// still sitting in the hand-off at cancellation is dropped.
    pub async fn run(self, mut rx: mpsc::Receiver<Event>, cancel: CancellationToken) {
        ensure_metrics_described();

        loop {
            let event = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                next = rx.recv() => match next {
                    Some(ev) => ev,
                    None => {
                        tracing::info!("hand-off closed");
                        break;
                    }
                },
            };

            match self.deliver(&event).await {
                Ok(result) => {
                    counter!(NOTIFY_SENT_TOTAL).increment(1);
                    tracing::info!(
                        event_id = event.event_id,
                        sink = self.sink.name(),
                        result = %result,
                        "notification sent"
                    );
                }
                Err(e) => {
                    counter!(NOTIFY_FAILED_TOTAL).increment(1);
                    tracing::error!(
                        event_id = event.event_id,
                        sink = self.sink.name(),
                        error = %e,
                        "send notification failed"
                    );
                }
            }
        }

        tracing::info!("notifier exiting");
    }
}
