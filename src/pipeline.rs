// src/pipeline.rs
//! Wires poller → hand-off → notifier under one cancellation token.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::AppConfig;
use crate::feed::{EventFeed, HttpFeed};
use crate::notify::{BarkSink, Notifier, PushSink};
use crate::poller::Poller;

/// Single slot: the poller can be at most one event ahead of the notifier.
pub const HANDOFF_CAPACITY: usize = 1;

/// Everything the two loops need besides their I/O seams.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub poll_interval: Duration,
    pub staleness: Duration,
    pub push_key: String,
    pub time_zone: chrono_tz::Tz,
}

impl From<&AppConfig> for PipelineSettings {
    fn from(cfg: &AppConfig) -> Self {
        Self {
            poll_interval: cfg.poll_interval,
            staleness: cfg.staleness,
            push_key: cfg.push_key.clone(),
            time_zone: cfg.time_zone,
        }
    }
}

pub struct Pipeline {
    cancel: CancellationToken,
    poller: JoinHandle<()>,
    notifier: JoinHandle<()>,
}

impl Pipeline {
    /// Spawn both loops on the current runtime. Cancelling `cancel` (or
    /// calling [`Pipeline::shutdown`]) stops them.
    pub fn spawn<F, S>(feed: F, sink: S, settings: PipelineSettings, cancel: CancellationToken) -> Self
    where
        F: EventFeed + 'static,
        S: PushSink + 'static,
    {
        let (tx, rx) = mpsc::channel(HANDOFF_CAPACITY);

        let notifier = Notifier::new(sink, settings.push_key).with_time_zone(settings.time_zone);
        let poller = Poller::new(feed, settings.poll_interval).with_staleness(settings.staleness);

        let notifier = tokio::spawn(notifier.run(rx, cancel.clone()));
        let poller = tokio::spawn(poller.run(tx, cancel.clone()));

        Self {
            cancel,
            poller,
            notifier,
        }
    }

    /// Production wiring: HTTP feed + Bark sink sharing one client.
    pub fn from_config(cfg: &AppConfig, cancel: CancellationToken) -> Result<Self, crate::error::ConfigError> {
        let client = cfg.http_client()?;
        let feed = HttpFeed::new(cfg.feed_base.clone(), client.clone()).with_updates(cfg.feed_updates);
        let sink = BarkSink::new(cfg.push_base.clone(), client);
        Ok(Self::spawn(feed, sink, PipelineSettings::from(cfg), cancel))
    }

    pub fn is_finished(&self) -> bool {
        self.poller.is_finished() && self.notifier.is_finished()
    }

    /// Cancel both loops, then wait up to `grace` for them to return.
    /// Returns `true` if both stopped in time. Either way the handles are
    /// dropped, so anything still running is left to die with the runtime.
    pub async fn shutdown(self, grace: Duration) -> bool {
        self.cancel.cancel();
        if grace.is_zero() {
            return self.is_finished();
        }

        let Pipeline {
            poller, notifier, ..
        } = self;
        match tokio::time::timeout(grace, async { tokio::join!(poller, notifier) }).await {
            Ok((p, n)) => {
                if let Err(e) = p {
                    tracing::warn!(error = %e, "poller task ended abnormally");
                }
                if let Err(e) = n {
                    tracing::warn!(error = %e, "notifier task ended abnormally");
                }
                true
            }
            Err(_) => {
                tracing::warn!(grace_ms = grace.as_millis() as u64, "loops still busy after grace period");
                false
            }
        }
    }
}
