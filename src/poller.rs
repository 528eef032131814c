// src/poller.rs
//! # Poller
//! Producer half of the pipeline. On every tick it queries the feed from the
//! current cursor, looks only at the newest event, and hands it to the
//! notifier if it is fresh enough.
//!
//! Policy per tick:
//! 1. fetch error → log, skip, cursor untouched
//! 2. empty list → skip, cursor untouched
//! 3. otherwise the cursor moves to `data[0].startAt` whether or not the event
//!    is forwarded, so a stale head is never inspected twice
//! 4. forwarded only if `now - startAt <= staleness`

use std::time::Duration;

use chrono::Utc;
use metrics::counter;
use tokio::sync::mpsc;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::feed::{Event, EventFeed, FeedResponse};
use crate::metrics::{
    ensure_metrics_described, EVENTS_EMITTED_TOTAL, EVENTS_STALE_TOTAL, FETCH_ERRORS_TOTAL,
    POLLS_TOTAL,
};

pub const DEFAULT_STALENESS: Duration = Duration::from_secs(30 * 60);

/// Last accepted `startAt` (unix ms). Starts at zero and never moves backwards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct PollCursor(i64);

impl PollCursor {
    pub fn new() -> Self {
        Self(0)
    }

    pub fn get(self) -> i64 {
        self.0
    }

    /// Move forward to `ts`. A smaller `ts` leaves the cursor where it is.
    pub fn advance_to(&mut self, ts: i64) {
        self.0 = self.0.max(ts);
    }
}

/// What a single successful fetch amounts to.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    Empty,
    Stale(Event),
    Fresh(Event),
}

/// Pure tick policy (steps 2-4 above). No I/O, `now_ms` is injected.
pub fn evaluate(
    cursor: &mut PollCursor,
    response: FeedResponse,
    now_ms: i64,
    staleness: Duration,
) -> TickOutcome {
    let Some(candidate) = response.into_latest() else {
        return TickOutcome::Empty;
    };

    cursor.advance_to(candidate.start_at);

    let limit_ms = i64::try_from(staleness.as_millis()).unwrap_or(i64::MAX);
    let age_ms = now_ms.saturating_sub(candidate.start_at);
    if age_ms > limit_ms {
        TickOutcome::Stale(candidate)
    } else {
        TickOutcome::Fresh(candidate)
    }
}

pub struct Poller<F> {
    feed: F,
    interval: Duration,
    staleness: Duration,
    cursor: PollCursor,
}

impl<F: EventFeed> Poller<F> {
    pub fn new(feed: F, interval: Duration) -> Self {
        Self {
            feed,
            interval,
            staleness: DEFAULT_STALENESS,
            cursor: PollCursor::new(),
        }
    }

    pub fn with_staleness(mut self, staleness: Duration) -> Self {
        self.staleness = staleness;
        self
    }

    pub fn cursor(&self) -> PollCursor {
        self.cursor
    }

    /// One fetch + evaluate. Returns the event to forward, if any.
    pub async fn tick(&mut self) -> Option<Event> {
        counter!(POLLS_TOTAL).increment(1);

        let response = match self.feed.fetch(self.cursor.get()).await {
            Ok(r) => r,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    feed = self.feed.name(),
                    start_at = self.cursor.get(),
                    "query data failed"
                );
                counter!(FETCH_ERRORS_TOTAL).increment(1);
                return None;
            }
        };

        if !response.data.is_empty() {
            tracing::info!(
                num = response.data.len(),
                head_event_id = response.data[0].event_id,
                "found events"
            );
        }

        match evaluate(
            &mut self.cursor,
            response,
            Utc::now().timestamp_millis(),
            self.staleness,
        ) {
            TickOutcome::Empty => {
                tracing::trace!(start_at = self.cursor.get(), "no new events");
                None
            }
            TickOutcome::Stale(ev) => {
                tracing::info!(
                    event_id = ev.event_id,
                    start_at = ev.start_at,
                    started = ?ev.started_at(),
                    "latest event is out of date"
                );
                counter!(EVENTS_STALE_TOTAL).increment(1);
                None
            }
            TickOutcome::Fresh(ev) => Some(ev),
        }
    }

    /// Timer loop. The first tick fires one interval after start and the
    /// timer is re-armed after each tick completes, so slow fetches push later
    /// ticks back instead of bunching them up.
    pub async fn run(mut self, tx: mpsc::Sender<Event>, cancel: CancellationToken) {
        ensure_metrics_described();

        let mut ticker = time::interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }

            if let Some(event) = self.tick().await {
                let event_id = event.event_id;
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => {
                        tracing::info!(event_id, "cancelled while handing off event");
                        break;
                    }
                    sent = tx.send(event) => {
                        if sent.is_err() {
                            tracing::warn!(event_id, "notifier is gone, poller stopping");
                            break;
                        }
                        counter!(EVENTS_EMITTED_TOTAL).increment(1);
                        tracing::debug!(event_id, "event handed off");
                    }
                }
            }

            ticker.reset();
        }

        tracing::info!(cursor = self.cursor.get(), "poller exiting");
    }
}
