// src/feed/types.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::FetchError;

/// One early-warning report as published by the feed.
///
/// Only `startAt` is mandatory: it is the cursor. Every other field falls back
/// to its zero value when missing or `null`, so one sloppy record cannot wedge
/// the poller on a decode error.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(default, deserialize_with = "null_as_default")]
    pub event_id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub updates: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub latitude: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub longitude: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub depth: f64, // km
    #[serde(default, deserialize_with = "null_as_default")]
    pub epicenter: String,
    pub start_at: i64, // unix ms, ordering key for the cursor
    #[serde(default, deserialize_with = "null_as_default")]
    pub update_at: i64, // unix ms
    #[serde(default, deserialize_with = "null_as_default")]
    pub magnitude: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub inside_net: i64,
    // The provider spells it this way on the wire.
    #[serde(default, rename = "sations", deserialize_with = "null_as_default")]
    pub stations: i64,
}

impl Event {
    /// `startAt` as a UTC instant, `None` if chrono cannot represent it.
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.start_at)
    }
}

/// Envelope returned by `GET /earlywarnings`.
///
/// Ordering contract: the feed lists events newest first, so `data[0]` is the
/// candidate the poller inspects. Nothing here re-sorts; if the provider ever
/// breaks that guarantee the poller will look at the wrong event.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FeedResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub code: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: Vec<Event>,
}

impl FeedResponse {
    pub fn from_events(data: Vec<Event>) -> Self {
        Self {
            code: 0,
            message: String::new(),
            data,
        }
    }

    /// The most recent event, per the ordering contract above.
    pub fn latest(&self) -> Option<&Event> {
        self.data.first()
    }

    pub fn into_latest(self) -> Option<Event> {
        self.data.into_iter().next()
    }
}

fn null_as_default<'de, D, T>(de: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(de)?.unwrap_or_default())
}

/// Source of early-warning events. `start_at` is the cursor in unix ms.
#[async_trait::async_trait]
pub trait EventFeed: Send + Sync {
    async fn fetch(&self, start_at: i64) -> Result<FeedResponse, FetchError>;

    fn name(&self) -> &'static str {
        "feed"
    }
}

#[async_trait::async_trait]
impl<F: EventFeed + ?Sized> EventFeed for std::sync::Arc<F> {
    async fn fetch(&self, start_at: i64) -> Result<FeedResponse, FetchError> {
        (**self).fetch(start_at).await
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}
