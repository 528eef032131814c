// src/feed/http.rs
use async_trait::async_trait;
use reqwest::Client;

use super::types::{EventFeed, FeedResponse};
use crate::error::FetchError;

pub const DEFAULT_FEED_BASE: &str = "https://mobile-new.chinaeew.cn/v1";
/// Page-size / recency hint the feed expects on every query.
pub const DEFAULT_UPDATES: u32 = 4;

/// `GET <base>/earlywarnings?start_at=<ms>&updates=<n>`
#[derive(Clone)]
pub struct HttpFeed {
    base: String,
    updates: u32,
    client: Client,
}

impl HttpFeed {
    pub fn new(base: impl Into<String>, client: Client) -> Self {
        Self {
            base: base.into().trim_end_matches('/').to_string(),
            updates: DEFAULT_UPDATES,
            client,
        }
    }

    pub fn with_updates(mut self, updates: u32) -> Self {
        self.updates = updates;
        self
    }

    pub fn endpoint(&self) -> String {
        format!("{}/earlywarnings", self.base)
    }
}

#[async_trait]
impl EventFeed for HttpFeed {
    async fn fetch(&self, start_at: i64) -> Result<FeedResponse, FetchError> {
        let resp = self
            .client
            .get(self.endpoint())
            .query(&[
                ("start_at", start_at.to_string()),
                ("updates", self.updates.to_string()),
            ])
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            tracing::debug!(%status, body = %body, "feed non-2xx body");
            return Err(FetchError::Status { status });
        }

        let decoded: FeedResponse = serde_json::from_str(&body)?;
        if decoded.code != 0 {
            tracing::debug!(code = decoded.code, message = %decoded.message, "feed reported non-zero code");
        }
        Ok(decoded)
    }

    fn name(&self) -> &'static str {
        "chinaeew"
    }
}
