// src/notify/bark.rs
use async_trait::async_trait;
use reqwest::Client;

use super::PushSink;
use crate::error::NotifyError;

pub const DEFAULT_PUSH_BASE: &str = "https://api.day.app";

/// Bark-style push: `GET <base>/<key>/<title>/<body>`.
#[derive(Clone)]
pub struct BarkSink {
    base: String,
    client: Client,
}

impl BarkSink {
    pub fn new(base: impl Into<String>, client: Client) -> Self {
        Self {
            base: base.into().trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Each segment is percent-encoded so `/`, `?`, spaces and CJK text survive the path.
    pub fn url_for(&self, key: &str, title: &str, body: &str) -> String {
        format!(
            "{}/{}/{}/{}",
            self.base,
            urlencoding::encode(key),
            urlencoding::encode(title),
            urlencoding::encode(body)
        )
    }
}

#[async_trait]
impl PushSink for BarkSink {
    async fn send(&self, key: &str, title: &str, body: &str) -> Result<String, NotifyError> {
        let rsp = self.client.get(self.url_for(key, title, body)).send().await?;
        let status = rsp.status();
        let text = rsp.text().await?;
        if !status.is_success() {
            return Err(NotifyError::Status { status, body: text });
        }
        Ok(text)
    }

    fn name(&self) -> &'static str {
        "bark"
    }
}
