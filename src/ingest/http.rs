//! HTTP sentiment backend client.
//!
//! Issues one `GET {base}/sentiment?hashtag=..&priority=..` per hashtag,
//! concurrently, and merges the envelopes.

use super::{merge_responses, SentimentSource};
use crate::models::{IngestResponse, SentimentQuery};
use anyhow::{Context, Result};
use futures::future::try_join_all;
use std::time::Duration;
use tracing::{debug, info};

/// Sentiment source backed by a remote classification service.
pub struct HttpSource {
    base_url: String,
    timeout_seconds: u64,
    http_client: reqwest::Client,
}

impl HttpSource {
    /// Create a client for the service at `base_url`.
    pub fn new(base_url: impl Into<String>, timeout_seconds: u64) -> Result<Self> {
        let base_url = base_url.into();
        info!("Using sentiment backend at {}", base_url);

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            base_url,
            timeout_seconds,
            http_client,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/sentiment", self.base_url.trim_end_matches('/'))
    }

    async fn fetch_hashtag(&self, hashtag: &str, threshold: u8) -> Result<IngestResponse> {
        let url = self.endpoint();
        debug!("Fetching #{} from {}", hashtag, url);

        let response = self
            .http_client
            .get(&url)
            .query(&[
                ("hashtag", hashtag.to_string()),
                ("priority", threshold.to_string()),
            ])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    anyhow::anyhow!("Request timed out after {}s", self.timeout_seconds)
                } else if e.is_connect() {
                    anyhow::anyhow!("Cannot connect to sentiment backend at {}", self.base_url)
                } else {
                    anyhow::anyhow!("Failed to send request: {}", e)
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("Sentiment API error {}: {}", status, body));
        }

        response
            .json::<IngestResponse>()
            .await
            .context("Failed to parse sentiment response")
    }
}

impl SentimentSource for HttpSource {
    fn name(&self) -> &str {
        &self.base_url
    }

    async fn fetch(&self, query: &SentimentQuery) -> Result<IngestResponse> {
        let requests = query
            .hashtags
            .iter()
            .map(|tag| self.fetch_hashtag(tag, query.priority_threshold));

        let responses = try_join_all(requests).await?;
        Ok(merge_responses(responses))
    }
}
