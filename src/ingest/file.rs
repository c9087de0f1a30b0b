//! JSON fixture source.
//!
//! Accepts either a full response envelope or a bare array of records and
//! keeps the records belonging to the queried hashtags.

use super::SentimentSource;
use crate::models::{normalize_hashtag, IngestResponse, RawRecord, SentimentQuery};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Deserialize)]
#[serde(untagged)]
enum FixtureFile {
    Envelope(IngestResponse),
    Records(Vec<RawRecord>),
}

/// Sentiment source reading records from a local JSON file.
pub struct FileSource {
    path: PathBuf,
    label: String,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let label = path.display().to_string();
        Self { path, label }
    }

    fn parse(content: &str, path: &Path) -> Result<IngestResponse> {
        let fixture: FixtureFile = serde_json::from_str(content)
            .with_context(|| format!("Failed to parse fixture file: {}", path.display()))?;

        Ok(match fixture {
            FixtureFile::Envelope(response) => response,
            FixtureFile::Records(records) => IngestResponse::ok(records),
        })
    }
}

impl SentimentSource for FileSource {
    fn name(&self) -> &str {
        &self.label
    }

    async fn fetch(&self, query: &SentimentQuery) -> Result<IngestResponse> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read fixture file: {}", self.path.display()))?;

        let response = Self::parse(&content, &self.path)?;
        if !response.success {
            return Ok(response);
        }

        let total = response.data.len();
        let data: Vec<RawRecord> = response
            .data
            .into_iter()
            .filter(|record| {
                let tag = normalize_hashtag(&record.hashtag);
                query
                    .hashtags
                    .iter()
                    .any(|wanted| wanted.eq_ignore_ascii_case(&tag))
            })
            .collect();

        debug!(
            "Fixture {} matched {} of {} records",
            self.label,
            data.len(),
            total
        );

        Ok(IngestResponse::ok(data))
    }
}
