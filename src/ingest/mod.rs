//! Sentiment data sources.
//!
//! A source answers a [`SentimentQuery`] with an [`IngestResponse`]. The
//! dashboard only aggregates responses that report success.

pub mod file;
pub mod http;

pub use file::FileSource;
pub use http::HttpSource;

use crate::models::{IngestResponse, SentimentQuery};
use anyhow::Result;

/// Message shown when a source cannot be reached.
pub const FETCH_FAILED_MESSAGE: &str = "Failed to fetch sentiment data. Please try again later.";

/// Anything that can produce classified records for a query.
#[allow(async_fn_in_trait)]
pub trait SentimentSource {
    /// Short human-readable name used in logs.
    fn name(&self) -> &str;

    /// Fetch records for every hashtag in the query.
    async fn fetch(&self, query: &SentimentQuery) -> Result<IngestResponse>;
}

/// Combine per-hashtag responses into one, preserving hashtag order.
///
/// The first unsuccessful response fails the whole batch.
pub fn merge_responses<I>(responses: I) -> IngestResponse
where
    I: IntoIterator<Item = IngestResponse>,
{
    let mut data = Vec::new();

    for response in responses {
        if !response.success {
            return IngestResponse::failed(
                response
                    .message
                    .unwrap_or_else(|| FETCH_FAILED_MESSAGE.to_string()),
            );
        }
        data.extend(response.data);
    }

    IngestResponse::ok(data)
}
