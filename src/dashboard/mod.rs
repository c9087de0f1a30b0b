//! Dashboard query session.
//!
//! Ties a [`SentimentSource`] to the filter and aggregators, and makes sure
//! a slow response never overwrites the result of a newer query.

pub mod tracker;

pub use tracker::QueryTracker;

use crate::analysis::{
    aggregate_sentiment, aggregate_topics, aggregate_urgency, filter_by_priority, inconsistent_topics,
    SentimentSummary, TopicCount, UrgencySummary,
};
use crate::error::PipelineError;
use crate::ingest::{SentimentSource, FETCH_FAILED_MESSAGE};
use crate::models::{Record, SentimentQuery};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

/// Everything a renderer needs for one hashtag + threshold combination.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub hashtags: Vec<String>,
    pub threshold: u8,
    pub source: String,
    pub generated_at: DateTime<Utc>,
    /// Records that passed the priority filter, in source order.
    pub records: Vec<Record>,
    pub topics: Vec<TopicCount>,
    pub sentiment: SentimentSummary,
    pub urgency: UrgencySummary,
}

impl DashboardView {
    /// Filter `records` and run every aggregator on the result.
    pub fn build(query: &SentimentQuery, source: &str, records: &[Record]) -> Self {
        let filtered = filter_by_priority(records, query.priority_threshold);
        debug!(
            "{} of {} records meet threshold {}",
            filtered.len(),
            records.len(),
            query.priority_threshold
        );

        Self {
            hashtags: query.hashtags.clone(),
            threshold: query.priority_threshold,
            source: source.to_string(),
            generated_at: Utc::now(),
            topics: aggregate_topics(filtered.iter().copied()),
            sentiment: aggregate_sentiment(filtered.iter().copied()),
            urgency: aggregate_urgency(filtered.iter().copied()),
            records: filtered.into_iter().cloned().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// A query whose source did not deliver data.
#[derive(Debug, Clone, Serialize)]
pub struct QueryFailure {
    pub hashtags: Vec<String>,
    pub threshold: u8,
    /// User-facing message.
    pub message: String,
    /// Underlying transport error, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cause: Option<String>,
}

/// Result of a dashboard query.
#[derive(Debug, Clone)]
pub enum QueryOutcome {
    Ready(DashboardView),
    Failed(QueryFailure),
    /// A newer query was issued while this one was in flight.
    Superseded,
}

/// A dashboard bound to one data source.
pub struct Dashboard<S> {
    source: S,
    tracker: QueryTracker,
}

impl<S: SentimentSource> Dashboard<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            tracker: QueryTracker::new(),
        }
    }

    /// Fetch, validate, filter and aggregate.
    ///
    /// Records that break the data contract abort the query with an error;
    /// source failures become [`QueryOutcome::Failed`] and skip aggregation.
    pub async fn query(&self, query: &SentimentQuery) -> Result<QueryOutcome, PipelineError> {
        let ticket = self.tracker.begin();
        info!(
            "Query #{}: {:?} at threshold {} from {}",
            ticket.sequence(),
            query.hashtags,
            query.priority_threshold,
            self.source.name()
        );

        let fetched = match self.tracker.accept(ticket, self.source.fetch(query).await) {
            Some(fetched) => fetched,
            None => {
                debug!("Query #{} superseded, dropping response", ticket.sequence());
                return Ok(QueryOutcome::Superseded);
            }
        };

        let failure = |message: String, cause: Option<String>| {
            QueryOutcome::Failed(QueryFailure {
                hashtags: query.hashtags.clone(),
                threshold: query.priority_threshold,
                message,
                cause,
            })
        };

        let response = match fetched {
            Ok(response) => response,
            Err(e) => {
                warn!("Source {} failed: {:#}", self.source.name(), e);
                return Ok(failure(FETCH_FAILED_MESSAGE.to_string(), Some(format!("{:#}", e))));
            }
        };

        if !response.success {
            let message = response
                .message
                .unwrap_or_else(|| "An error occurred fetching data".to_string());
            warn!("Source {} reported failure: {}", self.source.name(), message);
            return Ok(failure(message, None));
        }

        let records = response
            .data
            .into_iter()
            .map(Record::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        let view = DashboardView::build(query, self.source.name(), &records);
        for record in inconsistent_topics(&view.records) {
            debug!(
                "Record {} labelled {:?} but scores {:?} highest",
                record.id,
                record.topic,
                record.top_topic_score().map(|t| t.name.as_str())
            );
        }
        info!(
            "Query #{} ready: {} records, {} topics",
            ticket.sequence(),
            view.records.len(),
            view.topics.len()
        );

        Ok(QueryOutcome::Ready(view))
    }
}
