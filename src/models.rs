//! Data models for the sentiment dashboard.
//!
//! This module contains the classified record type, its closed category
//! sets, and the wire shapes exchanged with a sentiment data source.

use crate::error::PipelineError;
use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Sentiment category of a mention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    /// Every category, in closed-set order.
    pub const ALL: [Sentiment; 3] = [Sentiment::Positive, Sentiment::Negative, Sentiment::Neutral];

    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Negative => "negative",
            Sentiment::Neutral => "neutral",
        }
    }

    /// Returns an emoji representation of the sentiment.
    pub fn emoji(&self) -> &'static str {
        match self {
            Sentiment::Positive => "🟢",
            Sentiment::Negative => "🔴",
            Sentiment::Neutral => "⚪",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sentiment::Positive => write!(f, "Positive"),
            Sentiment::Negative => write!(f, "Negative"),
            Sentiment::Neutral => write!(f, "Neutral"),
        }
    }
}

impl FromStr for Sentiment {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Sentiment::ALL
            .into_iter()
            .find(|sentiment| sentiment.as_str() == s)
            .ok_or_else(|| PipelineError::invalid_category("sentiment", s))
    }
}

/// Urgency category of a mention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    High,
    Medium,
    Low,
}

impl Urgency {
    /// Every category, in closed-set order.
    pub const ALL: [Urgency; 3] = [Urgency::High, Urgency::Medium, Urgency::Low];

    pub fn as_str(&self) -> &'static str {
        match self {
            Urgency::High => "high",
            Urgency::Medium => "medium",
            Urgency::Low => "low",
        }
    }

    /// Returns an emoji representation of the urgency.
    pub fn emoji(&self) -> &'static str {
        match self {
            Urgency::High => "🔴",
            Urgency::Medium => "🟡",
            Urgency::Low => "🟢",
        }
    }
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Urgency::High => write!(f, "High"),
            Urgency::Medium => write!(f, "Medium"),
            Urgency::Low => write!(f, "Low"),
        }
    }
}

impl FromStr for Urgency {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Urgency::ALL
            .into_iter()
            .find(|urgency| urgency.as_str() == s)
            .ok_or_else(|| PipelineError::invalid_category("urgency", s))
    }
}

/// Display band of a priority score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriorityBand {
    Low,
    Medium,
    High,
}

impl PriorityBand {
    pub fn from_score(score: u8) -> Self {
        if score >= 70 {
            PriorityBand::High
        } else if score >= 40 {
            PriorityBand::Medium
        } else {
            PriorityBand::Low
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            PriorityBand::Low => "🟢",
            PriorityBand::Medium => "🟡",
            PriorityBand::High => "🔴",
        }
    }
}

/// Confidence of a record in one topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopicScore {
    pub name: String,
    /// Score in `[1, 100]`.
    pub score: u8,
}

/// One classified mention of a tracked hashtag.
///
/// Only built from a [`RawRecord`], which checks every range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub id: String,
    pub hashtag: String,
    pub sentiment: Sentiment,
    pub urgency: Urgency,
    pub urgency_reason: String,
    /// Primary topic label. Not reconciled against `topic_scores`.
    pub topic: String,
    pub topic_scores: Vec<TopicScore>,
    /// Score in `[0, 100]`, compared against the dashboard threshold.
    pub priority_score: u8,
    pub timestamp: DateTime<Utc>,
}

impl Record {
    /// The highest-scoring topic entry; the first one wins on ties.
    pub fn top_topic_score(&self) -> Option<&TopicScore> {
        self.topic_scores
            .iter()
            .reduce(|best, candidate| if candidate.score > best.score { candidate } else { best })
    }

    /// Whether the primary `topic` is also the highest-scoring entry.
    ///
    /// Records without scores are considered consistent.
    pub fn topic_is_consistent(&self) -> bool {
        self.top_topic_score()
            .map_or(true, |top| top.name == self.topic)
    }

    pub fn priority_band(&self) -> PriorityBand {
        PriorityBand::from_score(self.priority_score)
    }
}

/// Topic score as received from a data source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawTopicScore {
    pub name: String,
    pub score: i64,
}

/// Record as received from a data source, before validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawRecord {
    pub id: String,
    pub hashtag: String,
    pub sentiment: String,
    pub urgency: String,
    pub urgency_reason: String,
    pub topic: String,
    #[serde(default)]
    pub topic_scores: Vec<RawTopicScore>,
    pub priority_score: i64,
    pub timestamp: String,
}

impl TryFrom<RawRecord> for Record {
    type Error = PipelineError;

    fn try_from(raw: RawRecord) -> Result<Self, Self::Error> {
        let sentiment = raw.sentiment.parse::<Sentiment>()?;
        let urgency = raw.urgency.parse::<Urgency>()?;

        let priority_score = u8::try_from(raw.priority_score)
            .ok()
            .filter(|score| *score <= 100)
            .ok_or_else(|| PipelineError::PriorityOutOfRange {
                id: raw.id.clone(),
                score: raw.priority_score,
            })?;

        let topic_scores = raw
            .topic_scores
            .into_iter()
            .map(|ts| {
                u8::try_from(ts.score)
                    .ok()
                    .filter(|score| (1..=100).contains(score))
                    .map(|score| TopicScore {
                        name: ts.name.clone(),
                        score,
                    })
                    .ok_or_else(|| PipelineError::TopicScoreOutOfRange {
                        id: raw.id.clone(),
                        topic: ts.name,
                        score: ts.score,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let timestamp = DateTime::parse_from_rfc3339(&raw.timestamp)
            .map(|ts| ts.with_timezone(&Utc))
            .map_err(|_| PipelineError::InvalidTimestamp {
                id: raw.id.clone(),
                value: raw.timestamp.clone(),
            })?;

        Ok(Record {
            id: raw.id,
            hashtag: raw.hashtag,
            sentiment,
            urgency,
            urgency_reason: raw.urgency_reason,
            topic: raw.topic,
            topic_scores,
            priority_score,
            timestamp,
        })
    }
}

/// A request to a sentiment data source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SentimentQuery {
    pub hashtags: Vec<String>,
    pub priority_threshold: u8,
}

impl SentimentQuery {
    /// Build a query, normalizing each hashtag.
    pub fn new<I, S>(hashtags: I, priority_threshold: u8) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut normalized = Vec::new();
        for tag in hashtags {
            let tag = normalize_hashtag(tag.as_ref());
            if tag.is_empty() {
                bail!("Hashtag must not be empty");
            }
            normalized.push(tag);
        }

        if normalized.is_empty() {
            bail!("At least one hashtag is required");
        }

        Ok(Self {
            hashtags: normalized,
            priority_threshold,
        })
    }
}

/// Trim whitespace and strip one leading `#`.
pub fn normalize_hashtag(tag: &str) -> String {
    let tag = tag.trim();
    tag.strip_prefix('#').unwrap_or(tag).trim().to_string()
}

/// Response envelope returned by a sentiment data source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestResponse {
    pub success: bool,
    #[serde(default)]
    pub data: Vec<RawRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl IngestResponse {
    pub fn ok(data: Vec<RawRecord>) -> Self {
        Self {
            success: true,
            data,
            message: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: Vec::new(),
            message: Some(message.into()),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn raw_record(id: &str, sentiment: &str, urgency: &str, priority: i64) -> RawRecord {
        RawRecord {
            id: id.to_string(),
            hashtag: "climate".to_string(),
            sentiment: sentiment.to_string(),
            urgency: urgency.to_string(),
            urgency_reason: "Steady growth in discussion volume".to_string(),
            topic: "Environment".to_string(),
            topic_scores: vec![
                RawTopicScore {
                    name: "Environment".to_string(),
                    score: 88,
                },
                RawTopicScore {
                    name: "Politics".to_string(),
                    score: 41,
                },
            ],
            priority_score: priority,
            timestamp: "2025-04-27T10:15:00Z".to_string(),
        }
    }

    #[test]
    fn test_category_parsing() {
        assert_eq!("positive".parse::<Sentiment>(), Ok(Sentiment::Positive));
        assert_eq!("neutral".parse::<Sentiment>(), Ok(Sentiment::Neutral));
        assert_eq!("high".parse::<Urgency>(), Ok(Urgency::High));
        assert_eq!(
            "mixed".parse::<Sentiment>(),
            Err(PipelineError::invalid_category("sentiment", "mixed"))
        );
        assert_eq!(
            "urgent".parse::<Urgency>(),
            Err(PipelineError::invalid_category("urgency", "urgent"))
        );
    }

    #[test]
    fn test_category_parsing_is_exact() {
        for value in ["Neutral", "POSITIVE", " negative", "negative "] {
            assert_eq!(
                value.parse::<Sentiment>(),
                Err(PipelineError::invalid_category("sentiment", value))
            );
        }
        for value in ["HIGH", "Low", " medium ", ""] {
            assert_eq!(
                value.parse::<Urgency>(),
                Err(PipelineError::invalid_category("urgency", value))
            );
        }

        let err = Record::try_from(raw_record("p1", "POSITIVE", " High ", 50)).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidCategory { field: "sentiment", .. }));
    }

    #[test]
    fn test_priority_band() {
        assert_eq!(PriorityBand::from_score(0), PriorityBand::Low);
        assert_eq!(PriorityBand::from_score(39), PriorityBand::Low);
        assert_eq!(PriorityBand::from_score(40), PriorityBand::Medium);
        assert_eq!(PriorityBand::from_score(69), PriorityBand::Medium);
        assert_eq!(PriorityBand::from_score(70), PriorityBand::High);
        assert_eq!(PriorityBand::from_score(100), PriorityBand::High);
    }

    #[test]
    fn test_record_conversion() {
        let record = Record::try_from(raw_record("climate-1", "negative", "medium", 55)).unwrap();
        assert_eq!(record.sentiment, Sentiment::Negative);
        assert_eq!(record.urgency, Urgency::Medium);
        assert_eq!(record.priority_score, 55);
        assert_eq!(record.topic_scores.len(), 2);
        assert_eq!(record.priority_band(), PriorityBand::Medium);
    }

    #[test]
    fn test_record_conversion_rejects_bad_data() {
        let err = Record::try_from(raw_record("a", "furious", "low", 10)).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidCategory { field: "sentiment", .. }));

        let err = Record::try_from(raw_record("b", "neutral", "critical", 10)).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidCategory { field: "urgency", .. }));

        let err = Record::try_from(raw_record("c", "neutral", "low", 101)).unwrap_err();
        assert_eq!(
            err,
            PipelineError::PriorityOutOfRange {
                id: "c".to_string(),
                score: 101
            }
        );

        let err = Record::try_from(raw_record("d", "neutral", "low", -1)).unwrap_err();
        assert!(matches!(err, PipelineError::PriorityOutOfRange { score: -1, .. }));

        let mut raw = raw_record("e", "neutral", "low", 10);
        raw.topic_scores[1].score = 0;
        let err = Record::try_from(raw).unwrap_err();
        assert!(matches!(err, PipelineError::TopicScoreOutOfRange { score: 0, .. }));

        let mut raw = raw_record("f", "neutral", "low", 10);
        raw.timestamp = "yesterday".to_string();
        let err = Record::try_from(raw).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidTimestamp { .. }));
    }

    #[test]
    fn test_wire_json_goes_through_validation() {
        let json = r#"{"id":"w1","hashtag":"climate","sentiment":"neutral","urgency":"low",
            "urgency_reason":"Minimal activity or change in engagement","topic":"Health",
            "topic_scores":[],"priority_score":255,"timestamp":"2025-04-27T08:00:00Z"}"#;
        let raw: RawRecord = serde_json::from_str(json).unwrap();
        let err = Record::try_from(raw).unwrap_err();
        assert!(matches!(err, PipelineError::PriorityOutOfRange { score: 255, .. }));
    }

    #[test]
    fn test_topic_may_disagree_with_top_score() {
        let mut raw = raw_record("g", "positive", "low", 20);
        raw.topic = "Sports".to_string();
        let record = Record::try_from(raw).unwrap();

        // The primary topic is kept as-is even when another entry scores higher.
        assert_eq!(record.topic, "Sports");
        assert_eq!(record.top_topic_score().map(|t| t.name.as_str()), Some("Environment"));
        assert!(!record.topic_is_consistent());
    }

    #[test]
    fn test_top_topic_score_tie_keeps_first() {
        let mut raw = raw_record("h", "positive", "low", 20);
        raw.topic_scores[1].score = 88;
        let record = Record::try_from(raw).unwrap();
        assert_eq!(record.top_topic_score().map(|t| t.name.as_str()), Some("Environment"));
        assert!(record.topic_is_consistent());
    }

    #[test]
    fn test_query_normalizes_hashtags() {
        let query = SentimentQuery::new(["#climate", "  Budget2025 "], 40).unwrap();
        assert_eq!(query.hashtags, vec!["climate", "Budget2025"]);
        assert_eq!(query.priority_threshold, 40);

        assert!(SentimentQuery::new(["#"], 0).is_err());
        assert!(SentimentQuery::new(Vec::<String>::new(), 0).is_err());
    }

    #[test]
    fn test_ingest_response_parsing() {
        let json = r#"{"success": false, "message": "Backend unavailable"}"#;
        let response: IngestResponse = serde_json::from_str(json).unwrap();
        assert!(!response.success);
        assert!(response.data.is_empty());
        assert_eq!(response.message.as_deref(), Some("Backend unavailable"));
    }
}
