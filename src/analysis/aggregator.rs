//! Record aggregation and statistics.
//!
//! Each aggregator is a pure function over a borrowed record set. They
//! share no state, so callers may run them in any order.

use crate::models::{Record, Sentiment, Urgency};
use serde::Serialize;
use std::collections::HashMap;

/// Number of records sharing one topic label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopicCount {
    pub topic: String,
    pub count: usize,
}

/// Record counts per sentiment category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SentimentSummary {
    pub positive: usize,
    pub negative: usize,
    pub neutral: usize,
}

impl SentimentSummary {
    pub fn count(&self, sentiment: Sentiment) -> usize {
        match sentiment {
            Sentiment::Positive => self.positive,
            Sentiment::Negative => self.negative,
            Sentiment::Neutral => self.neutral,
        }
    }

    pub fn total(&self) -> usize {
        self.positive + self.negative + self.neutral
    }

    /// Share of the total, in percent. Zero when there are no records.
    pub fn percentage(&self, sentiment: Sentiment) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        self.count(sentiment) as f64 * 100.0 / total as f64
    }

    /// Counts in closed-set order.
    pub fn iter(&self) -> impl Iterator<Item = (Sentiment, usize)> + '_ {
        Sentiment::ALL.into_iter().map(move |s| (s, self.count(s)))
    }
}

/// Count and distinct reasons for one urgency category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UrgencyBucket {
    pub count: usize,
    /// Distinct reasons, in first-seen order.
    pub reasons: Vec<String>,
}

impl UrgencyBucket {
    fn add(&mut self, reason: &str) {
        self.count += 1;
        if !self.reasons.iter().any(|r| r == reason) {
            self.reasons.push(reason.to_string());
        }
    }
}

/// Record counts and reasons per urgency category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UrgencySummary {
    pub high: UrgencyBucket,
    pub medium: UrgencyBucket,
    pub low: UrgencyBucket,
}

impl UrgencySummary {
    pub fn bucket(&self, urgency: Urgency) -> &UrgencyBucket {
        match urgency {
            Urgency::High => &self.high,
            Urgency::Medium => &self.medium,
            Urgency::Low => &self.low,
        }
    }

    fn bucket_mut(&mut self, urgency: Urgency) -> &mut UrgencyBucket {
        match urgency {
            Urgency::High => &mut self.high,
            Urgency::Medium => &mut self.medium,
            Urgency::Low => &mut self.low,
        }
    }

    pub fn total(&self) -> usize {
        self.high.count + self.medium.count + self.low.count
    }

    /// Share of the total, in percent. Zero when there are no records.
    pub fn percentage(&self, urgency: Urgency) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        self.bucket(urgency).count as f64 * 100.0 / total as f64
    }

    /// Buckets in closed-set order.
    pub fn iter(&self) -> impl Iterator<Item = (Urgency, &UrgencyBucket)> + '_ {
        Urgency::ALL.into_iter().map(move |u| (u, self.bucket(u)))
    }
}

/// Count records per topic, most frequent first.
///
/// Topics with equal counts keep the order in which they were first seen.
pub fn aggregate_topics<'a, I>(records: I) -> Vec<TopicCount>
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut counts: Vec<TopicCount> = Vec::new();
    let mut index: HashMap<&'a str, usize> = HashMap::new();

    for record in records {
        match index.get(record.topic.as_str()) {
            Some(&i) => counts[i].count += 1,
            None => {
                index.insert(record.topic.as_str(), counts.len());
                counts.push(TopicCount {
                    topic: record.topic.clone(),
                    count: 1,
                });
            }
        }
    }

    // sort_by_key is stable
    counts.sort_by_key(|t| std::cmp::Reverse(t.count));
    counts
}

/// Count records per sentiment category.
pub fn aggregate_sentiment<'a, I>(records: I) -> SentimentSummary
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut summary = SentimentSummary::default();

    for record in records {
        match record.sentiment {
            Sentiment::Positive => summary.positive += 1,
            Sentiment::Negative => summary.negative += 1,
            Sentiment::Neutral => summary.neutral += 1,
        }
    }

    summary
}

/// Count records per urgency category and collect their distinct reasons.
pub fn aggregate_urgency<'a, I>(records: I) -> UrgencySummary
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut summary = UrgencySummary::default();

    for record in records {
        summary
            .bucket_mut(record.urgency)
            .add(&record.urgency_reason);
    }

    summary
}

/// Records whose primary topic is not their highest-scoring topic.
pub fn inconsistent_topics<'a, I>(records: I) -> Vec<&'a Record>
where
    I: IntoIterator<Item = &'a Record>,
{
    records
        .into_iter()
        .filter(|r| !r.topic_is_consistent())
        .collect()
}
