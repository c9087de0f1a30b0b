//! Markdown dashboard generation.
//!
//! This module renders a [`DashboardView`] as a Markdown document with one
//! section per aggregation, or as JSON for downstream tooling.

use crate::analysis::{SentimentSummary, TopicCount, UrgencySummary};
use crate::cli::View;
use crate::dashboard::{DashboardView, QueryFailure};
use crate::models::{Record, Sentiment, Urgency};
use anyhow::Result;

/// Options controlling which sections render and how large they get.
#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    pub view: View,
    pub max_table_rows: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            view: View::All,
            max_table_rows: 50,
        }
    }
}

/// Generate a complete Markdown dashboard.
pub fn generate_markdown_report(view: &DashboardView, options: &RenderOptions) -> String {
    let mut output = String::new();

    output.push_str("# CivicPulse Sentiment Dashboard\n\n");
    output.push_str(&generate_metadata_section(view));

    if options.view.shows(View::Topic) {
        output.push_str(&generate_topic_section(&view.topics));
    }
    if options.view.shows(View::Sentiment) {
        output.push_str(&generate_sentiment_section(&view.sentiment));
    }
    if options.view.shows(View::Urgency) {
        output.push_str(&generate_urgency_section(&view.urgency));
    }
    if options.view.shows(View::Table) {
        output.push_str(&generate_records_section(&view.records, options.max_table_rows));
    }

    output.push_str(&generate_footer());

    output
}

/// Generate the empty-state document for a failed query.
pub fn generate_failure_report(failure: &QueryFailure) -> String {
    let mut output = String::new();

    output.push_str("# CivicPulse Sentiment Dashboard\n\n");
    output.push_str(&format!("- **Hashtags:** {}\n", format_hashtags(&failure.hashtags)));
    output.push_str(&format!("- **Priority Threshold:** {}\n\n", failure.threshold));
    output.push_str(&format!("> ⚠️ {}\n\n", failure.message));
    if let Some(ref cause) = failure.cause {
        output.push_str(&format!("*Cause: {}*\n\n", cause));
    }
    output.push_str("No data to display.\n\n");
    output.push_str(&generate_footer());

    output
}

fn format_hashtags(hashtags: &[String]) -> String {
    hashtags
        .iter()
        .map(|t| format!("#{}", t))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Generate the metadata section.
fn generate_metadata_section(view: &DashboardView) -> String {
    let mut section = String::new();

    section.push_str(&format!("- **Hashtags:** {}\n", format_hashtags(&view.hashtags)));
    section.push_str(&format!("- **Priority Threshold:** {}\n", view.threshold));
    section.push_str(&format!("- **Matching Mentions:** {}\n", view.records.len()));
    section.push_str(&format!("- **Source:** `{}`\n", view.source));
    section.push_str(&format!(
        "- **Generated:** {}\n",
        view.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push('\n');

    section
}

/// Generate the topic distribution section.
fn generate_topic_section(topics: &[TopicCount]) -> String {
    let mut section = String::new();

    section.push_str("## Topic Distribution\n\n");

    if topics.is_empty() {
        section.push_str("No topic data available\n\n");
        return section;
    }

    section.push_str("| Topic | Count |\n");
    section.push_str("|:---|:---:|\n");
    for topic in topics {
        section.push_str(&format!("| {} | {} |\n", escape_cell(&topic.topic), topic.count));
    }
    section.push('\n');

    section
}

/// Generate the sentiment distribution section.
fn generate_sentiment_section(summary: &SentimentSummary) -> String {
    let mut section = String::new();

    section.push_str("## Sentiment Distribution\n\n");

    if summary.total() == 0 {
        section.push_str("No sentiment data available\n\n");
        return section;
    }

    section.push_str("| Sentiment | Mentions | Share |\n");
    section.push_str("|:---|:---:|:---:|\n");
    for (sentiment, count) in summary.iter() {
        section.push_str(&format!(
            "| {} {} | {} | {:.1}% |\n",
            sentiment.emoji(),
            sentiment,
            count,
            summary.percentage(sentiment)
        ));
    }
    section.push('\n');

    section
}

/// Generate the urgency distribution section with grouped reasons.
fn generate_urgency_section(summary: &UrgencySummary) -> String {
    let mut section = String::new();

    section.push_str("## Urgency Distribution\n\n");

    if summary.total() == 0 {
        section.push_str("No urgency data available\n\n");
        return section;
    }

    section.push_str("| Urgency | Mentions | Share |\n");
    section.push_str("|:---|:---:|:---:|\n");
    for (urgency, bucket) in summary.iter() {
        section.push_str(&format!(
            "| {} {} | {} | {:.1}% |\n",
            urgency.emoji(),
            urgency,
            bucket.count,
            summary.percentage(urgency)
        ));
    }
    section.push('\n');

    section.push_str("### Urgency Reasons\n\n");
    for (urgency, bucket) in summary.iter().filter(|(_, b)| !b.reasons.is_empty()) {
        section.push_str(&format!("**{} Urgency**\n\n", urgency));
        for reason in &bucket.reasons {
            section.push_str(&format!("- {}\n", reason));
        }
        section.push('\n');
    }

    section
}

/// Generate the results table.
fn generate_records_section(records: &[Record], max_rows: usize) -> String {
    let mut section = String::new();

    section.push_str("## Results\n\n");

    if records.is_empty() {
        section.push_str("No mentions meet the current priority threshold.\n\n");
        return section;
    }

    section.push_str("| Topic | Sentiment | Urgency | Priority | Timestamp |\n");
    section.push_str("|:---|:---|:---|:---:|:---|\n");
    for record in records.iter().take(max_rows) {
        section.push_str(&format_record_row(record));
    }

    if records.len() > max_rows {
        section.push_str(&format!(
            "\n*Showing {} of {} mentions.*\n",
            max_rows,
            records.len()
        ));
    }
    section.push('\n');

    section
}

fn format_record_row(record: &Record) -> String {
    format!(
        "| {} | {} | {} | {} {} | {} |\n",
        escape_cell(&record.topic),
        sentiment_label(record.sentiment),
        urgency_label(record.urgency),
        record.priority_band().emoji(),
        record.priority_score,
        record.timestamp.format("%Y-%m-%d %H:%M")
    )
}

/// Keep free text from splitting a Markdown table cell.
fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}

fn sentiment_label(sentiment: Sentiment) -> String {
    format!("{} {}", sentiment.emoji(), sentiment)
}

fn urgency_label(urgency: Urgency) -> String {
    format!("{} {}", urgency.emoji(), urgency)
}

/// Generate the report footer.
fn generate_footer() -> String {
    "---\n\n*Generated by CivicPulse*\n".to_string()
}

/// Generate a JSON dashboard.
pub fn generate_json_report(view: &DashboardView) -> Result<String> {
    serde_json::to_string_pretty(view).map_err(Into::into)
}

/// Generate a JSON document for a failed query.
pub fn generate_json_failure(failure: &QueryFailure) -> Result<String> {
    let value = serde_json::json!({
        "success": false,
        "failure": failure,
    });
    serde_json::to_string_pretty(&value).map_err(Into::into)
}
