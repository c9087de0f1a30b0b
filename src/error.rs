//! Error types for the filtering and aggregation pipeline.
//!
//! Application-level plumbing (config, I/O, HTTP) uses `anyhow`; the
//! pipeline itself reports data-contract violations through
//! [`PipelineError`] so callers can decide whether to skip or abort.

use thiserror::Error;

/// A record that violates the ingestion data contract.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    /// A sentiment or urgency value outside its closed set.
    #[error("invalid {field} category: '{value}'")]
    InvalidCategory { field: &'static str, value: String },

    /// A priority score outside `[0, 100]`.
    #[error("record '{id}' has priority score {score}, expected 0-100")]
    PriorityOutOfRange { id: String, score: i64 },

    /// A topic score outside `[1, 100]`.
    #[error("record '{id}' scores topic '{topic}' at {score}, expected 1-100")]
    TopicScoreOutOfRange {
        id: String,
        topic: String,
        score: i64,
    },

    /// A timestamp that is not RFC 3339.
    #[error("record '{id}' has an unparseable timestamp: '{value}'")]
    InvalidTimestamp { id: String, value: String },
}

impl PipelineError {
    pub fn invalid_category(field: &'static str, value: impl Into<String>) -> Self {
        Self::InvalidCategory {
            field,
            value: value.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = PipelineError::invalid_category("sentiment", "angry");
        assert_eq!(err.to_string(), "invalid sentiment category: 'angry'");

        let err = PipelineError::PriorityOutOfRange {
            id: "rvu-1".to_string(),
            score: 140,
        };
        assert!(err.to_string().contains("140"));
    }
}
