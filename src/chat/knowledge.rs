//! Offline answers used when the chat API is unavailable.

use serde::{Deserialize, Serialize};

/// Canned answer triggered by any of its keywords.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeEntry {
    pub keywords: Vec<String>,
    pub answer: String,
}

/// Keyword lookup over a list of canned answers.
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    entries: Vec<KnowledgeEntry>,
    fallback: String,
}

impl KnowledgeBase {
    pub fn new(entries: Vec<KnowledgeEntry>, fallback: impl Into<String>) -> Self {
        Self {
            entries,
            fallback: fallback.into(),
        }
    }

    /// First entry with a keyword contained in the question, else the fallback.
    pub fn answer(&self, question: &str) -> &str {
        let lower = question.to_lowercase();
        self.entries
            .iter()
            .find(|entry| {
                entry
                    .keywords
                    .iter()
                    .any(|k| !k.is_empty() && lower.contains(&k.to_lowercase()))
            })
            .map_or(self.fallback.as_str(), |entry| entry.answer.as_str())
    }
}

pub fn default_entries() -> Vec<KnowledgeEntry> {
    vec![
        KnowledgeEntry {
            keywords: vec!["education".into(), "school".into(), "teacher".into()],
            answer: "Education concerns usually go to your local school board or district \
                     education office. Public board meetings are the best place to raise them."
                .into(),
        },
        KnowledgeEntry {
            keywords: vec!["health".into(), "hospital".into(), "clinic".into()],
            answer: "For public health issues, contact your municipal health department. \
                     Urgent medical needs should go to the nearest hospital or emergency line."
                .into(),
        },
        KnowledgeEntry {
            keywords: vec!["transport".into(), "bus".into(), "road".into(), "traffic".into()],
            answer: "Road and transit problems can be reported to the city transport authority, \
                     most of which accept complaints online or through a helpline."
                .into(),
        },
    ]
}

pub fn default_fallback() -> String {
    "Sorry, I couldn't find a matching topic. Try asking about education, health, transport, etc."
        .to_string()
}
