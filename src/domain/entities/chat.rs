use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatMode {
    Realtime,
    Batch,
}

impl ChatMode {
    /// More than `threshold` documents goes to the batch API.
    pub fn select(document_count: usize, threshold: usize) -> Self {
        if document_count > threshold {
            Self::Batch
        } else {
            Self::Realtime
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatAnswer {
    pub response: String,
    pub sources: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

impl ChatAnswer {
    pub fn new(response: impl Into<String>, sources: Vec<String>) -> Self {
        Self {
            response: response.into(),
            sources,
            timestamp: Utc::now(),
        }
    }

    pub fn without_sources(response: impl Into<String>) -> Self {
        Self::new(response, Vec::new())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletionOptions {
    pub max_tokens: u64,
    pub temperature: f64,
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            max_tokens: 1000,
            temperature: 0.7,
        }
    }
}
