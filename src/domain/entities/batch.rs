use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const BATCH_ENDPOINT: &str = "/v1/chat/completions";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    Pending,
    InProgress,
    Completed,
    Error,
}

impl BatchStatus {
    /// Maps an OpenAI batch status string onto the local lifecycle.
    pub fn from_provider(status: &str) -> Self {
        match status {
            "validating" => Self::Pending,
            "in_progress" | "finalizing" => Self::InProgress,
            "completed" => Self::Completed,
            "failed" | "expired" | "cancelling" | "cancelled" => Self::Error,
            _ => Self::Pending,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Error => "error",
        }
    }
}

/// Snapshot of a batch as reported by the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderBatch {
    pub id: String,
    pub status: String,
    pub output_file_id: Option<String>,
    pub error_file_id: Option<String>,
    pub errors: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchJob {
    pub job_id: Uuid,
    pub status: BatchStatus,
    pub provider_batch_id: String,
    pub input_file_id: String,
    pub output_file_id: Option<String>,
    pub error_message: Option<String>,
    pub document_count: usize,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl BatchJob {
    pub fn new(
        job_id: Uuid,
        input_file_id: impl Into<String>,
        batch: &ProviderBatch,
        document_count: usize,
    ) -> Self {
        Self {
            job_id,
            status: BatchStatus::from_provider(&batch.status),
            provider_batch_id: batch.id.clone(),
            input_file_id: input_file_id.into(),
            output_file_id: None,
            error_message: None,
            document_count,
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    pub fn complete(&mut self, output_file_id: impl Into<String>) {
        self.status = BatchStatus::Completed;
        self.output_file_id = Some(output_file_id.into());
        self.completed_at = Some(Utc::now());
    }

    pub fn fail(&mut self, error: impl Into<String>) {
        self.status = BatchStatus::Error;
        self.error_message = Some(error.into());
        self.completed_at = Some(Utc::now());
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchRequestBody {
    pub model: String,
    pub messages: Vec<BatchMessage>,
    pub max_tokens: u64,
}

/// One line of a batch input file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchRequestLine {
    pub custom_id: String,
    pub method: String,
    pub url: String,
    pub body: BatchRequestBody,
}

impl BatchRequestLine {
    pub fn chat(
        index: usize,
        document_id: Uuid,
        model: impl Into<String>,
        system: impl Into<String>,
        user: impl Into<String>,
        max_tokens: u64,
    ) -> Self {
        Self {
            custom_id: format!("doc_{index}_{document_id}"),
            method: "POST".to_string(),
            url: BATCH_ENDPOINT.to_string(),
            body: BatchRequestBody {
                model: model.into(),
                messages: vec![
                    BatchMessage {
                        role: "system".to_string(),
                        content: system.into(),
                    },
                    BatchMessage {
                        role: "user".to_string(),
                        content: user.into(),
                    },
                ],
                max_tokens,
            },
        }
    }
}

/// Serializes request lines as JSON Lines, one record per line.
pub fn to_jsonl(lines: &[BatchRequestLine]) -> serde_json::Result<String> {
    let mut out = String::new();
    for line in lines {
        out.push_str(&serde_json::to_string(line)?);
        out.push('\n');
    }
    Ok(out)
}

/// Parses a batch output file into raw records, skipping blank lines.
pub fn parse_jsonl(content: &str) -> serde_json::Result<Vec<serde_json::Value>> {
    content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(serde_json::from_str)
        .collect()
}
