use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Extensions accepted on upload, lowercase and without the dot.
pub const ALLOWED_EXTENSIONS: &[&str] = &["pdf", "doc", "docx", "txt"];

pub const UNSUPPORTED_SENTINEL: &str = "Unsupported file type for text extraction";

/// Outcome of running text extraction over an uploaded file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExtractedText {
    Text { text: String },
    Failed { reason: String },
    Unsupported,
}

impl ExtractedText {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        Self::Failed {
            reason: reason.into(),
        }
    }

    /// The extracted text, if extraction succeeded.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { text } => Some(text),
            _ => None,
        }
    }

    pub fn status(&self) -> &'static str {
        match self {
            Self::Text { .. } => "ok",
            Self::Failed { .. } => "failed",
            Self::Unsupported => "unsupported",
        }
    }

    /// Text placed into prompts. Failures are rendered as a marker rather
    /// than passed off as document content.
    pub fn context(&self) -> String {
        match self {
            Self::Text { text } => text.clone(),
            Self::Failed { reason } => format!("[text unavailable: {reason}]"),
            Self::Unsupported => format!("[{UNSUPPORTED_SENTINEL}]"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: Uuid,
    pub filename: String,
    pub file_path: PathBuf,
    pub content_type: String,
    pub size: u64,
    pub upload_date: DateTime<Utc>,
    pub extracted: ExtractedText,
}

impl Document {
    pub fn new(id: Uuid, filename: impl Into<String>, file_path: impl Into<PathBuf>) -> Self {
        Self {
            id,
            filename: filename.into(),
            file_path: file_path.into(),
            content_type: "application/octet-stream".to_string(),
            size: 0,
            upload_date: Utc::now(),
            extracted: ExtractedText::Unsupported,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.size = size;
        self
    }

    pub fn with_extracted(mut self, extracted: ExtractedText) -> Self {
        self.extracted = extracted;
        self
    }

    pub fn text(&self) -> Option<&str> {
        self.extracted.as_text()
    }

    /// Case-insensitive substring match on filename or extracted text.
    /// `needle` must already be lowercased.
    pub fn matches(&self, needle: &str) -> bool {
        self.filename.to_lowercase().contains(needle)
            || self
                .text()
                .is_some_and(|t| t.to_lowercase().contains(needle))
    }
}

/// Lowercased extension of `filename`, without the dot.
pub fn file_extension(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
}

pub fn is_allowed_extension(filename: &str) -> bool {
    file_extension(filename).is_some_and(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()))
}

/// Returns the longest prefix of `text` holding at most `max_chars` characters.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
