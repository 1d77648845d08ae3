//! Plain-text extraction for uploaded files.
//!
//! Failures never abort an upload: they come back as
//! [`ExtractedText::Failed`] and are stored alongside the document.

mod docx;
mod pdf;
mod text;

use crate::domain::{file_extension, ports::TextExtraction, ExtractedText};

const WORD_CONTENT_TYPES: &[&str] = &[
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    Word,
    PlainText,
}

impl DocumentFormat {
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_lowercase();

        match essence.as_str() {
            "application/pdf" => Some(Self::Pdf),
            ct if WORD_CONTENT_TYPES.contains(&ct) => Some(Self::Word),
            "text/plain" => Some(Self::PlainText),
            _ => None,
        }
    }

    pub fn from_filename(filename: &str) -> Option<Self> {
        match file_extension(filename)?.as_str() {
            "pdf" => Some(Self::Pdf),
            "doc" | "docx" => Some(Self::Word),
            "txt" => Some(Self::PlainText),
            _ => None,
        }
    }

    /// Magic-byte detection for uploads with a generic or missing content type.
    pub fn sniff(data: &[u8]) -> Option<Self> {
        if data.starts_with(b"%PDF-") {
            Some(Self::Pdf)
        } else if data.starts_with(b"PK\x03\x04") {
            Some(Self::Word)
        } else {
            None
        }
    }

    /// Declared content type first, then the extension, then the bytes.
    pub fn resolve(filename: &str, content_type: &str, data: &[u8]) -> Option<Self> {
        Self::from_content_type(content_type)
            .or_else(|| Self::from_filename(filename))
            .or_else(|| Self::sniff(data))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TextExtractor;

impl TextExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl TextExtraction for TextExtractor {
    fn extract(&self, filename: &str, content_type: &str, data: &[u8]) -> ExtractedText {
        let Some(format) = DocumentFormat::resolve(filename, content_type, data) else {
            return ExtractedText::Unsupported;
        };

        let result = match format {
            DocumentFormat::Pdf => pdf::extract(data),
            DocumentFormat::Word => docx::extract(data),
            DocumentFormat::PlainText => Ok(text::decode(data)),
        };

        match result {
            Ok(text) => ExtractedText::text(text),
            Err(reason) => {
                tracing::warn!(filename, ?format, %reason, "text extraction failed");
                ExtractedText::failed(reason)
            }
        }
    }
}
