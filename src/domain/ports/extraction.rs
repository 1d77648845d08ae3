use crate::domain::ExtractedText;

/// Turns raw upload bytes into text. Failures are reported through
/// [`ExtractedText`], never as an error.
pub trait TextExtraction: Send + Sync {
    fn extract(&self, filename: &str, content_type: &str, data: &[u8]) -> ExtractedText;
}
