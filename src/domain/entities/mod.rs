mod batch;
mod chat;
mod document;

pub use batch::{
    parse_jsonl, to_jsonl, BatchJob, BatchMessage, BatchRequestBody, BatchRequestLine,
    BatchStatus, ProviderBatch, BATCH_ENDPOINT,
};
pub use chat::{ChatAnswer, ChatMode, CompletionOptions};
pub use document::{
    file_extension, is_allowed_extension, truncate_chars, Document, ExtractedText,
    ALLOWED_EXTENSIONS, UNSUPPORTED_SENTINEL,
};
