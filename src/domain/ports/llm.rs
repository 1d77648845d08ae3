use async_trait::async_trait;

use crate::domain::{errors::DomainError, CompletionOptions, ProviderBatch};

/// Chat-completion provider with support for asynchronous batch jobs.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    async fn complete(
        &self,
        system: &str,
        prompt: &str,
        options: CompletionOptions,
    ) -> Result<String, DomainError>;

    /// Uploads a JSONL batch input file and returns the provider file id.
    async fn upload_batch_file(&self, filename: &str, content: Vec<u8>)
        -> Result<String, DomainError>;

    async fn create_batch(&self, input_file_id: &str) -> Result<ProviderBatch, DomainError>;

    async fn retrieve_batch(&self, batch_id: &str) -> Result<ProviderBatch, DomainError>;

    async fn file_content(&self, file_id: &str) -> Result<String, DomainError>;
}
