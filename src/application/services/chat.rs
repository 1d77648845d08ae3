use std::collections::HashMap;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::instrument;
use uuid::Uuid;

use crate::domain::{
    parse_jsonl, ports::ChatProvider, to_jsonl, truncate_chars, BatchJob, BatchRequestLine,
    BatchStatus, ChatAnswer, ChatMode, CompletionOptions, Document, DomainError,
};

/// Prompt templates and canned replies used by [`ChatService`].
#[derive(Debug, Clone)]
pub struct ChatPrompts {
    pub realtime_system: String,
    /// Placeholders: `{context}`, `{question}`.
    pub realtime_user: String,
    pub batch_system: String,
    /// Placeholders: `{filename}`, `{content}`, `{question}`.
    pub batch_user: String,
    pub no_documents: String,
    pub realtime_error: String,
    pub batch_error: String,
    /// Placeholders: `{count}`, `{job_id}`.
    pub batch_processing: String,
}

#[derive(Debug, Clone)]
pub struct ChatSettings {
    pub model: String,
    pub batch_threshold: usize,
    pub realtime_context_chars: usize,
    pub batch_context_chars: usize,
    pub completion: CompletionOptions,
    pub batch_max_tokens: u64,
    pub timeout: Duration,
    pub batch_dir: PathBuf,
    pub prompts: ChatPrompts,
}

/// Result of polling a batch job.
#[derive(Debug, Clone)]
pub struct BatchReport {
    pub job: BatchJob,
    pub provider_status: String,
    pub results: Option<Vec<serde_json::Value>>,
}

/// Answers questions over the stored documents, either with one combined
/// completion or, past the threshold, with a provider-side batch job.
pub struct ChatService {
    provider: Arc<dyn ChatProvider>,
    settings: ChatSettings,
    jobs: RwLock<HashMap<Uuid, BatchJob>>,
}

/// Substitutes `{key}` tokens in one pass over the template. Inserted values
/// are never scanned again; unknown tokens are left as-is.
fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let token = after.find('}').and_then(|end| {
            let key = &after[..end];
            vars.iter()
                .find(|(k, _)| *k == key)
                .map(|(_, value)| (*value, end))
        });

        match token {
            Some((value, end)) => {
                out.push_str(value);
                rest = &after[end + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

fn filenames(documents: &[Document]) -> Vec<String> {
    documents.iter().map(|d| d.filename.clone()).collect()
}

impl ChatService {
    pub fn new(provider: Arc<dyn ChatProvider>, settings: ChatSettings) -> Self {
        Self {
            provider,
            settings,
            jobs: RwLock::new(HashMap::new()),
        }
    }

    pub fn mode_for(&self, document_count: usize) -> ChatMode {
        ChatMode::select(document_count, self.settings.batch_threshold)
    }

    /// Never fails: provider errors come back as an apology with no sources.
    #[instrument(skip(self, message, documents), fields(documents = documents.len()))]
    pub async fn answer(&self, message: &str, documents: &[Document]) -> ChatAnswer {
        if documents.is_empty() {
            return ChatAnswer::without_sources(&self.settings.prompts.no_documents);
        }

        let mode = self.mode_for(documents.len());
        tracing::info!(?mode, "dispatching chat");

        match mode {
            ChatMode::Realtime => self.realtime(message, documents).await.unwrap_or_else(|e| {
                tracing::error!(error = %e, "realtime chat failed");
                ChatAnswer::without_sources(&self.settings.prompts.realtime_error)
            }),
            ChatMode::Batch => self.batch(message, documents).await.unwrap_or_else(|e| {
                tracing::error!(error = %e, "batch chat failed");
                ChatAnswer::without_sources(&self.settings.prompts.batch_error)
            }),
        }
    }

    async fn call<T>(
        &self,
        fut: impl Future<Output = Result<T, DomainError>>,
    ) -> Result<T, DomainError> {
        tokio::time::timeout(self.settings.timeout, fut)
            .await
            .map_err(|_| DomainError::timeout("LLM provider call timed out"))?
    }

    fn realtime_context(&self, documents: &[Document]) -> String {
        documents
            .iter()
            .map(|doc| {
                let text = doc.extracted.context();
                format!(
                    "Document: {}\nContent: {}...",
                    doc.filename,
                    truncate_chars(&text, self.settings.realtime_context_chars)
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    async fn realtime(&self, message: &str, documents: &[Document]) -> Result<ChatAnswer, DomainError> {
        let prompts = &self.settings.prompts;
        let context = self.realtime_context(documents);
        let prompt = render(
            &prompts.realtime_user,
            &[("context", context.as_str()), ("question", message)],
        );

        let response = self
            .call(
                self.provider
                    .complete(&prompts.realtime_system, &prompt, self.settings.completion),
            )
            .await?;

        Ok(ChatAnswer::new(response, filenames(documents)))
    }

    fn batch_lines(&self, message: &str, documents: &[Document]) -> Vec<BatchRequestLine> {
        let prompts = &self.settings.prompts;
        documents
            .iter()
            .enumerate()
            .map(|(i, doc)| {
                let text = doc.extracted.context();
                let user = render(
                    &prompts.batch_user,
                    &[
                        ("filename", doc.filename.as_str()),
                        ("content", truncate_chars(&text, self.settings.batch_context_chars)),
                        ("question", message),
                    ],
                );
                BatchRequestLine::chat(
                    i,
                    doc.id,
                    &self.settings.model,
                    &prompts.batch_system,
                    user,
                    self.settings.batch_max_tokens,
                )
            })
            .collect()
    }

    async fn batch(&self, message: &str, documents: &[Document]) -> Result<ChatAnswer, DomainError> {
        let job_id = Uuid::new_v4();
        let jsonl = to_jsonl(&self.batch_lines(message, documents))?;

        let filename = format!("batch_input_{job_id}.jsonl");
        tokio::fs::create_dir_all(&self.settings.batch_dir).await?;
        tokio::fs::write(self.settings.batch_dir.join(&filename), &jsonl).await?;

        let input_file_id = self
            .call(self.provider.upload_batch_file(&filename, jsonl.into_bytes()))
            .await?;
        let batch = self.call(self.provider.create_batch(&input_file_id)).await?;

        let job = BatchJob::new(job_id, input_file_id, &batch, documents.len());
        tracing::info!(%job_id, provider_batch_id = %batch.id, "batch job submitted");
        self.jobs.write().await.insert(job_id, job);

        let count = documents.len().to_string();
        let job_id = job_id.to_string();
        let response = render(
            &self.settings.prompts.batch_processing,
            &[("count", count.as_str()), ("job_id", job_id.as_str())],
        );
        Ok(ChatAnswer::new(response, filenames(documents)))
    }

    /// Polls the provider for a job. On completion the raw output records
    /// are returned as-is.
    #[instrument(skip(self))]
    pub async fn check_batch(&self, job_id: Uuid) -> Result<BatchReport, DomainError> {
        let job = self
            .jobs
            .read()
            .await
            .get(&job_id)
            .cloned()
            .ok_or_else(|| DomainError::not_found(format!("Batch job {job_id} not found")))?;

        let batch = self
            .call(self.provider.retrieve_batch(&job.provider_batch_id))
            .await?;
        let status = BatchStatus::from_provider(&batch.status);

        let mut results = None;
        if let (BatchStatus::Completed, Some(output_file_id)) = (status, &batch.output_file_id) {
            let content = self.call(self.provider.file_content(output_file_id)).await?;
            results = Some(parse_jsonl(&content)?);
        }

        let mut jobs = self.jobs.write().await;
        let job = jobs
            .get_mut(&job_id)
            .ok_or_else(|| DomainError::not_found(format!("Batch job {job_id} not found")))?;

        match (status, &batch.output_file_id) {
            (BatchStatus::Completed, Some(output_file_id)) => job.complete(output_file_id),
            (BatchStatus::Completed, None) => job.fail("Batch completed without an output file"),
            (BatchStatus::Error, _) => job.fail(
                batch
                    .errors
                    .clone()
                    .unwrap_or_else(|| format!("Batch ended with status {}", batch.status)),
            ),
            (other, _) => job.status = other,
        }
        tracing::info!(%job_id, status = job.status.as_str(), "batch job checked");

        Ok(BatchReport {
            job: job.clone(),
            provider_status: batch.status,
            results,
        })
    }

    /// All recorded jobs, newest first.
    pub async fn list_batches(&self) -> Vec<BatchJob> {
        let mut jobs: Vec<_> = self.jobs.read().await.values().cloned().collect();
        jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        jobs
    }
}
