use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::RequestBuilder;
use rig::client::{CompletionClient, ProviderClient};
use rig::completion::Prompt;
use rig::providers::openai;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::domain::{
    ports::ChatProvider, CompletionOptions, DomainError, ProviderBatch, BATCH_ENDPOINT,
};
use crate::infrastructure::config::LlmConfig;

/// OpenAI adapter: chat completions go through rig, the Files and Batch
/// endpoints are called directly.
pub struct OpenAiProvider {
    http: reqwest::Client,
    api_base: String,
    api_key: String,
    model: String,
    completion_window: String,
}

#[derive(Debug, Deserialize)]
struct FileObject {
    id: String,
}

#[derive(Debug, Serialize)]
struct CreateBatchRequest<'a> {
    input_file_id: &'a str,
    endpoint: &'a str,
    completion_window: &'a str,
}

#[derive(Debug, Deserialize)]
struct BatchObject {
    id: String,
    status: String,
    output_file_id: Option<String>,
    error_file_id: Option<String>,
    errors: Option<BatchErrors>,
}

#[derive(Debug, Deserialize)]
struct BatchErrors {
    #[serde(default)]
    data: Vec<BatchErrorItem>,
}

#[derive(Debug, Deserialize)]
struct BatchErrorItem {
    code: Option<String>,
    message: Option<String>,
}

impl From<BatchObject> for ProviderBatch {
    fn from(batch: BatchObject) -> Self {
        let errors = batch
            .errors
            .map(|e| {
                e.data
                    .into_iter()
                    .map(|item| match (item.code, item.message) {
                        (Some(code), Some(msg)) => format!("{code}: {msg}"),
                        (code, msg) => msg.or(code).unwrap_or_default(),
                    })
                    .collect::<Vec<_>>()
                    .join("; ")
            })
            .filter(|s| !s.is_empty());

        Self {
            id: batch.id,
            status: batch.status,
            output_file_id: batch.output_file_id,
            error_file_id: batch.error_file_id,
            errors,
        }
    }
}

impl OpenAiProvider {
    pub fn new(config: &LlmConfig) -> Result<Self, DomainError> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| DomainError::validation("OPENAI_API_KEY is not set"))?;

        Ok(Self {
            http: reqwest::Client::new(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            api_key,
            model: config.model.clone(),
            completion_window: config.completion_window.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.api_base, path)
    }

    async fn send(&self, request: RequestBuilder) -> Result<reqwest::Response, DomainError> {
        let response = request
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| DomainError::external(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DomainError::external(format!(
                "OpenAI returned {status}: {body}"
            )));
        }
        Ok(response)
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, DomainError> {
        self.send(request)
            .await?
            .json()
            .await
            .map_err(|e| DomainError::external(format!("Invalid OpenAI response: {e}")))
    }
}

#[async_trait]
impl ChatProvider for OpenAiProvider {
    async fn complete(
        &self,
        system: &str,
        prompt: &str,
        options: CompletionOptions,
    ) -> Result<String, DomainError> {
        let client = openai::Client::from_env();
        let agent = client
            .agent(&self.model)
            .preamble(system)
            .max_tokens(options.max_tokens)
            .temperature(options.temperature)
            .build();

        agent
            .prompt(prompt)
            .await
            .map_err(|e| DomainError::external(e.to_string()))
    }

    async fn upload_batch_file(
        &self,
        filename: &str,
        content: Vec<u8>,
    ) -> Result<String, DomainError> {
        let part = Part::bytes(content)
            .file_name(filename.to_string())
            .mime_str("application/jsonl")
            .map_err(|e| DomainError::internal(e.to_string()))?;
        let form = Form::new().text("purpose", "batch").part("file", part);

        let file: FileObject = self
            .send_json(self.http.post(self.url("files")).multipart(form))
            .await?;
        tracing::debug!(file_id = %file.id, filename, "batch input uploaded");
        Ok(file.id)
    }

    async fn create_batch(&self, input_file_id: &str) -> Result<ProviderBatch, DomainError> {
        let request = CreateBatchRequest {
            input_file_id,
            endpoint: BATCH_ENDPOINT,
            completion_window: &self.completion_window,
        };
        let batch: BatchObject = self
            .send_json(self.http.post(self.url("batches")).json(&request))
            .await?;
        Ok(batch.into())
    }

    async fn retrieve_batch(&self, batch_id: &str) -> Result<ProviderBatch, DomainError> {
        let batch: BatchObject = self
            .send_json(self.http.get(self.url(&format!("batches/{batch_id}"))))
            .await?;
        Ok(batch.into())
    }

    async fn file_content(&self, file_id: &str) -> Result<String, DomainError> {
        self.send(self.http.get(self.url(&format!("files/{file_id}/content"))))
            .await?
            .text()
            .await
            .map_err(|e| DomainError::external(e.to_string()))
    }
}
