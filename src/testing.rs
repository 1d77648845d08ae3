//! Test doubles shared by unit tests across layers.

use async_trait::async_trait;
use std::sync::Mutex;

use crate::domain::{ports::ChatProvider, CompletionOptions, DomainError, ProviderBatch};

#[derive(Debug, Clone, PartialEq)]
pub enum ProviderCall {
    Complete { system: String, prompt: String },
    UploadBatchFile { filename: String, content: String },
    CreateBatch { input_file_id: String },
    RetrieveBatch { batch_id: String },
    FileContent { file_id: String },
}

/// Records every call and answers from canned values.
pub struct RecordingProvider {
    calls: Mutex<Vec<ProviderCall>>,
    fail: bool,
    answer: String,
    batch_status: Mutex<String>,
    output_file_id: Option<String>,
    output: String,
}

impl Default for RecordingProvider {
    fn default() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail: false,
            answer: "stub answer".to_string(),
            batch_status: Mutex::new("validating".to_string()),
            output_file_id: None,
            output: String::new(),
        }
    }
}

impl RecordingProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn with_answer(mut self, answer: impl Into<String>) -> Self {
        self.answer = answer.into();
        self
    }

    pub fn with_completed_output(mut self, file_id: &str, output: &str) -> Self {
        self.output_file_id = Some(file_id.to_string());
        self.output = output.to_string();
        self
    }

    pub fn set_batch_status(&self, status: &str) {
        *self.batch_status.lock().unwrap() = status.to_string();
    }

    pub fn calls(&self) -> Vec<ProviderCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn completion_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, ProviderCall::Complete { .. }))
            .count()
    }

    pub fn batch_submissions(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, ProviderCall::CreateBatch { .. }))
            .count()
    }

    fn record(&self, call: ProviderCall) -> Result<(), DomainError> {
        self.calls.lock().unwrap().push(call);
        if self.fail {
            Err(DomainError::external("provider unavailable"))
        } else {
            Ok(())
        }
    }

    fn batch(&self) -> ProviderBatch {
        let status = self.batch_status.lock().unwrap().clone();
        let output_file_id = if status == "completed" {
            self.output_file_id.clone()
        } else {
            None
        };
        ProviderBatch {
            id: "batch_test".to_string(),
            errors: (status == "failed").then(|| "input file invalid".to_string()),
            status,
            output_file_id,
            error_file_id: None,
        }
    }
}

#[async_trait]
impl ChatProvider for RecordingProvider {
    async fn complete(
        &self,
        system: &str,
        prompt: &str,
        _options: CompletionOptions,
    ) -> Result<String, DomainError> {
        self.record(ProviderCall::Complete {
            system: system.to_string(),
            prompt: prompt.to_string(),
        })?;
        Ok(self.answer.clone())
    }

    async fn upload_batch_file(
        &self,
        filename: &str,
        content: Vec<u8>,
    ) -> Result<String, DomainError> {
        self.record(ProviderCall::UploadBatchFile {
            filename: filename.to_string(),
            content: String::from_utf8_lossy(&content).into_owned(),
        })?;
        Ok("file-input".to_string())
    }

    async fn create_batch(&self, input_file_id: &str) -> Result<ProviderBatch, DomainError> {
        self.record(ProviderCall::CreateBatch {
            input_file_id: input_file_id.to_string(),
        })?;
        Ok(self.batch())
    }

    async fn retrieve_batch(&self, batch_id: &str) -> Result<ProviderBatch, DomainError> {
        self.record(ProviderCall::RetrieveBatch {
            batch_id: batch_id.to_string(),
        })?;
        Ok(self.batch())
    }

    async fn file_content(&self, file_id: &str) -> Result<String, DomainError> {
        self.record(ProviderCall::FileContent {
            file_id: file_id.to_string(),
        })?;
        Ok(self.output.clone())
    }
}
