use std::path::PathBuf;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

use crate::domain::{
    file_extension, is_allowed_extension,
    ports::{DocumentStore, TextExtraction},
    Document, DomainError, ExtractedText,
};

/// A file received from a client, before validation.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

impl UploadedFile {
    pub fn new(filename: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            content_type: None,
            data: data.into(),
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// The declared content type, or one guessed from the filename.
    fn resolved_content_type(&self) -> String {
        self.content_type
            .as_deref()
            .map(str::trim)
            .filter(|ct| !ct.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| {
                mime_guess::from_path(&self.filename)
                    .first_or_octet_stream()
                    .to_string()
            })
    }
}

pub struct DocumentService {
    store: Arc<dyn DocumentStore>,
    extractor: Arc<dyn TextExtraction>,
    upload_dir: PathBuf,
}

impl DocumentService {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        extractor: Arc<dyn TextExtraction>,
        upload_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            store,
            extractor,
            upload_dir: upload_dir.into(),
        }
    }

    /// Validates every file before storing any, so a rejected request
    /// leaves the store untouched.
    #[instrument(skip(self, files), fields(count = files.len()))]
    pub async fn ingest_all(&self, files: Vec<UploadedFile>) -> Result<Vec<Document>, DomainError> {
        if files.is_empty() {
            return Err(DomainError::validation("No files provided"));
        }
        if let Some(bad) = files.iter().find(|f| !is_allowed_extension(&f.filename)) {
            return Err(DomainError::validation(format!(
                "Unsupported file type: {}",
                bad.filename
            )));
        }

        let mut documents = Vec::with_capacity(files.len());
        for file in files {
            documents.push(self.ingest(file).await?);
        }
        Ok(documents)
    }

    #[instrument(skip(self, file), fields(filename = %file.filename, size = file.data.len()))]
    pub async fn ingest(&self, file: UploadedFile) -> Result<Document, DomainError> {
        let extension = match file_extension(&file.filename) {
            Some(ext) if is_allowed_extension(&file.filename) => ext,
            _ => {
                return Err(DomainError::validation(format!(
                    "Unsupported file type: {}",
                    file.filename
                )))
            }
        };

        let id = Uuid::new_v4();
        let file_path = self.upload_dir.join(format!("{id}.{extension}"));
        tokio::fs::create_dir_all(&self.upload_dir).await?;
        tokio::fs::write(&file_path, &file.data).await?;

        let content_type = file.resolved_content_type();
        let size = file.data.len() as u64;
        let extracted = self
            .extract(file.filename.clone(), content_type.clone(), file.data)
            .await;

        let doc = Document::new(id, file.filename, file_path)
            .with_content_type(content_type)
            .with_size(size)
            .with_extracted(extracted);

        self.store.store(doc.clone()).await?;
        tracing::info!(document_id = %doc.id, status = doc.extracted.status(), "document stored");
        Ok(doc)
    }

    async fn extract(&self, filename: String, content_type: String, data: Vec<u8>) -> ExtractedText {
        let extractor = self.extractor.clone();
        tokio::task::spawn_blocking(move || extractor.extract(&filename, &content_type, &data))
            .await
            .unwrap_or_else(|e| ExtractedText::failed(format!("Extraction task failed: {e}")))
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<Document>, DomainError> {
        self.store.get_all().await
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<Option<Document>, DomainError> {
        self.store.get(id).await
    }

    #[instrument(skip(self))]
    pub async fn search(&self, query: &str) -> Result<Vec<Document>, DomainError> {
        self.store.search(query).await
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        if self.store.delete(id).await? {
            Ok(())
        } else {
            Err(DomainError::not_found(format!("Document {id} not found")))
        }
    }

    pub async fn count(&self) -> Result<usize, DomainError> {
        self.store.count().await
    }
}
