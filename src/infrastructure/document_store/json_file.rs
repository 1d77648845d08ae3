use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::{ports::DocumentStore, Document, DomainError};

/// Document store held in memory and mirrored to a JSON array file.
///
/// Every mutation rewrites the mirror while still holding the write lock, so
/// the file always reflects a state the in-memory list actually had.
pub struct JsonDocumentStore {
    path: PathBuf,
    documents: RwLock<Vec<Document>>,
}

impl JsonDocumentStore {
    /// Loads the mirror at `path`. A missing file yields an empty store; an
    /// unreadable or corrupt one is an error so it never gets overwritten.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, DomainError> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let documents = match tokio::fs::read(&path).await {
            Ok(raw) => serde_json::from_slice::<Vec<Document>>(&raw).map_err(|e| {
                DomainError::internal(format!("corrupt mirror {}: {e}", path.display()))
            })?,
            Err(e) if e.kind() == ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };

        tracing::info!(path = %path.display(), count = documents.len(), "document store loaded");

        Ok(Self {
            path,
            documents: RwLock::new(documents),
        })
    }

    async fn persist(&self, documents: &[Document]) -> Result<(), DomainError> {
        let json = serde_json::to_vec_pretty(documents)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    async fn persist_logged(&self, documents: &[Document]) {
        if let Err(e) = self.persist(documents).await {
            tracing::error!(error = %e, path = %self.path.display(), "failed to save documents");
        }
    }
}

async fn remove_backing_file(doc: &Document) {
    match tokio::fs::remove_file(&doc.file_path).await {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::warn!(document_id = %doc.id, path = %doc.file_path.display(), "backing file already gone");
        }
        Err(e) => {
            tracing::error!(document_id = %doc.id, error = %e, "failed to delete backing file");
        }
    }
}

#[async_trait]
impl DocumentStore for JsonDocumentStore {
    async fn store(&self, doc: Document) -> Result<(), DomainError> {
        let mut documents = self.documents.write().await;
        documents.push(doc);
        self.persist_logged(&documents).await;
        Ok(())
    }

    async fn get_all(&self) -> Result<Vec<Document>, DomainError> {
        Ok(self.documents.read().await.clone())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Document>, DomainError> {
        Ok(self
            .documents
            .read()
            .await
            .iter()
            .find(|d| d.id == id)
            .cloned())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut documents = self.documents.write().await;
        let Some(pos) = documents.iter().position(|d| d.id == id) else {
            return Ok(false);
        };

        let doc = documents.remove(pos);
        remove_backing_file(&doc).await;
        self.persist_logged(&documents).await;
        Ok(true)
    }

    async fn search(&self, query: &str) -> Result<Vec<Document>, DomainError> {
        let needle = query.to_lowercase();
        Ok(self
            .documents
            .read()
            .await
            .iter()
            .filter(|d| d.matches(&needle))
            .cloned()
            .collect())
    }

    async fn count(&self) -> Result<usize, DomainError> {
        Ok(self.documents.read().await.len())
    }
}
