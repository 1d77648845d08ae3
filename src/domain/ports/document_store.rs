use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{errors::DomainError, Document};

#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn store(&self, doc: Document) -> Result<(), DomainError>;
    async fn get_all(&self) -> Result<Vec<Document>, DomainError>;
    async fn get(&self, id: Uuid) -> Result<Option<Document>, DomainError>;
    /// Returns `false` when no document had the given id.
    async fn delete(&self, id: Uuid) -> Result<bool, DomainError>;
    async fn search(&self, query: &str) -> Result<Vec<Document>, DomainError>;
    async fn count(&self) -> Result<usize, DomainError>;
}
