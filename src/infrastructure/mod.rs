pub mod config;
pub mod document_store;
pub mod extraction;
pub mod llm;

pub use config::{AppConfig, Config, PromptsConfig};
pub use document_store::JsonDocumentStore;
pub use extraction::{DocumentFormat, TextExtractor};
pub use llm::OpenAiProvider;
