mod document_store;
mod extraction;
mod llm;

pub use document_store::DocumentStore;
pub use extraction::TextExtraction;
pub use llm::ChatProvider;
