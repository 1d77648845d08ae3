//! Application layer - Use cases and orchestration.
//!
//! Services here depend on domain ports (traits) rather than concrete
//! implementations; infrastructure adapters are injected at startup.

pub mod services;

pub use services::{
    BatchReport, ChatPrompts, ChatService, ChatSettings, DocumentService, UploadedFile,
};
