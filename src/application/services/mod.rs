mod chat;
mod document;

pub use chat::{BatchReport, ChatPrompts, ChatService, ChatSettings};
pub use document::{DocumentService, UploadedFile};
