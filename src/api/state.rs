use std::sync::Arc;

use crate::application::{ChatService, DocumentService};
use crate::infrastructure::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub document_service: Arc<DocumentService>,
    pub chat_service: Arc<ChatService>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(
        document_service: Arc<DocumentService>,
        chat_service: Arc<ChatService>,
        config: AppConfig,
    ) -> Self {
        Self {
            document_service,
            chat_service,
            config: Arc::new(config),
        }
    }
}
