use doc_chat::api::{create_router, AppState};
use doc_chat::application::{ChatService, DocumentService};
use doc_chat::infrastructure::{AppConfig, JsonDocumentStore, OpenAiProvider, TextExtractor};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "api=debug,doc_chat=debug,tower_http=debug".into());
    let json_logs = std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));

    if json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    let config = AppConfig::load()?;
    let storage = &config.config.storage;

    let store = JsonDocumentStore::open(&storage.documents_file).await?;
    let document_service = DocumentService::new(
        Arc::new(store),
        Arc::new(TextExtractor::new()),
        storage.upload_dir.clone(),
    );
    info!(upload_dir = %storage.upload_dir.display(), "document service initialized");

    let provider = OpenAiProvider::new(&config.config.llm)?;
    info!(model = %config.config.llm.model, "LLM provider initialized");
    let chat_service = ChatService::new(Arc::new(provider), config.chat_settings());

    let addr = SocketAddr::new(config.config.server.host.parse()?, config.config.server.port);
    let state = AppState::new(Arc::new(document_service), Arc::new(chat_service), config);
    let app = create_router(state);

    info!("API server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
