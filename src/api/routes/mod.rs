pub mod chat;
pub mod documents;
pub mod health;

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method};
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::api::{middleware::request_logger, state::AppState};

pub fn create_router(state: AppState) -> Router {
    let cors = build_cors(&state.config.config.cors.allowed_origins);
    let body_limit = state.config.config.server.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_check))
        .nest("/api/v1", api_v1_routes())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(middleware::from_fn(request_logger))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn build_cors(origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT]);

    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        cors.allow_origin(Any)
    } else {
        // Credentials are only allowed with an explicit origin list.
        let origins: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
        cors.allow_origin(origins).allow_credentials(true)
    }
}

fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/documents/upload", post(documents::upload_documents))
        .route("/documents", get(documents::list_documents))
        .route("/documents/search", get(documents::search_documents))
        .route(
            "/documents/{id}",
            get(documents::get_document).delete(documents::delete_document),
        )
        .route("/chat", post(chat::chat_handler))
        .route("/chat/batches", get(chat::list_batches))
        .route("/chat/batches/{job_id}", get(chat::get_batch_status))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::{ChatService, DocumentService};
    use crate::infrastructure::{AppConfig, JsonDocumentStore, TextExtractor};
    use crate::testing::RecordingProvider;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::Value;
    use std::sync::Arc;
    use tower::ServiceExt;

    const BOUNDARY: &str = "doc-chat-test-boundary";

    struct Harness {
        app: Router,
        provider: Arc<RecordingProvider>,
        _dir: tempfile::TempDir,
    }

    async fn harness() -> Harness {
        harness_with(AppConfig::default()).await
    }

    async fn harness_with(mut config: AppConfig) -> Harness {
        let dir = tempfile::tempdir().unwrap();
        config.config.storage.batch_dir = dir.path().join("batch_files");

        let store = JsonDocumentStore::open(dir.path().join("storage/documents.json"))
            .await
            .unwrap();
        let documents = DocumentService::new(
            Arc::new(store),
            Arc::new(TextExtractor::new()),
            dir.path().join("uploads"),
        );
        let provider = Arc::new(RecordingProvider::new().with_answer("It says hello."));
        let chat = ChatService::new(provider.clone(), config.chat_settings());

        let state = AppState::new(Arc::new(documents), Arc::new(chat), config);
        Harness {
            app: create_router(state),
            provider,
            _dir: dir,
        }
    }

    fn multipart(files: &[(&str, &str, &str)]) -> Request<Body> {
        let mut body = String::new();
        for (name, content_type, content) in files {
            body.push_str(&format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"files\"; filename=\"{name}\"\r\nContent-Type: {content_type}\r\n\r\n{content}\r\n"
            ));
        }
        body.push_str(&format!("--{BOUNDARY}--\r\n"));

        Request::builder()
            .method("POST")
            .uri("/api/v1/documents/upload")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn json_post(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    #[tokio::test]
    async fn test_upload_then_list_and_fetch() {
        let h = harness().await;

        let (status, body) = send(&h.app, multipart(&[("hello.txt", "text/plain", "hello")])).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Successfully uploaded 1 files");
        assert_eq!(body["files"][0]["filename"], "hello.txt");
        assert_eq!(body["files"][0]["size"], 5);
        let id = body["files"][0]["id"].as_str().unwrap().to_string();

        let (status, body) = send(&h.app, get("/api/v1/documents")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["documents"].as_array().unwrap().len(), 1);
        assert_eq!(body["documents"][0]["id"], id.as_str());

        let (status, body) = send(&h.app, get(&format!("/api/v1/documents/{id}"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["text"], "hello");
        assert_eq!(body["extraction"], "ok");
    }

    #[tokio::test]
    async fn test_upload_rejects_unsupported_extension() {
        let h = harness().await;

        let (status, body) = send(
            &h.app,
            multipart(&[
                ("notes.txt", "text/plain", "fine"),
                ("setup.exe", "application/octet-stream", "MZ"),
            ]),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["detail"].as_str().unwrap().contains("setup.exe"));

        let (_, body) = send(&h.app, get("/api/v1/documents")).await;
        assert!(body["documents"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upload_over_body_limit_is_payload_too_large() {
        let mut config = AppConfig::default();
        config.config.server.max_upload_bytes = 1024;
        let h = harness_with(config).await;

        let big = "x".repeat(8 * 1024);
        let (status, body) = send(&h.app, multipart(&[("big.txt", "text/plain", big.as_str())])).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);

        let (_, listed) = send(&h.app, get("/api/v1/documents")).await;
        assert!(listed["documents"].as_array().unwrap().is_empty());
        assert!(body.is_null() || body["detail"].is_string());
    }

    #[tokio::test]
    async fn test_delete_twice_returns_not_found() {
        let h = harness().await;
        let (_, body) = send(&h.app, multipart(&[("a.txt", "text/plain", "a")])).await;
        let id = body["files"][0]["id"].as_str().unwrap().to_string();

        let delete = || {
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/v1/documents/{id}"))
                .body(Body::empty())
                .unwrap()
        };

        let (status, body) = send(&h.app, delete()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Document deleted successfully");

        let (status, body) = send(&h.app, delete()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["detail"].is_string());
    }

    #[tokio::test]
    async fn test_malformed_id_is_not_found() {
        let h = harness().await;
        let (status, _) = send(&h.app, get("/api/v1/documents/not-a-uuid")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = send(&h.app, get("/api/v1/chat/batches/not-a-uuid")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_search_matches_filename_and_text() {
        let h = harness().await;
        send(
            &h.app,
            multipart(&[
                ("budget.txt", "text/plain", "numbers"),
                ("notes.txt", "text/plain", "see the Budget"),
                ("misc.txt", "text/plain", "nothing"),
            ]),
        )
        .await;

        let (status, body) = send(&h.app, get("/api/v1/documents/search?q=BUDGET")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["documents"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_health_reports_document_count() {
        let h = harness().await;
        send(&h.app, multipart(&[("a.txt", "text/plain", "a")])).await;

        for uri in ["/health", "/api/v1/health"] {
            let (status, body) = send(&h.app, get(uri)).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["status"], "healthy");
            assert_eq!(body["documents_count"], 1);
        }
    }

    #[tokio::test]
    async fn test_chat_without_documents_skips_provider() {
        let h = harness().await;

        let (status, body) = send(
            &h.app,
            json_post("/api/v1/chat", serde_json::json!({ "message": "hi" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["response"]
            .as_str()
            .unwrap()
            .contains("upload some documents"));
        assert!(body["sources"].as_array().unwrap().is_empty());
        assert!(h.provider.calls().is_empty());
    }

    #[tokio::test]
    async fn test_chat_answers_with_sources() {
        let h = harness().await;
        send(&h.app, multipart(&[("hello.txt", "text/plain", "hello")])).await;

        let (status, body) = send(
            &h.app,
            json_post(
                "/api/v1/chat",
                serde_json::json!({ "message": "what does it say?", "user_id": "u1" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["response"], "It says hello.");
        assert_eq!(body["sources"], serde_json::json!(["hello.txt"]));
        assert_eq!(h.provider.completion_count(), 1);
    }

    #[tokio::test]
    async fn test_chat_rejects_blank_message() {
        let h = harness().await;
        let (status, _) = send(
            &h.app,
            json_post("/api/v1/chat", serde_json::json!({ "message": "   " })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_batch_job_is_listed_and_polled() {
        let h = harness().await;
        let files: Vec<(String, String)> = (0..6)
            .map(|i| (format!("doc{i}.txt"), format!("content {i}")))
            .collect();
        let parts: Vec<(&str, &str, &str)> = files
            .iter()
            .map(|(n, c)| (n.as_str(), "text/plain", c.as_str()))
            .collect();
        send(&h.app, multipart(&parts)).await;

        let (status, body) = send(
            &h.app,
            json_post("/api/v1/chat", serde_json::json!({ "message": "summarise" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["sources"].as_array().unwrap().len(), 6);
        assert_eq!(h.provider.batch_submissions(), 1);

        let (status, body) = send(&h.app, get("/api/v1/chat/batches")).await;
        assert_eq!(status, StatusCode::OK);
        let job_id = body[0]["job_id"].as_str().unwrap().to_string();
        assert_eq!(body[0]["document_count"], 6);

        let (status, body) = send(&h.app, get(&format!("/api/v1/chat/batches/{job_id}"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "pending");
        assert_eq!(body["provider_status"], "validating");
        assert!(body["results"].is_null());
    }
}
