use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;
use tracing::{info, warn};

/// Logs one line per request; 4xx/5xx responses are logged at warn.
pub async fn request_logger(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(request).await;

    let status = response.status().as_u16();
    let duration_ms = started.elapsed().as_millis() as u64;

    if status >= 400 {
        warn!(%method, path, status, duration_ms, "request failed");
    } else {
        info!(%method, path, status, duration_ms, "request completed");
    }

    response
}
