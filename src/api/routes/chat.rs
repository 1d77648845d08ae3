use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::{error::ApiError, state::AppState};
use crate::domain::{BatchJob, DomainError};

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
    pub sources: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct BatchJobResponse {
    pub job_id: Uuid,
    pub status: String,
    pub document_count: usize,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub error: Option<String>,
}

impl From<BatchJob> for BatchJobResponse {
    fn from(job: BatchJob) -> Self {
        Self {
            job_id: job.job_id,
            status: job.status.as_str().to_string(),
            document_count: job.document_count,
            created_at: job.created_at,
            completed_at: job.completed_at,
            error: job.error_message,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BatchStatusResponse {
    #[serde(flatten)]
    pub job: BatchJobResponse,
    pub provider_status: String,
    pub results: Option<Vec<serde_json::Value>>,
}

pub async fn chat_handler(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    if request.message.trim().is_empty() {
        return Err(DomainError::validation("Message must not be empty").into());
    }
    tracing::debug!(user_id = ?request.user_id, "chat request");

    let documents = state.document_service.list().await?;
    let answer = state
        .chat_service
        .answer(&request.message, &documents)
        .await;

    Ok(Json(ChatResponse {
        response: answer.response,
        sources: answer.sources,
        timestamp: answer.timestamp,
    }))
}

pub async fn list_batches(State(state): State<AppState>) -> Json<Vec<BatchJobResponse>> {
    let jobs = state.chat_service.list_batches().await;
    Json(jobs.into_iter().map(BatchJobResponse::from).collect())
}

pub async fn get_batch_status(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<Json<BatchStatusResponse>, ApiError> {
    let job_id: Uuid = job_id
        .parse()
        .map_err(|_| DomainError::not_found(format!("Batch job {job_id} not found")))?;

    let report = state.chat_service.check_batch(job_id).await?;

    Ok(Json(BatchStatusResponse {
        job: report.job.into(),
        provider_status: report.provider_status,
        results: report.results,
    }))
}
