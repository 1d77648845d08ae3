use axum::{
    extract::{multipart::MultipartError, Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::{error::ApiError, state::AppState};
use crate::application::UploadedFile;
use crate::domain::{Document, DomainError, ExtractedText};

#[derive(Debug, Serialize)]
pub struct UploadedFileResponse {
    pub id: Uuid,
    pub filename: String,
    pub size: u64,
    pub content_type: String,
    pub extraction: String,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub files: Vec<UploadedFileResponse>,
}

#[derive(Debug, Serialize)]
pub struct DocumentSummary {
    pub id: Uuid,
    pub filename: String,
    pub size: u64,
    pub content_type: String,
    pub upload_date: DateTime<Utc>,
    pub extraction: String,
}

impl From<&Document> for DocumentSummary {
    fn from(doc: &Document) -> Self {
        Self {
            id: doc.id,
            filename: doc.filename.clone(),
            size: doc.size,
            content_type: doc.content_type.clone(),
            upload_date: doc.upload_date,
            extraction: doc.extracted.status().to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DocumentListResponse {
    pub documents: Vec<DocumentSummary>,
}

impl DocumentListResponse {
    fn from_documents(docs: &[Document]) -> Self {
        Self {
            documents: docs.iter().map(DocumentSummary::from).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DocumentDetailResponse {
    #[serde(flatten)]
    pub summary: DocumentSummary,
    pub text: Option<String>,
    pub extraction_error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: String,
}

/// Unparseable ids are reported the same way as unknown ones.
fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    raw.parse()
        .map_err(|_| DomainError::not_found(format!("Document {raw} not found")).into())
}

/// Bodies over the configured limit surface here as a multipart read error.
fn multipart_error(context: &str, err: MultipartError) -> DomainError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        DomainError::too_large(err.body_text())
    } else {
        DomainError::validation(format!("{context}: {err}"))
    }
}

pub async fn upload_documents(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut files = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error("Invalid multipart body", e))?
    {
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };
        let content_type = field.content_type().map(str::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|e| multipart_error(&format!("Failed to read {filename}"), e))?;

        let mut file = UploadedFile::new(filename, data.to_vec());
        if let Some(ct) = content_type {
            file = file.with_content_type(ct);
        }
        files.push(file);
    }

    let documents = state.document_service.ingest_all(files).await?;

    Ok(Json(UploadResponse {
        message: format!("Successfully uploaded {} files", documents.len()),
        files: documents
            .into_iter()
            .map(|doc| UploadedFileResponse {
                id: doc.id,
                size: doc.size,
                extraction: doc.extracted.status().to_string(),
                filename: doc.filename,
                content_type: doc.content_type,
            })
            .collect(),
    }))
}

pub async fn list_documents(
    State(state): State<AppState>,
) -> Result<Json<DocumentListResponse>, ApiError> {
    let docs = state.document_service.list().await?;
    Ok(Json(DocumentListResponse::from_documents(&docs)))
}

pub async fn search_documents(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<DocumentListResponse>, ApiError> {
    let docs = state.document_service.search(&query.q).await?;
    Ok(Json(DocumentListResponse::from_documents(&docs)))
}

pub async fn get_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DocumentDetailResponse>, ApiError> {
    let id = parse_id(&id)?;
    let doc = state
        .document_service
        .get(id)
        .await?
        .ok_or_else(|| DomainError::not_found(format!("Document {id} not found")))?;

    let extraction_error = match &doc.extracted {
        ExtractedText::Failed { reason } => Some(reason.clone()),
        _ => None,
    };

    Ok(Json(DocumentDetailResponse {
        summary: DocumentSummary::from(&doc),
        text: doc.text().map(str::to_string),
        extraction_error,
    }))
}

pub async fn delete_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = parse_id(&id)?;
    state.document_service.delete(id).await?;
    tracing::info!(document_id = %id, "document deleted");

    Ok(Json(MessageResponse {
        message: "Document deleted successfully".to_string(),
    }))
}
