//! Handlers for the `/api/documents` resource.
//!
//! Uploads send the file as the raw request body; metadata travels in the
//! query string.

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, StatusCode};
use serde::Deserialize;

use crate::api::error::ApiResult;
use crate::api::state::AppState;
use crate::core::document;
use crate::entities::document as document_entity;

/// Optional filter for the document listing.
#[derive(Debug, Default, Deserialize)]
pub struct DocumentQuery {
    /// Only documents of this event
    pub event_id: Option<i64>,
}

/// Metadata of an upload.
#[derive(Debug, Deserialize)]
pub struct DocumentUpload {
    /// File name, also the display name
    pub name: String,
    /// Event to attach the document to
    pub event_id: Option<i64>,
}

/// GET /api/documents
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<DocumentQuery>,
) -> ApiResult<Json<Vec<document_entity::Model>>> {
    Ok(Json(document::list_documents(&state.db, query.event_id).await?))
}

/// POST /api/documents?name=...&event_id=...
pub async fn upload(
    State(state): State<AppState>,
    Query(meta): Query<DocumentUpload>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<document_entity::Model>)> {
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string);
    let created = document::upload_document(
        &state.db,
        &state.storage,
        meta.event_id,
        &meta.name,
        content_type,
        &body,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// DELETE /api/documents/{id}
pub async fn delete(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<StatusCode> {
    document::delete_document(&state.db, &state.storage, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
