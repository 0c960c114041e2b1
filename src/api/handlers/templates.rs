//! Handlers for contract and budget templates and their filled instances.
//!
//! Both families share these handlers; the router picks the family with an
//! `Extension<TemplateKind>` layer. Template and generated files are sent as
//! the raw request body.

use std::collections::BTreeMap;

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::Deserialize;

use crate::api::error::ApiResult;
use crate::api::state::AppState;
use crate::core::status::today;
use crate::core::template::{self, FieldData, FilledTemplate, NewTemplate, Template, TemplateKind};
use crate::entities::WorkflowStatus;

/// Query string of a template upload.
#[derive(Debug, Deserialize)]
pub struct TemplateUpload {
    /// Template name
    pub name: String,
    /// Comma separated form field names
    pub fields: String,
    /// Stored file name, defaults to `template.pdf`
    pub file_name: Option<String>,
}

impl TemplateUpload {
    fn into_parts(self) -> (NewTemplate, String) {
        let field_names = self.fields.split(',').map(ToString::to_string).collect();
        let file_name = self
            .file_name
            .unwrap_or_else(|| "template.pdf".to_string());
        (
            NewTemplate {
                name: self.name,
                field_names,
            },
            file_name,
        )
    }
}

/// Body of a fill request.
#[derive(Debug, Deserialize)]
pub struct FillRequest {
    /// Template to fill
    pub template_id: i64,
    /// Event the data comes from
    pub event_id: i64,
    /// Values that win over the event data
    #[serde(default)]
    pub overrides: BTreeMap<String, String>,
}

/// Body of a status change.
#[derive(Debug, Deserialize)]
pub struct StatusChange {
    /// Target status
    pub status: WorkflowStatus,
}

/// GET /api/{contract,budget}-templates
pub async fn list_templates(
    State(state): State<AppState>,
    Extension(kind): Extension<TemplateKind>,
) -> ApiResult<Json<Vec<Template>>> {
    Ok(Json(template::list_templates(&state.db, kind).await?))
}

/// POST /api/{contract,budget}-templates?name=...&fields=1,2,3
pub async fn upload_template(
    State(state): State<AppState>,
    Extension(kind): Extension<TemplateKind>,
    Query(upload): Query<TemplateUpload>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<Template>)> {
    let (input, file_name) = upload.into_parts();
    let created =
        template::create_template(&state.db, &state.storage, kind, input, &file_name, &body)
            .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// DELETE /api/{contract,budget}-templates/{id}
pub async fn delete_template(
    State(state): State<AppState>,
    Extension(kind): Extension<TemplateKind>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    template::delete_template(&state.db, &state.storage, kind, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/{contracts,budgets}
pub async fn fill(
    State(state): State<AppState>,
    Extension(kind): Extension<TemplateKind>,
    Json(input): Json<FillRequest>,
) -> ApiResult<(StatusCode, Json<FilledTemplate>)> {
    let filled = template::fill_template(
        &state.db,
        kind,
        input.template_id,
        input.event_id,
        input.overrides,
        today(),
    )
    .await?;
    Ok((StatusCode::CREATED, Json(filled)))
}

/// DELETE /api/{contracts,budgets}/{id}
pub async fn delete_filled(
    State(state): State<AppState>,
    Extension(kind): Extension<TemplateKind>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    template::delete_filled(&state.db, &state.storage, kind, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/{contracts,budgets}/{id}/file
pub async fn attach_file(
    State(state): State<AppState>,
    Extension(kind): Extension<TemplateKind>,
    Path(id): Path<i64>,
    body: Bytes,
) -> ApiResult<Json<FilledTemplate>> {
    Ok(Json(
        template::attach_file(&state.db, &state.storage, kind, id, &body).await?,
    ))
}

/// PATCH /api/{contracts,budgets}/{id}/status
pub async fn set_status(
    State(state): State<AppState>,
    Extension(kind): Extension<TemplateKind>,
    Path(id): Path<i64>,
    Json(input): Json<StatusChange>,
) -> ApiResult<Json<FilledTemplate>> {
    Ok(Json(
        template::set_status(&state.db, kind, id, input.status).await?,
    ))
}

/// GET /api/events/{id}/{contracts,budgets}
pub async fn list_for_event(
    State(state): State<AppState>,
    Extension(kind): Extension<TemplateKind>,
    Path(event_id): Path<i64>,
) -> ApiResult<Json<Vec<FilledTemplate>>> {
    Ok(Json(template::list_filled(&state.db, kind, event_id).await?))
}

/// GET /api/events/{id}/{contract,budget}-data
pub async fn record_for_event(
    State(state): State<AppState>,
    Extension(kind): Extension<TemplateKind>,
    Path(event_id): Path<i64>,
) -> ApiResult<Json<FieldData>> {
    Ok(Json(
        template::record_for_event(&state.db, kind, event_id, today()).await?,
    ))
}
