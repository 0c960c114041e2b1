//! Handlers for the `/api/categories` resource.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use crate::api::error::ApiResult;
use crate::api::state::AppState;
use crate::core::category::{self, CategoryPatch, CategoryWithCount, NewCategory};
use crate::entities::category as category_entity;

/// POST /api/categories
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<NewCategory>,
) -> ApiResult<(StatusCode, Json<category_entity::Model>)> {
    let created = category::create_category(&state.db, input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /api/categories
pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<CategoryWithCount>>> {
    Ok(Json(category::list_categories(&state.db).await?))
}

/// PATCH /api/categories/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(patch): Json<CategoryPatch>,
) -> ApiResult<Json<category_entity::Model>> {
    Ok(Json(category::update_category(&state.db, id, patch).await?))
}

/// DELETE /api/categories/{id}
pub async fn delete(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<StatusCode> {
    category::delete_category(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
