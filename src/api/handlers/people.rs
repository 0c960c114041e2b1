//! Handlers for the `/api/people` resource.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::Deserialize;

use crate::api::error::ApiResult;
use crate::api::state::AppState;
use crate::core::person::{self, NewPerson, PersonPatch};
use crate::entities::person as person_entity;

/// Optional filter for the people listing.
#[derive(Debug, Default, Deserialize)]
pub struct PeopleQuery {
    /// Only people of this category
    pub category_id: Option<i64>,
}

/// POST /api/people
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<NewPerson>,
) -> ApiResult<(StatusCode, Json<person_entity::Model>)> {
    let created = person::create_person(&state.db, input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /api/people
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<PeopleQuery>,
) -> ApiResult<Json<Vec<person_entity::Model>>> {
    Ok(Json(person::list_people(&state.db, query.category_id).await?))
}

/// GET /api/people/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<person_entity::Model>> {
    Ok(Json(person::require_person(&state.db, id).await?))
}

/// PATCH /api/people/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(patch): Json<PersonPatch>,
) -> ApiResult<Json<person_entity::Model>> {
    Ok(Json(person::update_person(&state.db, id, patch).await?))
}

/// DELETE /api/people/{id}
pub async fn delete(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<StatusCode> {
    person::delete_person(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
