//! Handlers for the `/api/payments` resource.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use crate::api::error::ApiResult;
use crate::api::state::AppState;
use crate::core::payment::{self, NewPayment, PaymentPatch};
use crate::entities::payment as payment_entity;

/// POST /api/payments
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<NewPayment>,
) -> ApiResult<(StatusCode, Json<payment_entity::Model>)> {
    let created = payment::create_payment(&state.db, input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// PATCH /api/payments/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(patch): Json<PaymentPatch>,
) -> ApiResult<Json<payment_entity::Model>> {
    Ok(Json(payment::update_payment(&state.db, id, patch).await?))
}

/// DELETE /api/payments/{id}
pub async fn delete(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<StatusCode> {
    payment::delete_payment(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
