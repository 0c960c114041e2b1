//! Handlers for the `/api/events` resource.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiResult;
use crate::api::state::AppState;
use crate::core::event::{self, EventPatch, EventView, NewEvent, StaffNeed};
use crate::core::payment::{self, BatchOutcome, PaymentSummary};
use crate::core::status;
use crate::entities::event_staff;

/// POST /api/events
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<NewEvent>,
) -> ApiResult<(StatusCode, Json<EventView>)> {
    let created = event::create_event(&state.db, input).await?;
    Ok((StatusCode::CREATED, Json(EventView::new(created, status::today()))))
}

/// GET /api/events
pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<EventView>>> {
    let today = status::today();
    let events = event::list_events(&state.db).await?;
    Ok(Json(
        events
            .into_iter()
            .map(|e| EventView::new(e, today))
            .collect(),
    ))
}

/// GET /api/events/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<EventView>> {
    let found = event::require_event(&state.db, id).await?;
    Ok(Json(EventView::new(found, status::today())))
}

/// PATCH /api/events/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(patch): Json<EventPatch>,
) -> ApiResult<Json<EventView>> {
    let updated = event::update_event(&state.db, id, patch).await?;
    Ok(Json(EventView::new(updated, status::today())))
}

/// DELETE /api/events/{id}
pub async fn delete(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<StatusCode> {
    event::delete_event(&state.db, &state.storage, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Ids rewritten by a finalize pass.
#[derive(Debug, Serialize)]
pub struct FinalizeResponse {
    /// Events now stored as finished
    pub finalized: Vec<i64>,
}

/// POST /api/events/finalize
pub async fn finalize(State(state): State<AppState>) -> ApiResult<Json<FinalizeResponse>> {
    let finalized = status::finalize_past_events(&state.db, status::today()).await?;
    Ok(Json(FinalizeResponse { finalized }))
}

/// GET /api/events/{id}/staff
pub async fn get_staff(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Vec<event_staff::Model>>> {
    event::require_event(&state.db, id).await?;
    Ok(Json(event::get_staff(&state.db, id).await?))
}

/// PUT /api/events/{id}/staff
pub async fn set_staff(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(needs): Json<Vec<StaffNeed>>,
) -> ApiResult<Json<Vec<event_staff::Model>>> {
    Ok(Json(event::set_staff(&state.db, id, &needs).await?))
}

/// GET /api/events/{id}/payments
pub async fn payment_summary(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<PaymentSummary>> {
    event::require_event(&state.db, id).await?;
    Ok(Json(payment::payment_summary(&state.db, id).await?))
}

/// Body of a whole-category payment request.
#[derive(Debug, Deserialize)]
pub struct TeamPaymentsRequest {
    /// Category whose members get paid
    pub category_id: i64,
    /// Amount for people without their own value
    #[serde(default)]
    pub default_amount: Option<f64>,
}

/// POST /api/events/{id}/payments/team
pub async fn create_team_payments(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<TeamPaymentsRequest>,
) -> ApiResult<(StatusCode, Json<BatchOutcome>)> {
    let outcome =
        payment::create_team_payments(&state.db, id, input.category_id, input.default_amount)
            .await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}
