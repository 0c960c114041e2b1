//! Read-only handlers for `/api/diagnostics`.

use axum::Json;
use axum::extract::State;

use crate::api::error::ApiResult;
use crate::api::state::AppState;
use crate::core::status::today;
use crate::diagnostics::{OrphanedSelection, StaleEvent, TableCount, UnpaidTotal};
use crate::entities::event;

/// GET /api/diagnostics/table-counts
pub async fn table_counts(State(state): State<AppState>) -> ApiResult<Json<Vec<TableCount>>> {
    Ok(Json(state.diagnostics.table_counts().await?))
}

/// GET /api/diagnostics/stale-events
pub async fn stale_events(State(state): State<AppState>) -> ApiResult<Json<Vec<StaleEvent>>> {
    Ok(Json(state.diagnostics.stale_event_statuses(today()).await?))
}

/// GET /api/diagnostics/unpaid-totals
pub async fn unpaid_totals(State(state): State<AppState>) -> ApiResult<Json<Vec<UnpaidTotal>>> {
    Ok(Json(state.diagnostics.unpaid_totals_by_event().await?))
}

/// GET /api/diagnostics/orphaned-selections
pub async fn orphaned_selections(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<OrphanedSelection>>> {
    Ok(Json(state.diagnostics.orphaned_selections().await?))
}

/// GET /api/diagnostics/events-without-menu
pub async fn events_without_menu(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<event::Model>>> {
    Ok(Json(state.diagnostics.events_without_menu().await?))
}
