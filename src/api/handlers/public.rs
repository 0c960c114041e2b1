//! Guest-facing menu selection, reachable with a share token and no session.

use axum::Json;
use axum::extract::{Path, State};
use serde::Serialize;
use tracing::debug;

use crate::api::error::ApiResult;
use crate::api::state::AppState;
use crate::core::selection::{self, PublicMenuView};

/// Result of a toggle.
#[derive(Debug, Serialize)]
pub struct ToggleResponse {
    /// Item that was toggled
    pub item_id: i64,
    /// Membership after the toggle
    pub selected: bool,
}

/// GET /share/{token}
pub async fn view(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> ApiResult<Json<PublicMenuView>> {
    Ok(Json(selection::public_view_by_token(&state.db, &token).await?))
}

/// POST /share/{token}/items/{item_id}/toggle
pub async fn toggle(
    State(state): State<AppState>,
    Path((token, item_id)): Path<(String, i64)>,
) -> ApiResult<Json<ToggleResponse>> {
    let selected = selection::toggle_by_token(&state.db, &token, item_id).await?;
    debug!(item_id, selected, "Guest toggled menu item");
    Ok(Json(ToggleResponse { item_id, selected }))
}
