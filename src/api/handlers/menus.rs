//! Handlers for menus, their categories and items, and event links.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::Deserialize;

use crate::api::error::ApiResult;
use crate::api::state::AppState;
use crate::core::event::require_event;
use crate::core::menu::{
    self, MenuCategoryPatch, MenuItemPatch, MenuPatch, MenuTree, NewMenu, NewMenuCategory,
    NewMenuItem,
};
use crate::core::menu_parser::{ParseReport, parse_menu, try_parse_menu};
use crate::core::selection::{PublicMenuView, SelectionSet, build_public_view};
use crate::entities::{event_menu, menu as menu_entity, menu_category, menu_item};

/// Raw menu text as pasted by the user.
#[derive(Debug, Deserialize)]
pub struct MenuText {
    /// Text in the `MENU:` / `CATEGORY:` / `- item` format
    pub text: String,
}

/// Menu to link to an event.
#[derive(Debug, Deserialize)]
pub struct LinkMenu {
    /// Menu id
    pub menu_id: i64,
}

/// GET /api/menus
pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<menu_entity::Model>>> {
    Ok(Json(menu::list_menus(&state.db).await?))
}

/// POST /api/menus
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<NewMenu>,
) -> ApiResult<(StatusCode, Json<menu_entity::Model>)> {
    let created = menu::create_menu(&state.db, input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /api/menus/{id}
pub async fn get_tree(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<MenuTree>> {
    Ok(Json(menu::get_menu_tree(&state.db, id).await?))
}

/// PATCH /api/menus/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(patch): Json<MenuPatch>,
) -> ApiResult<Json<menu_entity::Model>> {
    Ok(Json(menu::update_menu(&state.db, id, patch).await?))
}

/// DELETE /api/menus/{id}
pub async fn delete(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<StatusCode> {
    menu::delete_menu(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/menus/{id}/categories
pub async fn add_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<NewMenuCategory>,
) -> ApiResult<(StatusCode, Json<menu_category::Model>)> {
    let created = menu::add_category(&state.db, id, input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// PATCH /api/menu-categories/{id}
pub async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(patch): Json<MenuCategoryPatch>,
) -> ApiResult<Json<menu_category::Model>> {
    Ok(Json(menu::update_menu_category(&state.db, id, patch).await?))
}

/// DELETE /api/menu-categories/{id}
pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    menu::delete_menu_category(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/menu-categories/{id}/items
pub async fn add_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<NewMenuItem>,
) -> ApiResult<(StatusCode, Json<menu_item::Model>)> {
    let created = menu::add_item(&state.db, id, input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// PATCH /api/menu-items/{id}
pub async fn update_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(patch): Json<MenuItemPatch>,
) -> ApiResult<Json<menu_item::Model>> {
    Ok(Json(menu::update_item(&state.db, id, patch).await?))
}

/// DELETE /api/menu-items/{id}
pub async fn delete_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    menu::delete_item(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/menus/parse
///
/// Never fails on bad text; the report says what went wrong.
pub async fn parse_preview(Json(input): Json<MenuText>) -> Json<ParseReport> {
    Json(try_parse_menu(&input.text))
}

/// POST /api/menus/import
pub async fn import(
    State(state): State<AppState>,
    Json(input): Json<MenuText>,
) -> ApiResult<(StatusCode, Json<MenuTree>)> {
    let parsed = parse_menu(&input.text)?;
    let tree = menu::import_parsed_menu(&state.db, &parsed).await?;
    Ok((StatusCode::CREATED, Json(tree)))
}

/// GET /api/events/{id}/menus
pub async fn list_for_event(
    State(state): State<AppState>,
    Path(event_id): Path<i64>,
) -> ApiResult<Json<Vec<event_menu::Model>>> {
    require_event(&state.db, event_id).await?;
    Ok(Json(menu::list_event_menus(&state.db, event_id).await?))
}

/// POST /api/events/{id}/menus
pub async fn link(
    State(state): State<AppState>,
    Path(event_id): Path<i64>,
    Json(input): Json<LinkMenu>,
) -> ApiResult<(StatusCode, Json<event_menu::Model>)> {
    let link = menu::link_event_menu(&state.db, event_id, input.menu_id).await?;
    Ok((StatusCode::CREATED, Json(link)))
}

/// GET /api/event-menus/{id}
pub async fn event_menu_view(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<PublicMenuView>> {
    let link = menu::require_event_menu(&state.db, id).await?;
    let event = require_event(&state.db, link.event_id).await?;
    let tree = menu::get_menu_tree(&state.db, link.menu_id).await?;
    let selection = SelectionSet::load_for(&state.db, link).await?;
    Ok(Json(build_public_view(
        event.title,
        event.date,
        tree,
        selection.items(),
    )))
}

/// DELETE /api/event-menus/{id}
pub async fn unlink(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<StatusCode> {
    menu::unlink_event_menu(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
