//! Route tables, one function per resource.

use axum::routing::{delete, get, patch, post, put};
use axum::{Extension, Router};

use super::handlers::{
    categories, diagnostics, documents, events, menus, payments, people, public, templates,
};
use super::state::AppState;
use crate::core::template::TemplateKind;

/// Routes mounted at `/api/events`.
///
/// ```text
/// GET    /                        -> list
/// POST   /                        -> create
/// POST   /finalize                -> finalize
/// GET    /{id}                    -> get_by_id
/// PATCH  /{id}                    -> update
/// DELETE /{id}                    -> delete
/// GET    /{id}/staff              -> get_staff
/// PUT    /{id}/staff              -> set_staff
/// GET    /{id}/payments           -> payment_summary
/// POST   /{id}/payments/team      -> create_team_payments
/// GET    /{id}/menus              -> menus::list_for_event
/// POST   /{id}/menus              -> menus::link
/// GET    /{id}/contracts          -> templates::list_for_event
/// GET    /{id}/contract-data      -> templates::record_for_event
/// GET    /{id}/budgets            -> templates::list_for_event
/// GET    /{id}/budget-data        -> templates::record_for_event
/// ```
pub fn event_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(events::list).post(events::create))
        .route("/finalize", post(events::finalize))
        .route(
            "/{id}",
            get(events::get_by_id)
                .patch(events::update)
                .delete(events::delete),
        )
        .route("/{id}/staff", get(events::get_staff).put(events::set_staff))
        .route("/{id}/payments", get(events::payment_summary))
        .route("/{id}/payments/team", post(events::create_team_payments))
        .route("/{id}/menus", get(menus::list_for_event).post(menus::link))
        .merge(event_template_routes(TemplateKind::Contract))
        .merge(event_template_routes(TemplateKind::Budget))
}

/// Per-event template routes of one family.
fn event_template_routes(kind: TemplateKind) -> Router<AppState> {
    let (filled, _) = kind_segments(kind);
    let data = match kind {
        TemplateKind::Contract => "contract-data",
        TemplateKind::Budget => "budget-data",
    };
    Router::new()
        .route(&format!("/{{id}}/{filled}"), get(templates::list_for_event))
        .route(&format!("/{{id}}/{data}"), get(templates::record_for_event))
        .layer(Extension(kind))
}

/// Routes mounted at `/api/categories`.
pub fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(categories::list).post(categories::create))
        .route("/{id}", patch(categories::update).delete(categories::delete))
}

/// Routes mounted at `/api/people`.
pub fn people_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(people::list).post(people::create))
        .route(
            "/{id}",
            get(people::get_by_id)
                .patch(people::update)
                .delete(people::delete),
        )
}

/// Routes mounted at `/api/payments`.
pub fn payment_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(payments::create))
        .route("/{id}", patch(payments::update).delete(payments::delete))
}

/// Menu routes, mounted at `/api`.
///
/// ```text
/// GET    /menus                          -> list
/// POST   /menus                          -> create
/// POST   /menus/parse                    -> parse_preview
/// POST   /menus/import                   -> import
/// GET    /menus/{id}                     -> get_tree
/// PATCH  /menus/{id}                     -> update
/// DELETE /menus/{id}                     -> delete
/// POST   /menus/{id}/categories          -> add_category
/// PATCH  /menu-categories/{id}           -> update_category
/// DELETE /menu-categories/{id}           -> delete_category
/// POST   /menu-categories/{id}/items     -> add_item
/// PATCH  /menu-items/{id}                -> update_item
/// DELETE /menu-items/{id}                -> delete_item
/// GET    /event-menus/{id}               -> event_menu_view
/// DELETE /event-menus/{id}               -> unlink
/// ```
pub fn menu_routes() -> Router<AppState> {
    Router::new()
        .route("/menus", get(menus::list).post(menus::create))
        .route("/menus/parse", post(menus::parse_preview))
        .route("/menus/import", post(menus::import))
        .route(
            "/menus/{id}",
            get(menus::get_tree)
                .patch(menus::update)
                .delete(menus::delete),
        )
        .route("/menus/{id}/categories", post(menus::add_category))
        .route(
            "/menu-categories/{id}",
            patch(menus::update_category).delete(menus::delete_category),
        )
        .route("/menu-categories/{id}/items", post(menus::add_item))
        .route(
            "/menu-items/{id}",
            patch(menus::update_item).delete(menus::delete_item),
        )
        .route(
            "/event-menus/{id}",
            get(menus::event_menu_view).delete(menus::unlink),
        )
}

/// Routes mounted at `/api/documents`.
pub fn document_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(documents::list).post(documents::upload))
        .route("/{id}", delete(documents::delete))
}

/// URL segments of a family: filled instances, then templates.
const fn kind_segments(kind: TemplateKind) -> (&'static str, &'static str) {
    match kind {
        TemplateKind::Contract => ("contracts", "contract-templates"),
        TemplateKind::Budget => ("budgets", "budget-templates"),
    }
}

/// Template routes of one family, mounted at `/api`.
///
/// ```text
/// GET    /contract-templates          -> list_templates
/// POST   /contract-templates          -> upload_template
/// DELETE /contract-templates/{id}     -> delete_template
/// POST   /contracts                   -> fill
/// DELETE /contracts/{id}              -> delete_filled
/// PUT    /contracts/{id}/file         -> attach_file
/// PATCH  /contracts/{id}/status       -> set_status
/// ```
///
/// Budgets use `/budget-templates` and `/budgets`.
pub fn template_routes(kind: TemplateKind) -> Router<AppState> {
    let (filled, templates_path) = kind_segments(kind);
    Router::new()
        .route(
            &format!("/{templates_path}"),
            get(templates::list_templates).post(templates::upload_template),
        )
        .route(
            &format!("/{templates_path}/{{id}}"),
            delete(templates::delete_template),
        )
        .route(&format!("/{filled}"), post(templates::fill))
        .route(&format!("/{filled}/{{id}}"), delete(templates::delete_filled))
        .route(&format!("/{filled}/{{id}}/file"), put(templates::attach_file))
        .route(&format!("/{filled}/{{id}}/status"), patch(templates::set_status))
        .layer(Extension(kind))
}

/// Routes mounted at `/api/diagnostics`.
pub fn diagnostics_routes() -> Router<AppState> {
    Router::new()
        .route("/table-counts", get(diagnostics::table_counts))
        .route("/stale-events", get(diagnostics::stale_events))
        .route("/unpaid-totals", get(diagnostics::unpaid_totals))
        .route("/orphaned-selections", get(diagnostics::orphaned_selections))
        .route("/events-without-menu", get(diagnostics::events_without_menu))
}

/// Every session-protected JSON route, mounted at `/api`.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/events", event_routes())
        .nest("/categories", category_routes())
        .nest("/people", people_routes())
        .nest("/payments", payment_routes())
        .nest("/documents", document_routes())
        .nest("/diagnostics", diagnostics_routes())
        .merge(menu_routes())
        .merge(template_routes(TemplateKind::Contract))
        .merge(template_routes(TemplateKind::Budget))
}

/// Guest routes keyed by share token; no session required.
///
/// ```text
/// GET    /share/{token}                          -> view
/// POST   /share/{token}/items/{item_id}/toggle   -> toggle
/// ```
pub fn share_routes() -> Router<AppState> {
    Router::new()
        .route("/share/{token}", get(public::view))
        .route(
            "/share/{token}/items/{item_id}/toggle",
            post(public::toggle),
        )
}
