//! HTTP interface.
//!
//! [`build_router`] assembles the whole application so `main` and the tests
//! run the same middleware stack:
//!
//! 1. Request tracing
//! 2. Upload body limit
//! 3. Session gate on everything except `/login`, `/logout` and `/share`

pub mod error;
pub mod handlers;
pub mod routes;
pub mod session;
pub mod state;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, post};
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use handlers::pages;
use state::AppState;

/// Largest accepted request body, for document and template uploads.
pub const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Path prefix the storage directory is served under, when it is local.
fn files_prefix(public_base_url: &str) -> Option<&str> {
    let prefix = public_base_url.trim_end_matches('/');
    (prefix.starts_with('/') && prefix.len() > 1).then_some(prefix)
}

/// Build the full application [`Router`].
pub fn build_router(state: AppState) -> Router {
    let mut protected = Router::new()
        .route("/", get(pages::root))
        .route("/events", get(pages::events))
        .nest("/api", routes::api_routes());

    if let Some(prefix) = files_prefix(&state.config.storage.public_base_url) {
        protected = protected.nest_service(prefix, ServeDir::new(state.storage.root()));
    }

    let protected = protected.route_layer(middleware::from_fn_with_state(
        state.clone(),
        session::require_session,
    ));

    Router::new()
        .route(
            session::LOGIN_PATH,
            get(session::login_page).post(session::login),
        )
        .route("/logout", post(session::logout))
        .merge(routes::share_routes())
        .merge(protected)
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}
