//! Session cookie gate.
//!
//! A request has a session when its cookie named
//! [`SessionConfig::cookie_name`] carries exactly the configured token. The
//! cookie is unsigned; the token itself is the secret.

use axum::Form;
use axum::extract::{OriginalUri, Request, State};
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::middleware::Next;
use axum::response::{Html, IntoResponse, Redirect, Response};
use serde::Deserialize;
use tracing::{info, warn};

use crate::config::app::SessionConfig;
use crate::errors::Error;

use super::state::AppState;

/// Where the login form sends a fresh session.
pub const HOME_PATH: &str = "/events";
/// Login page path.
pub const LOGIN_PATH: &str = "/login";

/// Value of cookie `name` in the `Cookie` headers, if present.
#[must_use]
pub fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|header| header.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
}

/// True when the request carries the configured session token.
#[must_use]
pub fn has_session(headers: &HeaderMap, config: &SessionConfig) -> bool {
    cookie_value(headers, &config.cookie_name).is_some_and(|value| value == config.token)
}

fn session_cookie(config: &SessionConfig) -> String {
    format!(
        "{}={}; Max-Age={}; Path=/; HttpOnly; SameSite=Lax",
        config.cookie_name, config.token, config.max_age_secs
    )
}

fn cleared_cookie(config: &SessionConfig) -> String {
    format!(
        "{}=; Max-Age=0; Path=/; HttpOnly; SameSite=Lax",
        config.cookie_name
    )
}

fn with_cookie(mut response: Response, cookie: &str) -> Response {
    if let Ok(value) = HeaderValue::from_str(cookie) {
        response.headers_mut().append(SET_COOKIE, value);
    }
    response
}

/// Middleware guarding everything except login and shared menus.
///
/// API requests without a session get a 401 JSON error; page requests are
/// redirected to the login page.
pub async fn require_session(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    if has_session(request.headers(), &state.config.session) {
        return next.run(request).await;
    }

    let path = request
        .extensions()
        .get::<OriginalUri>()
        .map_or_else(|| request.uri().path(), |uri| uri.path());
    if path.starts_with("/api") {
        Error::AccessDenied.into_response()
    } else {
        Redirect::to(LOGIN_PATH).into_response()
    }
}

fn login_html(failed: bool) -> Html<String> {
    let notice = if failed {
        r#"<p class="error">Wrong password.</p>"#
    } else {
        ""
    };
    Html(format!(
        r#"<!doctype html>
<html>
<head><meta charset="utf-8"><title>Sign in</title></head>
<body>
<h1>Event Manager</h1>
{notice}
<form method="post" action="{LOGIN_PATH}">
<label>Password <input type="password" name="password" autofocus></label>
<button type="submit">Sign in</button>
</form>
</body>
</html>"#
    ))
}

/// GET /login
pub async fn login_page(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if has_session(&headers, &state.config.session) {
        return Redirect::to(HOME_PATH).into_response();
    }
    login_html(false).into_response()
}

/// Login form body.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    /// Submitted password
    pub password: String,
}

/// POST /login
pub async fn login(State(state): State<AppState>, Form(form): Form<LoginForm>) -> Response {
    let config = &state.config.session;
    if form.password != config.access_password {
        warn!("Rejected login attempt");
        return (StatusCode::UNAUTHORIZED, login_html(true)).into_response();
    }

    info!("Session started");
    with_cookie(Redirect::to(HOME_PATH).into_response(), &session_cookie(config))
}

/// POST /logout
pub async fn logout(State(state): State<AppState>) -> Response {
    with_cookie(
        Redirect::to(LOGIN_PATH).into_response(),
        &cleared_cookie(&state.config.session),
    )
}
