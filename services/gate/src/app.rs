//! HTTP application for the delegated authentication gate.
//!
//! # Purpose
//! Builds the Axum router and implements the two endpoints the reverse
//! proxy knows about: `/_auth` for per-request authorization checks and
//! `/login` for the browser-facing login flow.
use axum::extract::{Form, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::Router;
use serde::Deserialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use wicket_auth::{now_epoch_seconds, Ticket, CSRF_PRINCIPAL};

use crate::config::GateConfig;

/// Cookie carrying the sealed ticket token.
pub const TICKET_COOKIE: &str = "ticket";

/// Cookie naming the page to return to after a successful login.
pub const REDIRECT_COOKIE: &str = "gate_redirect";

// Header the reverse proxy sets to the originally requested path.
const ORIGINAL_URI_HEADER: &str = "x-original-uri";

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<GateConfig>,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/login", get(login_page).post(login_submit))
        .route("/_auth", get(check_auth))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// The reverse-proxy delegation endpoint.
///
/// Answers 200 only when the `ticket` cookie opens to a valid ticket whose
/// principal may reach the path in `X-Original-URI`. Every other outcome, a
/// missing cookie included, is the same bare 401: callers learn nothing
/// about why a ticket was refused.
async fn check_auth(State(state): State<AppState>, headers: HeaderMap) -> StatusCode {
    let config = &state.config;
    let Some(token) = cookie_value(&headers, TICKET_COOKIE) else {
        return StatusCode::UNAUTHORIZED;
    };

    let ticket = Ticket::from_token(&token, &config.secret_key);
    if !ticket.is_valid(now_epoch_seconds()) {
        return StatusCode::UNAUTHORIZED;
    }

    let resource = headers
        .get(ORIGINAL_URI_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("");
    if config.principals.is_authorized(&ticket.principal, resource) {
        StatusCode::OK
    } else {
        tracing::debug!(principal = %ticket.principal, resource, "resource refused");
        StatusCode::UNAUTHORIZED
    }
}

/// Render the login form with a fresh anti-forgery ticket bound to it.
async fn login_page(State(state): State<AppState>) -> Response {
    match Ticket::csrf(now_epoch_seconds()).to_token(&state.config.secret_key) {
        Ok(csrf_token) => Html(render_login(&csrf_token)).into_response(),
        Err(err) => {
            tracing::error!(error = %err, "failed to mint anti-forgery ticket");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[derive(Debug, Deserialize)]
struct LoginForm {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
    #[serde(default)]
    csrf_token: String,
}

/// Handle a login submission.
///
/// The submission counts only when the anti-forgery token opens to a valid
/// ticket carrying the reserved name and the credentials check out; then a
/// principal ticket is set as a cookie and the browser is sent back to
/// where it came from. Any failure re-renders the form without detail.
async fn login_submit(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<LoginForm>,
) -> Response {
    let config = &state.config;
    let now = now_epoch_seconds();

    let csrf = Ticket::from_token(&form.csrf_token, &config.secret_key);
    let csrf_ok = csrf.is_valid(now) && csrf.principal == CSRF_PRINCIPAL;

    if csrf_ok && config.principals.authenticate(&form.username, &form.password) {
        let ticket = Ticket::new(form.username.as_str(), now + config.expire_secs);
        match ticket.to_token(&config.secret_key) {
            Ok(token) => {
                tracing::info!(principal = %form.username, "login accepted");
                let cookie = format!(
                    "{TICKET_COOKIE}={token}; Path=/; HttpOnly; Max-Age={}",
                    config.expire_secs
                );
                return (
                    [(header::SET_COOKIE, cookie)],
                    Redirect::to(&redirect_target(&headers)),
                )
                    .into_response();
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to mint principal ticket");
                return StatusCode::INTERNAL_SERVER_ERROR.into_response();
            }
        }
    }

    tracing::debug!(username = %form.username, "login refused");
    login_page(State(state)).await
}

// Minimal Cookie header parsing; the gate only ever reads two cookies.
fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    let raw = headers.get(header::COOKIE)?.to_str().ok()?;
    raw.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        (key == name).then(|| value.to_string())
    })
}

// Only same-site absolute paths are honored; anything else falls back to
// the root so the Location header always stays well-formed.
fn redirect_target(headers: &HeaderMap) -> String {
    cookie_value(headers, REDIRECT_COOKIE)
        .filter(|target| {
            target.starts_with('/') && target.bytes().all(|byte| (0x20..0x7f).contains(&byte))
        })
        .unwrap_or_else(|| "/".to_string())
}

fn render_login(csrf_token: &str) -> String {
    format!(
        r#"<!doctype html>
<html>
  <head><title>Sign in</title></head>
  <body>
    <form method="post" action="/login">
      <label>Username <input type="text" name="username"></label>
      <label>Password <input type="password" name="password"></label>
      <input type="hidden" name="csrf_token" value="{csrf_token}">
      <button type="submit">Sign in</button>
    </form>
  </body>
</html>
"#
    )
}
