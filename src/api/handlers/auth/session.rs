//! Session cookie plumbing and the `is-authenticated` probe.

use axum::{
    Json,
    extract::Extension,
    http::{
        HeaderMap, HeaderValue,
        header::{COOKIE, InvalidHeaderValue, SET_COOKIE},
    },
    response::IntoResponse,
};
use std::sync::Arc;
use tracing::error;
use uuid::Uuid;

use super::{state::AuthState, types::ApiResponse};
use crate::account::Error;

pub(super) const SESSION_COOKIE_NAME: &str = "token";

/// Resolve the session cookie into a user id.
///
/// Any failure (no cookie, bad signature, expired token) produces the same
/// `Not authorized` body so callers cannot distinguish the cases.
pub(crate) fn require_user(
    headers: &HeaderMap,
    auth_state: &AuthState,
) -> Result<Uuid, Json<ApiResponse>> {
    extract_session_token(headers)
        .and_then(|token| auth_state.service().verify_token(&token))
        .ok_or_else(|| Json(ApiResponse::failure(Error::NotAuthorized.to_string())))
}

#[utoipa::path(
    post,
    path = "/is-authenticated",
    responses(
        (status = 200, description = "Whether the session cookie holds a valid token", body = ApiResponse)
    ),
    tag = "auth"
)]
pub async fn is_authenticated(
    headers: HeaderMap,
    auth_state: Extension<Arc<AuthState>>,
) -> impl IntoResponse {
    match require_user(&headers, &auth_state) {
        Ok(_) => Json(ApiResponse::ok()),
        Err(response) => response,
    }
}

#[utoipa::path(
    post,
    path = "/logout",
    responses(
        (status = 200, description = "Session cookie cleared", body = ApiResponse)
    ),
    tag = "auth"
)]
pub async fn logout(auth_state: Extension<Arc<AuthState>>) -> impl IntoResponse {
    // Tokens are stateless, so logout is only a cookie deletion; an already
    // issued token stays valid until it expires.
    let mut response_headers = HeaderMap::new();
    match clear_session_cookie(auth_state.config()) {
        Ok(cookie) => {
            response_headers.insert(SET_COOKIE, cookie);
        }
        Err(err) => {
            error!("Failed to build logout cookie: {}", err);
        }
    }
    (response_headers, Json(ApiResponse::ok_with("Logged out")))
}

/// Build the `HttpOnly` session cookie carrying a fresh token.
pub(super) fn session_cookie(
    auth_config: &super::state::AuthConfig,
    token: &str,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let ttl_seconds = auth_config.session_ttl_seconds();
    let same_site = auth_config.cookie_same_site();
    let mut cookie = format!(
        "{SESSION_COOKIE_NAME}={token}; Path=/; HttpOnly; SameSite={same_site}; Max-Age={ttl_seconds}"
    );
    if auth_config.cookie_secure() {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

pub(super) fn clear_session_cookie(
    auth_config: &super::state::AuthConfig,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let same_site = auth_config.cookie_same_site();
    let mut cookie =
        format!("{SESSION_COOKIE_NAME}=; Path=/; HttpOnly; SameSite={same_site}; Max-Age=0");
    if auth_config.cookie_secure() {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

fn extract_session_token(headers: &HeaderMap) -> Option<String> {
    let header = headers.get(COOKIE)?;
    let value = header.to_str().ok()?;
    for pair in value.split(';') {
        let trimmed = pair.trim();
        let mut parts = trimmed.splitn(2, '=');
        let key = parts.next()?.trim();
        let val = parts.next()?.trim();
        if key == SESSION_COOKIE_NAME {
            return Some(val.to_string());
        }
    }
    None
}
