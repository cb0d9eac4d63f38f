//! Registration and login handlers.

use axum::{
    Json,
    extract::Extension,
    http::{HeaderMap, header::SET_COOKIE},
    response::IntoResponse,
};
use std::sync::Arc;
use tracing::error;

use super::{
    session::session_cookie,
    state::AuthState,
    types::{ApiResponse, LoginRequest, RegisterRequest},
};

#[utoipa::path(
    post,
    path = "/register",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Outcome envelope; a session cookie is set on success", body = ApiResponse)
    ),
    tag = "auth"
)]
pub async fn register(
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<RegisterRequest>>,
) -> impl IntoResponse {
    let Some(Json(request)) = payload else {
        return Json(ApiResponse::failure("Missing details")).into_response();
    };

    match auth_state
        .service()
        .register(&request.name, &request.email, &request.password)
        .await
    {
        Ok(token) => respond_with_session(&auth_state, &token),
        Err(err) => Json(ApiResponse::failure(err.to_string())).into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Outcome envelope; a session cookie is set on success", body = ApiResponse)
    ),
    tag = "auth"
)]
pub async fn login(
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<LoginRequest>>,
) -> impl IntoResponse {
    let Some(Json(request)) = payload else {
        return Json(ApiResponse::failure("Email and password required")).into_response();
    };

    match auth_state
        .service()
        .login(&request.email, &request.password)
        .await
    {
        Ok(token) => respond_with_session(&auth_state, &token),
        Err(err) => Json(ApiResponse::failure(err.to_string())).into_response(),
    }
}

fn respond_with_session(auth_state: &AuthState, token: &str) -> axum::response::Response {
    let mut headers = HeaderMap::new();
    match session_cookie(auth_state.config(), token) {
        Ok(cookie) => {
            headers.insert(SET_COOKIE, cookie);
        }
        Err(err) => {
            // A token that cannot be carried in a header is unusable.
            error!("Failed to build session cookie: {}", err);
            return Json(ApiResponse::failure("Failed to establish session")).into_response();
        }
    }
    (headers, Json(ApiResponse::ok())).into_response()
}
