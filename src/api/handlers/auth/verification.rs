//! Email verification handlers. Both require an authenticated session.

use axum::{
    Json, extract::Extension, http::HeaderMap, response::IntoResponse,
};
use std::sync::Arc;

use super::{
    session::require_user,
    state::AuthState,
    types::{ApiResponse, VerifyEmailRequest},
};
use crate::account::service::VerifyOtpOutcome;

#[utoipa::path(
    post,
    path = "/send-verify-otp",
    responses(
        (status = 200, description = "Outcome envelope", body = ApiResponse)
    ),
    tag = "verification"
)]
pub async fn send_verify_otp(
    headers: HeaderMap,
    auth_state: Extension<Arc<AuthState>>,
) -> impl IntoResponse {
    let user_id = match require_user(&headers, &auth_state) {
        Ok(user_id) => user_id,
        Err(response) => return response,
    };

    match auth_state.service().send_verify_otp(user_id).await {
        Ok(VerifyOtpOutcome::AlreadyVerified) => {
            Json(ApiResponse::ok_with("Account already verified"))
        }
        Ok(VerifyOtpOutcome::Sent) => {
            Json(ApiResponse::ok_with("Verification OTP sent to your email"))
        }
        Err(err) => Json(ApiResponse::failure(err.to_string())),
    }
}

#[utoipa::path(
    post,
    path = "/verify-email",
    request_body = VerifyEmailRequest,
    responses(
        (status = 200, description = "Outcome envelope", body = ApiResponse)
    ),
    tag = "verification"
)]
pub async fn verify_email(
    headers: HeaderMap,
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<VerifyEmailRequest>>,
) -> impl IntoResponse {
    // Session check first: an unauthenticated caller learns nothing about
    // payload validity.
    let user_id = match require_user(&headers, &auth_state) {
        Ok(user_id) => user_id,
        Err(response) => return response,
    };

    let otp = payload.map(|Json(request)| request.otp).unwrap_or_default();

    match auth_state.service().verify_email(user_id, &otp).await {
        Ok(()) => Json(ApiResponse::ok_with("Email verified successfully")),
        Err(err) => Json(ApiResponse::failure(err.to_string())),
    }
}
