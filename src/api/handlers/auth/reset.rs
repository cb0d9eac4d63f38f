//! Password reset handlers. Unauthenticated: the OTP emailed to the account
//! owner is the proof of control.

use axum::{Json, extract::Extension, response::IntoResponse};
use std::sync::Arc;

use super::{
    state::AuthState,
    types::{ApiResponse, ResetPasswordRequest, SendResetOtpRequest},
};

#[utoipa::path(
    post,
    path = "/send-reset-otp",
    request_body = SendResetOtpRequest,
    responses(
        (status = 200, description = "Outcome envelope", body = ApiResponse)
    ),
    tag = "reset"
)]
pub async fn send_reset_otp(
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<SendResetOtpRequest>>,
) -> impl IntoResponse {
    let email = payload
        .map(|Json(request)| request.email)
        .unwrap_or_default();

    match auth_state.service().send_reset_otp(&email).await {
        Ok(()) => Json(ApiResponse::ok_with("OTP sent to your email")),
        Err(err) => Json(ApiResponse::failure(err.to_string())),
    }
}

#[utoipa::path(
    post,
    path = "/reset-password",
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Outcome envelope", body = ApiResponse)
    ),
    tag = "reset"
)]
pub async fn reset_password(
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<ResetPasswordRequest>>,
) -> impl IntoResponse {
    let Some(Json(request)) = payload else {
        return Json(ApiResponse::failure(
            "Email, OTP and new password are required",
        ));
    };

    match auth_state
        .service()
        .reset_password(&request.email, &request.otp, &request.new_password)
        .await
    {
        Ok(()) => Json(ApiResponse::ok_with("Password has been reset successfully")),
        Err(err) => Json(ApiResponse::failure(err.to_string())),
    }
}
