//! Profile data for the authenticated user.

use axum::{
    Json, extract::Extension, http::HeaderMap, response::IntoResponse,
};
use std::sync::Arc;

use super::auth::{
    session::require_user,
    types::{ApiResponse, UserDataBody, UserDataResponse},
    AuthState,
};

#[utoipa::path(
    get,
    path = "/user/data",
    responses(
        (status = 200, description = "Profile data, or a failure envelope", body = UserDataResponse)
    ),
    tag = "users"
)]
pub async fn user_data(
    headers: HeaderMap,
    auth_state: Extension<Arc<AuthState>>,
) -> impl IntoResponse {
    let user_id = match require_user(&headers, &auth_state) {
        Ok(user_id) => user_id,
        Err(response) => return response.into_response(),
    };

    match auth_state.service().user_data(user_id).await {
        Ok(data) => Json(UserDataResponse {
            success: true,
            user_data: UserDataBody {
                name: data.name,
                is_account_verified: data.is_account_verified,
            },
        })
        .into_response(),
        Err(err) => Json(ApiResponse::failure(err.to_string())).into_response(),
    }
}
