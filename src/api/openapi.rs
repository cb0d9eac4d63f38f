//! `OpenAPI` document for the served routes.

use crate::api::handlers::{auth, health, root, users};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "sesamo",
        description = "Email/OTP user-account authentication service"
    ),
    paths(
        root::root,
        health::health,
        auth::account::register,
        auth::account::login,
        auth::session::logout,
        auth::session::is_authenticated,
        auth::verification::send_verify_otp,
        auth::verification::verify_email,
        auth::reset::send_reset_otp,
        auth::reset::reset_password,
        users::user_data,
    ),
    components(schemas(
        auth::types::ApiResponse,
        auth::types::RegisterRequest,
        auth::types::LoginRequest,
        auth::types::VerifyEmailRequest,
        auth::types::SendResetOtpRequest,
        auth::types::ResetPasswordRequest,
        auth::types::UserDataBody,
        auth::types::UserDataResponse,
        health::Health,
    )),
    tags(
        (name = "auth", description = "Registration, login, and session probes"),
        (name = "verification", description = "Email verification via OTP"),
        (name = "reset", description = "Password reset via OTP"),
        (name = "users", description = "Authenticated profile data"),
        (name = "health", description = "Readiness probe")
    )
)]
pub struct ApiDoc;

#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}
