use axum::response::IntoResponse;

#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Service banner", body = String)
    ),
    tag = "root"
)]
pub async fn root() -> impl IntoResponse {
    "API working"
}
