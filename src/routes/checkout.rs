use axum::{Json, Router, extract::State, routing::post};

use crate::{
    dto::orders::{CheckoutRequest, CheckoutResponse},
    error::AppResult,
    extract::AppJson,
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::checkout_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/", post(checkout))
}

#[utoipa::path(
    post,
    path = "/api/checkout",
    request_body = CheckoutRequest,
    responses(
        (status = 200, description = "Order created", body = ApiResponse<CheckoutResponse>),
        (status = 400, description = "Empty cart, bad quantity or unknown products"),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "Legacy product id not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Checkout"
)]
pub async fn checkout(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(payload): AppJson<CheckoutRequest>,
) -> AppResult<Json<ApiResponse<CheckoutResponse>>> {
    let resp = checkout_service::checkout(&state, &user, payload).await?;
    Ok(Json(resp))
}
