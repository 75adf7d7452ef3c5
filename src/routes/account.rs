use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};

use crate::{
    dto::account::AccountOverview,
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::account_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/{id}", get(get_account))
}

#[utoipa::path(
    get,
    path = "/api/account/{id}",
    params(("id" = i64, Path, description = "User id; must be the caller")),
    responses(
        (status = 200, description = "Profile and recent purchases", body = ApiResponse<AccountOverview>),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Not the caller's account")
    ),
    security(("bearer_auth" = [])),
    tag = "Account"
)]
pub async fn get_account(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<AccountOverview>>> {
    let resp = account_service::account_overview(&state.pool, &user, id).await?;
    Ok(Json(resp))
}
