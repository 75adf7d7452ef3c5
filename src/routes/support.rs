use axum::{Json, Router, extract::State, routing::post};

use crate::{
    dto::support::{TicketRequest, TicketResponse},
    error::AppResult,
    extract::AppJson,
    response::ApiResponse,
    services::support_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/ticket", post(open_ticket))
}

#[utoipa::path(
    post,
    path = "/api/support/ticket",
    request_body = TicketRequest,
    responses(
        (status = 200, description = "Ticket stored", body = ApiResponse<TicketResponse>),
        (status = 400, description = "Missing fields or malformed email")
    ),
    tag = "Support"
)]
pub async fn open_ticket(
    State(state): State<AppState>,
    AppJson(payload): AppJson<TicketRequest>,
) -> AppResult<Json<ApiResponse<TicketResponse>>> {
    let resp = support_service::open_ticket(&state, payload).await?;
    Ok(Json(resp))
}
