use axum::{Json, Router, extract::State, routing::post};

use crate::{
    dto::chat::{ChatMessageRequest, ChatOpenRequest, ChatRecoveryRequest, ChatTurn},
    error::AppResult,
    extract::AppJson,
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::chat_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/open", post(open_chat))
        .route("/messages", post(send_message))
        .route("/password-recovery", post(password_recovery))
}

#[utoipa::path(
    post,
    path = "/api/chat/open",
    request_body = ChatOpenRequest,
    responses(
        (status = 200, description = "New session on the main menu", body = ApiResponse<ChatTurn>)
    ),
    tag = "Chat"
)]
pub async fn open_chat(
    user: Option<AuthUser>,
    AppJson(payload): AppJson<ChatOpenRequest>,
) -> AppResult<Json<ApiResponse<ChatTurn>>> {
    Ok(Json(chat_service::open_chat(user.as_ref(), payload)))
}

#[utoipa::path(
    post,
    path = "/api/chat/messages",
    request_body = ChatMessageRequest,
    responses(
        (status = 200, description = "Updated session and bot replies", body = ApiResponse<ChatTurn>)
    ),
    tag = "Chat"
)]
pub async fn send_message(
    State(state): State<AppState>,
    user: Option<AuthUser>,
    AppJson(payload): AppJson<ChatMessageRequest>,
) -> AppResult<Json<ApiResponse<ChatTurn>>> {
    let resp = chat_service::send_message(&state, user.as_ref(), payload).await;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/chat/password-recovery",
    request_body = ChatRecoveryRequest,
    responses(
        (status = 200, description = "Session switched to the recovery flow", body = ApiResponse<ChatTurn>)
    ),
    tag = "Chat"
)]
pub async fn password_recovery(
    AppJson(payload): AppJson<ChatRecoveryRequest>,
) -> AppResult<Json<ApiResponse<ChatTurn>>> {
    Ok(Json(chat_service::start_password_recovery(payload.session)))
}
