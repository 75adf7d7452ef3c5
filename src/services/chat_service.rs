use crate::{
    chatbot::{ChatBackend, ChatReply, ChatSession, ChatUser},
    dto::chat::{ChatMessageRequest, ChatOpenRequest, ChatTurn},
    error::AppResult,
    middleware::auth::AuthUser,
    models::{Product, Purchase},
    response::{ApiResponse, Meta},
    services::{account_service, catalog_service},
    state::AppState,
};

/// Purchases shown in the chat panel.
const CHAT_HISTORY_LIMIT: i64 = 5;

impl ChatBackend for AppState {
    async fn purchase_history(&self, user_id: i64) -> AppResult<Vec<Purchase>> {
        account_service::purchase_history(&self.pool, user_id, CHAT_HISTORY_LIMIT).await
    }

    async fn recommendation(&self) -> AppResult<Option<Product>> {
        catalog_service::random_product(&self.pool).await
    }
}

fn chat_user(user: Option<&AuthUser>) -> Option<ChatUser> {
    user.map(|u| ChatUser {
        id: u.user_id,
        name: u.username.clone(),
    })
}

fn turn(session: ChatSession, replies: Vec<ChatReply>) -> ApiResponse<ChatTurn> {
    let meta = Meta::listing(replies.len(), None);
    ApiResponse::success("Chat", ChatTurn { session, replies }, Some(meta))
}

pub fn open_chat(user: Option<&AuthUser>, payload: ChatOpenRequest) -> ApiResponse<ChatTurn> {
    let mut session = ChatSession::new();
    let replies = session.open(chat_user(user).as_ref(), payload.page.as_deref());
    turn(session, replies)
}

pub fn start_password_recovery(session: Option<ChatSession>) -> ApiResponse<ChatTurn> {
    let mut session = session.unwrap_or_default();
    let replies = session.start_password_recovery();
    turn(session, replies)
}

pub async fn send_message(
    state: &AppState,
    user: Option<&AuthUser>,
    payload: ChatMessageRequest,
) -> ApiResponse<ChatTurn> {
    let ChatMessageRequest { mut session, input } = payload;
    let replies = session
        .handle(&input, chat_user(user).as_ref(), state)
        .await;
    turn(session, replies)
}
