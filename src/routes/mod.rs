use axum::{
    Json, Router,
    http::{StatusCode, Uri},
};

use crate::{
    error::ErrorData,
    response::{ApiResponse, Meta},
    state::AppState,
};

pub mod account;
pub mod auth;
pub mod catalog;
pub mod chat;
pub mod checkout;
pub mod doc;
pub mod health;
pub mod params;
pub mod support;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/catalog", catalog::router())
        .nest("/auth", auth::router())
        .nest("/account", account::router())
        .nest("/checkout", checkout::router())
        .nest("/support", support::router())
        .nest("/chat", chat::router())
}

/// Full application router: `/health`, the `/api` tree, docs and a JSON 404 fallback.
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/health", axum::routing::get(health::health_check))
        .nest("/api", create_api_router())
        .merge(doc::scalar_docs())
        .fallback(not_found)
        .with_state(state)
}

pub async fn not_found(uri: Uri) -> (StatusCode, Json<ApiResponse<ErrorData>>) {
    let body = ApiResponse {
        message: "Not Found".to_string(),
        data: Some(ErrorData {
            error: "Not Found".to_string(),
            details: Some(serde_json::json!({ "path": uri.path() })),
        }),
        meta: Some(Meta::empty()),
    };
    (StatusCode::NOT_FOUND, Json(body))
}
