use crate::{
    db::DbPool,
    dto::account::AccountOverview,
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_self},
    models::{PublicUser, Purchase},
    response::{ApiResponse, Meta},
};

pub const HISTORY_LIMIT: i64 = 20;

pub async fn purchase_history(pool: &DbPool, user_id: i64, limit: i64) -> AppResult<Vec<Purchase>> {
    let purchases = sqlx::query_as::<_, Purchase>(
        "SELECT o.id AS order_id, p.id AS product_id, p.title, p.image, \
                oi.quantity, oi.unit_price, o.created_at \
         FROM orders o \
         JOIN order_items oi ON oi.order_id = o.id \
         JOIN products p ON p.id = oi.product_id \
         WHERE o.user_id = $1 \
         ORDER BY o.created_at DESC, oi.id ASC \
         LIMIT $2",
    )
    .bind(user_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(purchases)
}

/// Profile plus recent purchases. A failing history lookup degrades to an empty list.
pub async fn account_overview(
    pool: &DbPool,
    caller: &AuthUser,
    id: i64,
) -> AppResult<ApiResponse<AccountOverview>> {
    ensure_self(caller, id)?;

    let user = sqlx::query_as::<_, PublicUser>(
        "SELECT id, username, email, display_name, created_at FROM users WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::not_found("User not found"))?;

    let purchases = match purchase_history(pool, id, HISTORY_LIMIT).await {
        Ok(purchases) => purchases,
        Err(err) => {
            tracing::warn!(user_id = %id, error = %err, "purchase history unavailable");
            Vec::new()
        }
    };

    let meta = Meta::listing(purchases.len(), Some(HISTORY_LIMIT));
    Ok(ApiResponse::success(
        "Account",
        AccountOverview { user, purchases },
        Some(meta),
    ))
}
