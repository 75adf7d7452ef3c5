use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Full user row. Never serialized to clients; see [`PublicUser`].
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub display_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow)]
pub struct PublicUser {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub display_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            display_name: user.display_name,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow)]
pub struct Product {
    pub id: i64,
    pub title: String,
    #[schema(value_type = f64)]
    pub price: Decimal,
    pub platforms: Vec<String>,
    pub image: Option<String>,
    pub popularity: i64,
    pub is_subscription: bool,
}

/// One purchased line as shown in account history.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow)]
pub struct Purchase {
    pub order_id: i64,
    pub product_id: i64,
    pub title: String,
    pub image: Option<String>,
    pub quantity: i32,
    #[schema(value_type = f64)]
    pub unit_price: Decimal,
    pub created_at: DateTime<Utc>,
}

impl Purchase {
    pub fn subtotal(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}
