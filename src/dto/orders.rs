use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One cart entry as submitted at checkout. Field aliases accept the browser cart shape.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema, PartialEq)]
pub struct CheckoutLine {
    #[serde(alias = "productId", alias = "product_id")]
    pub id: i64,
    #[serde(alias = "quantity", default = "default_qty")]
    pub qty: i32,
    /// Unit price snapshot taken when the item was added to the cart.
    #[schema(value_type = Option<f64>)]
    pub price: Option<Decimal>,
    pub title: Option<String>,
}

fn default_qty() -> i32 {
    1
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CheckoutRequest {
    pub cart: Option<Vec<CheckoutLine>>,
    /// Legacy single-item purchase.
    #[serde(alias = "productId", alias = "gameId")]
    pub product_id: Option<i64>,
    #[serde(alias = "paymentMethod", alias = "formaPagamento")]
    pub payment_method: Option<String>,
    #[serde(alias = "cupom")]
    pub coupon: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CheckoutResponse {
    pub success: bool,
    pub protocol: String,
    pub order_id: i64,
    #[schema(value_type = f64)]
    pub total: Decimal,
}
