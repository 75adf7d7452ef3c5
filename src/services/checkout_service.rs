//! Turns a submitted cart (or a single legacy product id) into an order.
//!
//! Input is checked in full before the database is touched. Everything after
//! that, from resolving products to inserting the order lines, happens inside
//! one sea-orm transaction, so a failure leaves no partial order behind.

use std::collections::HashMap;

use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};

use crate::{
    audit::{AuditAction, record},
    config::PricingPolicy,
    dto::orders::{CheckoutLine, CheckoutRequest, CheckoutResponse},
    entity::{
        Products, Users,
        order_items::ActiveModel as OrderItemActive,
        orders::ActiveModel as OrderActive,
        products::Column as ProdCol,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    response::{ApiResponse, Meta},
    state::AppState,
    validation,
};

pub const PROTOCOL_PREFIX: &str = "#CHK";

/// Largest total `orders.total_price NUMERIC(10,2)` can hold.
pub const MAX_ORDER_TOTAL: Decimal = Decimal::from_parts(1_410_065_407, 2, 0, false, 2);

/// One distinct product to be ordered.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedLine {
    pub product_id: i64,
    pub quantity: i32,
    pub snapshot_price: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutPlan {
    pub lines: Vec<PlannedLine>,
    /// Submitted as a bare product id rather than a cart.
    pub legacy: bool,
    pub payment_method: String,
    pub coupon: Option<String>,
}

impl CheckoutPlan {
    pub fn product_ids(&self) -> Vec<i64> {
        self.lines.iter().map(|l| l.product_id).collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PricedLine {
    pub product_id: i64,
    pub quantity: i32,
    pub unit_price: Decimal,
}

impl PricedLine {
    /// `None` when the product does not fit in a `Decimal`.
    pub fn subtotal(&self) -> Option<Decimal> {
        self.unit_price.checked_mul(Decimal::from(self.quantity))
    }
}

/// Validates the payload without any I/O.
pub fn plan_checkout(payload: CheckoutRequest) -> AppResult<CheckoutPlan> {
    let payment_method = validation::required("payment_method", payload.payment_method)?;
    let coupon = validation::optional(payload.coupon);

    let (lines, legacy) = match (payload.cart, payload.product_id) {
        (Some(cart), _) => {
            if cart.is_empty() {
                return Err(AppError::BadRequest("Cart is empty".into()));
            }
            (merge_lines(cart)?, false)
        }
        (None, Some(product_id)) => (
            vec![PlannedLine {
                product_id,
                quantity: 1,
                snapshot_price: None,
            }],
            true,
        ),
        (None, None) => {
            return Err(AppError::BadRequest(
                "Either cart or product_id is required".into(),
            ));
        }
    };

    Ok(CheckoutPlan {
        lines,
        legacy,
        payment_method,
        coupon,
    })
}

/// Collapses repeated product ids into one line, summing quantities. First-seen order and
/// the first price snapshot are kept.
fn merge_lines(cart: Vec<CheckoutLine>) -> AppResult<Vec<PlannedLine>> {
    let mut merged: Vec<PlannedLine> = Vec::with_capacity(cart.len());
    for line in cart {
        if line.qty < 1 {
            return Err(AppError::BadRequest(format!(
                "Invalid quantity {} for product {}",
                line.qty, line.id
            )));
        }
        if line.price.is_some_and(|p| p.is_sign_negative()) {
            return Err(AppError::BadRequest(format!(
                "Invalid price for product {}",
                line.id
            )));
        }

        match merged.iter_mut().find(|l| l.product_id == line.id) {
            Some(existing) => {
                existing.quantity = existing.quantity.checked_add(line.qty).ok_or_else(|| {
                    AppError::BadRequest(format!("Quantity too large for product {}", line.id))
                })?;
            }
            None => merged.push(PlannedLine {
                product_id: line.id,
                quantity: line.qty,
                snapshot_price: line.price,
            }),
        }
    }
    Ok(merged)
}

/// Applies the pricing policy against the current catalog prices.
pub fn price_lines(
    plan: &CheckoutPlan,
    catalog: &HashMap<i64, Decimal>,
    policy: PricingPolicy,
) -> AppResult<(Vec<PricedLine>, Decimal)> {
    let missing: Vec<i64> = plan
        .lines
        .iter()
        .map(|l| l.product_id)
        .filter(|id| !catalog.contains_key(id))
        .collect();

    if !missing.is_empty() {
        if plan.legacy {
            return Err(AppError::not_found("Product not found"));
        }
        let ids = missing
            .iter()
            .map(i64::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        return Err(AppError::BadRequest(format!("Unknown product ids: {ids}")));
    }

    let mut priced = Vec::with_capacity(plan.lines.len());
    for line in &plan.lines {
        let catalog_price = catalog[&line.product_id];
        let unit_price = match policy {
            PricingPolicy::Catalog => catalog_price,
            PricingPolicy::Snapshot => line.snapshot_price.unwrap_or(catalog_price),
        };
        priced.push(PricedLine {
            product_id: line.product_id,
            quantity: line.quantity,
            unit_price: unit_price.round_dp(2),
        });
    }

    let total = priced
        .iter()
        .try_fold(Decimal::ZERO, |acc, line| {
            line.subtotal().and_then(|sub| acc.checked_add(sub))
        })
        .map(|total| total.round_dp(2))
        .filter(|total| *total <= MAX_ORDER_TOTAL)
        .ok_or_else(|| {
            AppError::BadRequest(format!("Order total exceeds {MAX_ORDER_TOTAL}"))
        })?;
    Ok((priced, total))
}

pub fn protocol_for(order_id: i64) -> String {
    format!("{PROTOCOL_PREFIX}{order_id:06}")
}

pub async fn checkout(
    state: &AppState,
    user: &AuthUser,
    payload: CheckoutRequest,
) -> AppResult<ApiResponse<CheckoutResponse>> {
    let plan = plan_checkout(payload)?;

    let txn = state.orm.begin().await?;

    if Users::find_by_id(user.user_id).one(&txn).await?.is_none() {
        return Err(AppError::Unauthorized("User no longer exists".into()));
    }

    let catalog: HashMap<i64, Decimal> = Products::find()
        .filter(ProdCol::Id.is_in(plan.product_ids()))
        .all(&txn)
        .await?
        .into_iter()
        .map(|p| (p.id, p.price))
        .collect();

    let (lines, total) = price_lines(&plan, &catalog, state.pricing)?;

    let order = OrderActive {
        id: NotSet,
        user_id: Set(user.user_id),
        total_price: Set(total),
        payment_method: Set(plan.payment_method.clone()),
        coupon: Set(plan.coupon.clone()),
        created_at: NotSet,
    }
    .insert(&txn)
    .await?;

    for line in &lines {
        OrderItemActive {
            id: NotSet,
            order_id: Set(order.id),
            product_id: Set(line.product_id),
            quantity: Set(line.quantity),
            unit_price: Set(line.unit_price),
        }
        .insert(&txn)
        .await?;
    }

    txn.commit().await?;

    let protocol = protocol_for(order.id);
    tracing::info!(
        user_id = %user.user_id,
        order_id = %order.id,
        protocol = %protocol,
        payment_method = %plan.payment_method,
        coupon = ?plan.coupon,
        items = lines.len(),
        total = %total,
        "checkout completed"
    );
    record(
        &state.orm,
        Some(user.user_id),
        AuditAction::Checkout,
        serde_json::json!({ "order_id": order.id, "protocol": protocol }),
    )
    .await;

    Ok(ApiResponse::success(
        "Checkout success",
        CheckoutResponse {
            success: true,
            protocol,
            order_id: order.id,
            total,
        },
        Some(Meta::empty()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::dec;

    fn line(id: i64, qty: i32, price: Option<Decimal>) -> CheckoutLine {
        CheckoutLine {
            id,
            qty,
            price,
            title: None,
        }
    }

    fn cart_request(cart: Vec<CheckoutLine>) -> CheckoutRequest {
        CheckoutRequest {
            cart: Some(cart),
            payment_method: Some("credit-card".into()),
            ..Default::default()
        }
    }

    #[test]
    fn empty_cart_and_missing_items_are_rejected() {
        assert!(matches!(
            plan_checkout(cart_request(vec![])),
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            plan_checkout(CheckoutRequest {
                payment_method: Some("pix".into()),
                ..Default::default()
            }),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn payment_method_is_required() {
        let mut request = cart_request(vec![line(1, 1, None)]);
        request.payment_method = Some("  ".into());
        assert!(matches!(plan_checkout(request), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn non_positive_quantity_is_rejected() {
        let request = cart_request(vec![line(1, 0, None)]);
        assert!(matches!(plan_checkout(request), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn duplicate_ids_are_merged() {
        let plan = plan_checkout(cart_request(vec![
            line(1, 2, Some(dec!(50.00))),
            line(2, 1, None),
            line(1, 1, Some(dec!(10.00))),
        ]))
        .unwrap();

        assert_eq!(plan.lines.len(), 2);
        assert_eq!(plan.lines[0].quantity, 3);
        assert_eq!(plan.lines[0].snapshot_price, Some(dec!(50.00)));
        assert_eq!(plan.product_ids(), vec![1, 2]);
    }

    #[test]
    fn legacy_product_id_becomes_single_line() {
        let plan = plan_checkout(CheckoutRequest {
            product_id: Some(9),
            payment_method: Some("boleto".into()),
            coupon: Some(" ".into()),
            ..Default::default()
        })
        .unwrap();

        assert!(plan.legacy);
        assert_eq!(plan.lines[0].quantity, 1);
        assert_eq!(plan.coupon, None);
    }

    #[test]
    fn catalog_policy_reprices_and_snapshot_policy_trusts_cart() {
        let plan = plan_checkout(cart_request(vec![
            line(1, 2, Some(dec!(50.00))),
            line(2, 1, None),
        ]))
        .unwrap();
        let catalog = HashMap::from([(1, dec!(45.00)), (2, dec!(30.00))]);

        let (_, total) = price_lines(&plan, &catalog, PricingPolicy::Catalog).unwrap();
        assert_eq!(total, dec!(120.00));

        let (lines, total) = price_lines(&plan, &catalog, PricingPolicy::Snapshot).unwrap();
        assert_eq!(total, dec!(130.00));
        assert_eq!(lines[1].unit_price, dec!(30.00));
    }

    #[test]
    fn unknown_products_fail_before_writing() {
        let plan = plan_checkout(cart_request(vec![line(1, 1, None), line(77, 1, None)])).unwrap();
        let catalog = HashMap::from([(1, dec!(10.00))]);
        match price_lines(&plan, &catalog, PricingPolicy::Catalog) {
            Err(AppError::BadRequest(msg)) => assert!(msg.contains("77")),
            other => panic!("unexpected {other:?}"),
        }

        let legacy = plan_checkout(CheckoutRequest {
            product_id: Some(77),
            payment_method: Some("pix".into()),
            ..Default::default()
        })
        .unwrap();
        assert!(matches!(
            price_lines(&legacy, &catalog, PricingPolicy::Catalog),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn oversized_totals_are_rejected_instead_of_overflowing() {
        let plan = plan_checkout(cart_request(vec![line(
            1,
            i32::MAX,
            Some(Decimal::from_i128_with_scale(100_000_000_000_000_000_000, 0)),
        )]))
        .unwrap();
        let catalog = HashMap::from([(1, dec!(10.00))]);

        assert!(matches!(
            price_lines(&plan, &catalog, PricingPolicy::Snapshot),
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            price_lines(&plan, &catalog, PricingPolicy::Catalog),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn total_at_column_limit_is_accepted() {
        let plan = plan_checkout(cart_request(vec![line(1, 1, None)])).unwrap();
        let at_limit = HashMap::from([(1, MAX_ORDER_TOTAL)]);
        let (_, total) = price_lines(&plan, &at_limit, PricingPolicy::Catalog).unwrap();
        assert_eq!(total, dec!(99999999.99));

        let over = HashMap::from([(1, dec!(100000000.00))]);
        assert!(price_lines(&plan, &over, PricingPolicy::Catalog).is_err());
    }

    #[test]
    fn protocol_derives_from_order_id() {
        assert_eq!(protocol_for(42), "#CHK000042");
        assert_eq!(protocol_for(1_234_567), "#CHK1234567");
    }
}
