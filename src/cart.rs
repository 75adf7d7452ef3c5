//! Session-scoped shopping cart.
//!
//! The cart never touches the database. It lives in the browser's per-session
//! store as JSON, is mutated by UI actions, and is only turned into an order
//! when it is submitted to checkout. Entries keep the order they were added in
//! and each product appears at most once.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{dto::orders::CheckoutLine, models::Product};

/// What the cart needs to know about a product at add-time.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductSnapshot {
    pub id: i64,
    pub title: String,
    pub price: Decimal,
    pub image: Option<String>,
}

impl From<&Product> for ProductSnapshot {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id,
            title: product.title.clone(),
            price: product.price,
            image: product.image.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CartEntry {
    pub id: i64,
    pub title: String,
    #[schema(value_type = f64)]
    pub price: Decimal,
    pub image: Option<String>,
    pub qty: u32,
}

impl CartEntry {
    pub fn subtotal(&self) -> Decimal {
        self.price * Decimal::from(self.qty)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct Cart {
    entries: Vec<CartEntry>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restores a cart from the session store. Unreadable data starts a fresh cart.
    pub fn from_session_json(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return Self::new();
        };
        match serde_json::from_str::<Cart>(raw) {
            Ok(mut cart) => {
                cart.entries.retain(|e| e.qty >= 1);
                cart
            }
            Err(err) => {
                tracing::debug!(error = %err, "discarding unreadable session cart");
                Self::new()
            }
        }
    }

    pub fn to_session_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "[]".to_string())
    }

    pub fn entries(&self) -> &[CartEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Adding a product already in the cart bumps its quantity; the original price snapshot is kept.
    pub fn add(&mut self, product: ProductSnapshot) {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.id == product.id) {
            entry.qty += 1;
            return;
        }
        self.entries.push(CartEntry {
            id: product.id,
            title: product.title,
            price: product.price,
            image: product.image,
            qty: 1,
        });
    }

    /// Steps the quantity by `delta`, never below 1. Returns `false` for an unknown product.
    pub fn set_quantity(&mut self, product_id: i64, delta: i32) -> bool {
        let Some(entry) = self.entries.iter_mut().find(|e| e.id == product_id) else {
            return false;
        };
        let next = i64::from(entry.qty) + i64::from(delta);
        entry.qty = u32::try_from(next.max(1)).unwrap_or(u32::MAX);
        true
    }

    pub fn remove(&mut self, product_id: i64) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != product_id);
        self.entries.len() != before
    }

    pub fn total(&self) -> Decimal {
        self.entries.iter().map(CartEntry::subtotal).sum()
    }

    /// Number of units across all entries (the header badge).
    pub fn count(&self) -> u32 {
        self.entries.iter().map(|e| e.qty).sum()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn to_checkout_lines(&self) -> Vec<CheckoutLine> {
        self.entries
            .iter()
            .map(|e| CheckoutLine {
                id: e.id,
                qty: i32::try_from(e.qty).unwrap_or(i32::MAX),
                price: Some(e.price),
                title: Some(e.title.clone()),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::dec;

    fn game(id: i64, price: Decimal) -> ProductSnapshot {
        ProductSnapshot {
            id,
            title: format!("Game {id}"),
            price,
            image: None,
        }
    }

    fn expected_total(cart: &Cart) -> Decimal {
        cart.entries()
            .iter()
            .map(|e| e.price * Decimal::from(e.qty))
            .sum()
    }

    #[test]
    fn duplicate_add_merges_into_quantity() {
        let mut cart = Cart::new();
        cart.add(game(1, dec!(50.00)));
        cart.add(game(1, dec!(50.00)));
        cart.add(game(2, dec!(30.00)));

        assert_eq!(cart.entries().len(), 2);
        assert_eq!(cart.entries()[0].qty, 2);
        assert_eq!(cart.total(), dec!(130.00));
        assert_eq!(cart.count(), 3);
    }

    #[test]
    fn re_adding_keeps_the_first_price_snapshot() {
        let mut cart = Cart::new();
        cart.add(game(1, dec!(50.00)));
        cart.add(game(1, dec!(10.00)));

        assert_eq!(cart.entries()[0].price, dec!(50.00));
        assert_eq!(cart.total(), dec!(100.00));
    }

    #[test]
    fn stepper_is_floored_at_one() {
        let mut cart = Cart::new();
        cart.add(game(7, dec!(19.90)));

        assert!(cart.set_quantity(7, -1));
        assert!(cart.set_quantity(7, -1));
        assert_eq!(cart.entries()[0].qty, 1);

        assert!(cart.set_quantity(7, 1));
        assert_eq!(cart.entries()[0].qty, 2);
        assert!(!cart.set_quantity(99, 1));
    }

    #[test]
    fn remove_deletes_regardless_of_quantity() {
        let mut cart = Cart::new();
        cart.add(game(1, dec!(5)));
        cart.set_quantity(1, 1);
        cart.set_quantity(1, 1);
        cart.add(game(2, dec!(3)));

        assert!(cart.remove(1));
        assert!(!cart.remove(1));
        assert_eq!(cart.entries().len(), 1);
        assert_eq!(cart.total(), dec!(3));
    }

    #[test]
    fn total_matches_entries_after_mixed_operations() {
        let mut cart = Cart::new();
        let ops: [(i64, i32); 10] = [
            (1, 0),
            (2, 0),
            (1, 0),
            (3, 1),
            (2, -1),
            (3, 0),
            (1, -1),
            (4, 0),
            (2, 1),
            (4, -3),
        ];
        for (i, (id, delta)) in ops.iter().enumerate() {
            if *delta == 0 {
                cart.add(game(*id, Decimal::from(*id * 10) + dec!(0.99)));
            } else {
                cart.set_quantity(*id, *delta);
            }
            if i == 6 {
                cart.remove(2);
            }
            assert_eq!(cart.total(), expected_total(&cart));
            let mut ids: Vec<i64> = cart.entries().iter().map(|e| e.id).collect();
            ids.sort_unstable();
            ids.dedup();
            assert_eq!(ids.len(), cart.entries().len());
            assert!(cart.entries().iter().all(|e| e.qty >= 1));
        }
    }

    #[test]
    fn session_json_uses_browser_shape() {
        let mut cart = Cart::new();
        cart.add(game(1, dec!(50.00)));
        let json = cart.to_session_json();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value[0]["id"], 1);
        assert_eq!(value[0]["qty"], 1);
        assert_eq!(Cart::from_session_json(Some(&json)), cart);
    }

    #[test]
    fn unreadable_session_data_yields_empty_cart() {
        assert!(Cart::from_session_json(Some("{not json")).is_empty());
        assert!(Cart::from_session_json(None).is_empty());
    }

    #[test]
    fn clear_empties_and_checkout_lines_carry_snapshot() {
        let mut cart = Cart::new();
        cart.add(game(1, dec!(50.00)));
        cart.add(game(1, dec!(50.00)));

        let lines = cart.to_checkout_lines();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].qty, 2);
        assert_eq!(lines[0].price, Some(dec!(50.00)));

        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.total(), Decimal::ZERO);
    }
}
