//! Cart manager
//!
//! Maintains the ordered line list for the current session. Two rules
//! carry all the weight here:
//!
//! - at most one line per `product_id`; re-adding a product increments
//!   its quantity instead of appending a duplicate line
//! - a line whose quantity would reach 0 is removed, never zeroed
//!
//! Every mutator re-reads the cart, applies the change, persists the
//! full list and returns the resulting snapshot. Callers must work from
//! the returned snapshot, not from assumed in-place mutation.

use crate::common::CoreResult;
use crate::store::{self, KvStore};
use rust_decimal::Decimal;
use shared::CartItem;
use std::sync::Arc;

const CART_KEY: &str = "checkout_app_cart";

/// Cart line list over the store
///
/// A single cart key is used for the whole device: multiple accounts on
/// one device share one cart. Known limitation, kept from the original
/// design.
#[derive(Clone)]
pub struct CartManager {
    store: Arc<dyn KvStore>,
}

impl CartManager {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    /// Current line list
    pub fn items(&self) -> CoreResult<Vec<CartItem>> {
        Ok(store::read_list(self.store.as_ref(), CART_KEY)?)
    }

    fn save(&self, cart: &[CartItem]) -> CoreResult<()> {
        Ok(store::write_list(self.store.as_ref(), CART_KEY, cart)?)
    }

    /// Add one unit of a product
    ///
    /// Merges into an existing line for the same `product_id`, otherwise
    /// appends a fresh line with quantity 1 and a new line id.
    pub fn add_item(
        &self,
        product_id: &str,
        name: &str,
        price: Decimal,
        image: &str,
    ) -> CoreResult<Vec<CartItem>> {
        let mut cart = self.items()?;

        if let Some(line) = cart.iter_mut().find(|l| l.product_id == product_id) {
            line.quantity = line.quantity.saturating_add(1);
        } else {
            cart.push(CartItem {
                id: uuid::Uuid::new_v4().to_string(),
                product_id: product_id.to_string(),
                name: name.to_string(),
                price,
                quantity: 1,
                image: image.to_string(),
            });
        }

        self.save(&cart)?;
        Ok(cart)
    }

    /// Set a line's quantity; values below 0 clamp to 0, and 0 removes
    /// the line. Values above `u32::MAX` saturate so a surviving line
    /// always keeps quantity >= 1. Unknown ids are a no-op returning the
    /// current cart.
    pub fn set_quantity(&self, item_id: &str, quantity: i64) -> CoreResult<Vec<CartItem>> {
        let mut cart = self.items()?;

        let Some(line) = cart.iter_mut().find(|l| l.id == item_id) else {
            return Ok(cart);
        };

        let quantity = quantity.clamp(0, i64::from(u32::MAX));
        if quantity == 0 {
            return self.remove_item(item_id);
        }

        line.quantity = quantity as u32;
        self.save(&cart)?;
        Ok(cart)
    }

    /// Bump a line's quantity by one
    pub fn increment(&self, item_id: &str) -> CoreResult<Vec<CartItem>> {
        let current = self.quantity_of(item_id)?;
        self.set_quantity(item_id, i64::from(current) + 1)
    }

    /// Drop a line's quantity by one; a quantity-1 line is removed
    pub fn decrement(&self, item_id: &str) -> CoreResult<Vec<CartItem>> {
        let current = self.quantity_of(item_id)?;
        self.set_quantity(item_id, i64::from(current) - 1)
    }

    /// Remove a line outright
    pub fn remove_item(&self, item_id: &str) -> CoreResult<Vec<CartItem>> {
        let mut cart = self.items()?;
        cart.retain(|l| l.id != item_id);
        self.save(&cart)?;
        Ok(cart)
    }

    /// Empty the cart
    pub fn clear(&self) -> CoreResult<()> {
        self.store.remove(CART_KEY)?;
        Ok(())
    }

    /// `Σ price × quantity` over all lines
    pub fn total(&self) -> CoreResult<Decimal> {
        Ok(self.items()?.iter().map(CartItem::line_total).sum())
    }

    /// `Σ quantity` over all lines (distinct from line count)
    pub fn count(&self) -> CoreResult<u64> {
        Ok(self.items()?.iter().map(|l| u64::from(l.quantity)).sum())
    }

    /// Quantity of a line, 0 when absent
    pub fn quantity_of(&self, item_id: &str) -> CoreResult<u32> {
        Ok(self
            .items()?
            .iter()
            .find(|l| l.id == item_id)
            .map(|l| l.quantity)
            .unwrap_or(0))
    }

    /// Whether any line references the product
    pub fn has_product(&self, product_id: &str) -> CoreResult<bool> {
        Ok(self.items()?.iter().any(|l| l.product_id == product_id))
    }

    /// The line referencing the product, if any
    pub fn item_by_product(&self, product_id: &str) -> CoreResult<Option<CartItem>> {
        Ok(self
            .items()?
            .into_iter()
            .find(|l| l.product_id == product_id))
    }

    /// Merge another cart into this one (login-time reconciliation)
    ///
    /// Quantities are added on a product match; otherwise the incoming
    /// line is appended under a newly generated id, never its own, so a
    /// merge cannot introduce line-id collisions.
    pub fn merge(&self, incoming: Vec<CartItem>) -> CoreResult<Vec<CartItem>> {
        let mut cart = self.items()?;

        for item in incoming {
            if let Some(line) = cart.iter_mut().find(|l| l.product_id == item.product_id) {
                line.quantity = line.quantity.saturating_add(item.quantity);
            } else {
                cart.push(CartItem {
                    id: uuid::Uuid::new_v4().to_string(),
                    ..item
                });
            }
        }

        self.save(&cart)?;
        Ok(cart)
    }

    /// Drop malformed lines; persists only when something was dropped
    pub fn validate(&self) -> CoreResult<Vec<CartItem>> {
        let cart = self.items()?;
        let before = cart.len();

        let valid: Vec<CartItem> = cart
            .into_iter()
            .filter(|l| {
                !l.id.is_empty()
                    && !l.product_id.is_empty()
                    && !l.name.is_empty()
                    && l.price > Decimal::ZERO
                    && l.quantity > 0
            })
            .collect();

        if valid.len() != before {
            tracing::warn!(
                dropped = before - valid.len(),
                "Dropped invalid cart lines"
            );
            self.save(&valid)?;
        }
        Ok(valid)
    }
}
