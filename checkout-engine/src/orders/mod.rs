//! Order ledger
//!
//! Creates immutable order snapshots from a cart, stores them and drives
//! status transitions. `update_status` is the only mutator of order state
//! besides creation; the payment simulator goes through it too.
//!
//! Orders are never deleted by normal flow; only the bulk [`OrderLedger::clear_all`]
//! maintenance operation removes them.

use crate::common::{CoreError, CoreResult};
use crate::store::{self, KvStore};
use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::{Order, OrderItem, OrderStatus, PaymentDetails, PaymentMethod};
use std::sync::Arc;

const ORDERS_KEY: &str = "checkout_app_orders";

/// Per-user (or global) order counters
///
/// `pending` buckets `pending` and `processing`; `failed` buckets
/// `failed` and `expired`; `total_revenue` sums paid orders only.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderStats {
    pub total: usize,
    pub paid: usize,
    pub pending: usize,
    pub failed: usize,
    pub total_revenue: Decimal,
}

/// Append-only order collection over the store
#[derive(Clone)]
pub struct OrderLedger {
    store: Arc<dyn KvStore>,
}

impl OrderLedger {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    fn orders(&self) -> CoreResult<Vec<Order>> {
        Ok(store::read_list(self.store.as_ref(), ORDERS_KEY)?)
    }

    fn save(&self, orders: &[Order]) -> CoreResult<()> {
        Ok(store::write_list(self.store.as_ref(), ORDERS_KEY, orders)?)
    }

    /// Create a new order in `Pending`
    ///
    /// `items` is frozen as given; later cart mutations cannot reach it.
    /// Fails with `Validation` on a blank user id, an empty item list or
    /// a non-positive total.
    pub fn create_order(
        &self,
        user_id: &str,
        items: Vec<OrderItem>,
        total: Decimal,
        payment_method: PaymentMethod,
        payment_details: Option<PaymentDetails>,
    ) -> CoreResult<Order> {
        if user_id.trim().is_empty() {
            return Err(CoreError::Validation("user id is required".into()));
        }
        if items.is_empty() {
            return Err(CoreError::Validation("cart is empty".into()));
        }
        if total <= Decimal::ZERO {
            return Err(CoreError::Validation(format!("invalid total: {}", total)));
        }

        let now = Utc::now();
        let order = Order {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            items,
            total,
            payment_method,
            status: OrderStatus::Pending,
            created_at: now,
            updated_at: now,
            payment_details,
        };

        let mut orders = self.orders()?;
        orders.push(order.clone());
        self.save(&orders)?;

        tracing::info!(
            order_id = %order.id,
            user_id = %order.user_id,
            total = %order.total,
            method = %order.payment_method,
            "Order created"
        );
        Ok(order)
    }

    /// Set an order's status and refresh `updated_at`
    ///
    /// Returns the updated order, or `None` when the id is unknown.
    /// Last write wins; there is no compare-and-swap here, which is
    /// acceptable for the single-user local model.
    pub fn update_status(
        &self,
        order_id: &str,
        status: OrderStatus,
    ) -> CoreResult<Option<Order>> {
        let mut orders = self.orders()?;

        let Some(order) = orders.iter_mut().find(|o| o.id == order_id) else {
            return Ok(None);
        };

        order.status = status;
        order.updated_at = Utc::now();
        let updated = order.clone();
        self.save(&orders)?;

        tracing::info!(order_id = %order_id, status = %status, "Order status updated");
        Ok(Some(updated))
    }

    pub fn get_order(&self, id: &str) -> CoreResult<Option<Order>> {
        Ok(self.orders()?.into_iter().find(|o| o.id == id))
    }

    /// A user's orders, newest first
    pub fn user_orders(&self, user_id: &str) -> CoreResult<Vec<Order>> {
        let mut orders: Vec<Order> = self
            .orders()?
            .into_iter()
            .filter(|o| o.user_id == user_id)
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    /// All orders in a given status, newest first
    pub fn orders_by_status(&self, status: OrderStatus) -> CoreResult<Vec<Order>> {
        let mut orders: Vec<Order> = self
            .orders()?
            .into_iter()
            .filter(|o| o.status == status)
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    /// Cancel an order that has not settled yet
    ///
    /// Only `Pending` and `Processing` orders are eligible; anything else
    /// fails with `InvalidState`. Cancellation lands on `Failed`.
    // TODO: cancellation maps to Failed instead of a distinct Cancelled
    // terminal status; introduce one if real order management semantics
    // are ever needed.
    pub fn cancel_order(&self, order_id: &str) -> CoreResult<Order> {
        let order = self
            .get_order(order_id)?
            .ok_or_else(|| CoreError::NotFound(format!("order {}", order_id)))?;

        if !matches!(
            order.status,
            OrderStatus::Pending | OrderStatus::Processing
        ) {
            return Err(CoreError::InvalidState(format!(
                "order {} cannot be cancelled from {}",
                order_id, order.status
            )));
        }

        // Eligibility was checked above, so the order is present
        let cancelled = self
            .update_status(order_id, OrderStatus::Failed)?
            .ok_or_else(|| CoreError::NotFound(format!("order {}", order_id)))?;
        tracing::info!(order_id = %order_id, "Order cancelled");
        Ok(cancelled)
    }

    /// Counters over all orders, or over one user's orders
    pub fn stats(&self, user_id: Option<&str>) -> CoreResult<OrderStats> {
        let orders = match user_id {
            Some(id) => self.user_orders(id)?,
            None => self.orders()?,
        };

        let mut stats = OrderStats {
            total: orders.len(),
            ..Default::default()
        };
        for order in &orders {
            match order.status {
                OrderStatus::Paid => {
                    stats.paid += 1;
                    stats.total_revenue += order.total;
                }
                OrderStatus::Pending | OrderStatus::Processing => stats.pending += 1,
                OrderStatus::Failed | OrderStatus::Expired => stats.failed += 1,
            }
        }
        Ok(stats)
    }

    /// Wipe the order collection (maintenance)
    pub fn clear_all(&self) -> CoreResult<()> {
        self.store.remove(ORDERS_KEY)?;
        Ok(())
    }
}
