//! Shared domain types for the checkout core
//!
//! Records persisted by the services and consumed by callers:
//! users, catalog products, cart lines and orders.

pub mod models;

// Re-exports
pub use models::{
    CartItem, Order, OrderItem, OrderStatus, PaymentDetails, PaymentMethod, Product, User,
};
pub use serde::{Deserialize, Serialize};
