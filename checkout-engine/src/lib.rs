//! Checkout Engine - storefront checkout core
//!
//! Services behind a mock online-storefront checkout flow: a durable
//! string key-value store, account identity, a cart, an order ledger and
//! a payment settlement simulator.
//!
//! # Module structure
//!
//! ```text
//! checkout-engine/src/
//! ├── common/    # errors, logging
//! ├── store/     # KvStore trait, memory + redb backends, codec
//! ├── identity/  # registration, login, session pointer
//! ├── cart/      # cart lines, quantity rules
//! ├── orders/    # order ledger, status transitions, stats
//! ├── payment/   # settlement simulation
//! └── catalog    # static read-only product list
//! ```
//!
//! # Data flow
//!
//! Identity gates access → the cart accumulates lines → checkout hands a
//! frozen snapshot plus a payment method to the ledger → the payment
//! simulator drives the order to a terminal status → the caller clears
//! the cart on `Paid`.

pub mod cart;
pub mod catalog;
pub mod common;
pub mod identity;
pub mod orders;
pub mod payment;
pub mod store;

// Re-export public types
pub use cart::CartManager;
pub use common::{CoreError, CoreResult};
pub use common::logger::{init_logger, init_logger_with_file};
pub use identity::{IdentityService, ProfileUpdate};
pub use orders::{OrderLedger, OrderStats};
pub use payment::{OutcomeSource, PaymentSimulator, RandomSource};
pub use store::{KvStore, MemoryStore, RedbStore, StoreError, StoreResult};
