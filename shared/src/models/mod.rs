//! Domain record definitions

pub mod cart;
pub mod order;
pub mod product;
pub mod user;

pub use cart::CartItem;
pub use order::{Order, OrderItem, OrderStatus, PaymentDetails, PaymentMethod};
pub use product::Product;
pub use user::User;
