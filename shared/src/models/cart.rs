use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One cart line
///
/// `id` identifies the line, not the product: a cart holds at most one
/// line per `product_id`, and re-adding a product increments `quantity`
/// instead of appending a second line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub id: String,
    pub product_id: String,
    pub name: String,
    pub price: Decimal,
    pub quantity: u32,
    pub image: String,
}

impl CartItem {
    /// `price × quantity` for this line
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}
