use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Catalog product record
///
/// Supplied by the static catalog and never mutated by the core.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    /// Strike-through price shown next to a discounted one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_price: Option<Decimal>,
    pub image: String,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    pub in_stock: bool,
    pub rating: f64,
    pub review_count: u32,
}
