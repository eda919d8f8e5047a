use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Payment rail chosen at checkout
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum PaymentMethod {
    Pix,
    CreditCard,
    Boleto,
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentMethod::Pix => write!(f, "pix"),
            PaymentMethod::CreditCard => write!(f, "credit-card"),
            PaymentMethod::Boleto => write!(f, "boleto"),
        }
    }
}

/// Order lifecycle status
///
/// `Pending → Processing → {Paid | Failed | Expired}`; the three
/// terminal states admit no further transition.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Processing,
    Paid,
    Failed,
    Expired,
}

impl OrderStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            OrderStatus::Paid | OrderStatus::Failed | OrderStatus::Expired
        )
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Paid => "paid",
            OrderStatus::Failed => "failed",
            OrderStatus::Expired => "expired",
        };
        write!(f, "{}", s)
    }
}

/// Frozen copy of a cart line at order creation time
///
/// Does not reference the live cart line, so later cart mutations cannot
/// affect a placed order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: String,
    pub name: String,
    pub price: Decimal,
    pub quantity: u32,
}

/// Method-specific settlement payload, opaque to the ledger
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pix_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pix_qr_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub boleto_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub boleto_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_last_digits: Option<String>,
}

/// Placed order snapshot
///
/// Immutable after creation except for `status`, `updated_at` and
/// `payment_details`, which only the order ledger mutates.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub user_id: String,
    pub items: Vec<OrderItem>,
    pub total: Decimal,
    pub payment_method: PaymentMethod,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_details: Option<PaymentDetails>,
}
