//! Order Fixtures
//!
//! A recorded sequence of cart lines, with optional checkout details.

use serde::Deserialize;

use crate::sales::{Client, PaymentMethod, SaleKind};

/// Order fixture from YAML
#[derive(Debug, Deserialize)]
pub struct OrderFixture {
    /// Lines in the order they were added
    pub lines: Vec<OrderLine>,

    /// Checkout details
    #[serde(default)]
    pub checkout: Option<CheckoutFixture>,
}

/// One order line
#[derive(Debug, Deserialize)]
pub struct OrderLine {
    /// Product identity
    pub product: String,

    /// Quantity, defaults to one
    #[serde(default)]
    pub quantity: Option<u32>,

    /// Discount in percentage points (e.g. "10")
    #[serde(default)]
    pub discount: Option<String>,
}

/// Checkout details for an order
#[derive(Debug, Deserialize)]
pub struct CheckoutFixture {
    /// Seller's user handle
    pub seller: String,

    /// Client
    #[serde(default)]
    pub client: Option<Client>,

    /// Document kind
    pub kind: SaleKind,

    /// Payment method
    pub payment: PaymentMethod,
}
