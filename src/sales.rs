//! Sales
//!
//! A cart is a draft. Stock, client and payment method are validated when the sale is prepared,
//! against the store's authoritative quantities rather than the snapshot taken at add time.

use std::fmt;

use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::{
    access::{Feature, Plan, UserIdentity},
    cart::Cart,
    catalog::StockSource,
    pricing::{PricingError, Totals},
    settings::Settings,
};

/// Errors preparing a sale.
#[derive(Debug, Error, PartialEq)]
pub enum SaleError {
    /// The cart has no lines.
    #[error("the cart is empty")]
    EmptyCart,

    /// No client was selected.
    #[error("no client selected")]
    MissingClient,

    /// The payment method is not available on the seller's plan.
    #[error("payment method {method} is not available on plan {plan}")]
    PaymentUnavailable {
        /// Requested method
        method: PaymentMethod,
        /// Seller's plan
        plan: Plan,
    },

    /// A line references a product the store no longer knows.
    #[error("product {0} is no longer available")]
    UnknownProduct(String),

    /// Live stock dropped below the quantity in the cart.
    #[error("product {product} has {available} units in stock, {requested} in cart")]
    StockChanged {
        /// Product identity
        product: String,
        /// Quantity in the cart
        requested: u32,
        /// Live available quantity
        available: u32,
    },

    /// Totals could not be computed.
    #[error(transparent)]
    Pricing(#[from] PricingError),
}

/// Kind of document the sale produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaleKind {
    /// Invoice
    Factura,
    /// Quote
    Presupuesto,
    /// Reservation
    Reserva,
}

/// How the client pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Cash
    Efectivo,
    /// Debit card
    TarjetaDebito,
    /// Credit card
    TarjetaCredito,
    /// Bank transfer
    Transferencia,
    /// Mercado Pago
    MercadoPago,
    /// Charged to the client's current account
    CuentaCorriente,
}

impl PaymentMethod {
    /// Every payment method, in display order.
    pub const ALL: [PaymentMethod; 6] = [
        PaymentMethod::Efectivo,
        PaymentMethod::TarjetaDebito,
        PaymentMethod::TarjetaCredito,
        PaymentMethod::Transferencia,
        PaymentMethod::MercadoPago,
        PaymentMethod::CuentaCorriente,
    ];

    /// Wire name of the method.
    pub const fn as_str(self) -> &'static str {
        match self {
            PaymentMethod::Efectivo => "efectivo",
            PaymentMethod::TarjetaDebito => "tarjeta_debito",
            PaymentMethod::TarjetaCredito => "tarjeta_credito",
            PaymentMethod::Transferencia => "transferencia",
            PaymentMethod::MercadoPago => "mercado_pago",
            PaymentMethod::CuentaCorriente => "cuenta_corriente",
        }
    }

    /// Plan feature the method depends on, if any.
    pub const fn required_feature(self) -> Option<Feature> {
        match self {
            PaymentMethod::MercadoPago => Some(Feature::Mercadopago),
            _ => None,
        }
    }

    /// Whether the method can be used on `plan`.
    pub fn is_enabled_for(self, plan: Plan) -> bool {
        self.required_feature()
            .is_none_or(|feature| plan.includes(feature))
    }

    /// Methods usable on `plan`.
    pub fn enabled_for(plan: Plan) -> impl Iterator<Item = PaymentMethod> {
        PaymentMethod::ALL
            .into_iter()
            .filter(move |method| method.is_enabled_for(plan))
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The buyer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    /// Client identity
    pub id: String,
    /// Client name
    pub name: String,
}

/// Details supplied at checkout.
#[derive(Debug, Clone, Copy)]
pub struct Checkout<'c> {
    /// Selected client
    pub client: Option<&'c Client>,
    /// Signed-in seller
    pub seller: &'c UserIdentity,
    /// Document kind
    pub kind: SaleKind,
    /// Payment method
    pub payment: PaymentMethod,
}

/// One line of a prepared sale.
#[derive(Debug, Clone, PartialEq)]
pub struct SaleLine<'a> {
    /// Product identity
    pub product_id: String,
    /// Internal product code
    pub code: String,
    /// Product name at the time of sale
    pub name: String,
    /// Quantity sold
    pub quantity: u32,
    /// Unit price
    pub unit_price: Money<'a, Currency>,
    /// Discount in percentage points
    pub discount: Decimal,
    /// Line subtotal
    pub subtotal: Money<'a, Currency>,
}

/// A validated sale ready to be persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct Sale<'a> {
    /// Document kind
    pub kind: SaleKind,
    /// Client identity
    pub client_id: String,
    /// Seller identity
    pub seller_id: String,
    /// Payment method
    pub payment: PaymentMethod,
    /// Base currency
    pub currency: &'static Currency,
    /// Secondary currency
    pub secondary_currency: &'static Currency,
    /// Base units per secondary unit
    pub exchange_rate: Decimal,
    /// Sold lines
    pub lines: Vec<SaleLine<'a>>,
    /// Totals
    pub totals: Totals<'a>,
}

/// Validate `cart` for checkout and snapshot it as a [`Sale`].
///
/// The cart is not modified; clear it once the sale has been persisted.
///
/// # Errors
///
/// - [`SaleError::EmptyCart`]: the cart has no lines.
/// - [`SaleError::MissingClient`]: no client was selected.
/// - [`SaleError::PaymentUnavailable`]: the seller's plan lacks the payment method.
/// - [`SaleError::UnknownProduct`] / [`SaleError::StockChanged`]: live stock disagrees with the cart.
/// - [`SaleError::Pricing`]: totals could not be computed.
pub fn prepare_sale<'a>(
    cart: &Cart<'a>,
    checkout: &Checkout<'_>,
    settings: &Settings,
    stock: &impl StockSource,
) -> Result<Sale<'a>, SaleError> {
    if cart.is_empty() {
        return Err(SaleError::EmptyCart);
    }

    let client = checkout.client.ok_or(SaleError::MissingClient)?;

    if !checkout.payment.is_enabled_for(checkout.seller.plan) {
        return Err(SaleError::PaymentUnavailable {
            method: checkout.payment,
            plan: checkout.seller.plan,
        });
    }

    for line in cart.iter() {
        let available = stock
            .available(line.id())
            .ok_or_else(|| SaleError::UnknownProduct(line.id().to_string()))?;

        if line.quantity() > available {
            debug!(
                product = line.id(),
                requested = line.quantity(),
                available,
                "stock changed since the line was added"
            );

            return Err(SaleError::StockChanged {
                product: line.id().to_string(),
                requested: line.quantity(),
                available,
            });
        }
    }

    let totals = cart.totals(&settings.tax_rate, &settings.exchange_rate)?;

    let lines = cart
        .iter()
        .map(|line| SaleLine {
            product_id: line.id().to_string(),
            code: line.product().code.clone(),
            name: line.product().name.clone(),
            quantity: line.quantity(),
            unit_price: *line.unit_price(),
            discount: line.discount(),
            subtotal: *line.subtotal(),
        })
        .collect();

    info!(
        kind = ?checkout.kind,
        client = %client.id,
        seller = %checkout.seller.id,
        payment = %checkout.payment,
        total = %totals.total,
        "sale prepared"
    );

    Ok(Sale {
        kind: checkout.kind,
        client_id: client.id.clone(),
        seller_id: checkout.seller.id.clone(),
        payment: checkout.payment,
        currency: cart.currency(),
        secondary_currency: settings.exchange_rate.currency(),
        exchange_rate: settings.exchange_rate.rate(),
        lines,
        totals,
    })
}
