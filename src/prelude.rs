//! Tiller prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    access::{
        Access, AccessError, Denial, DenialReason, Feature, Notice, Plan, Requirement, Role,
        SuggestedAction, UserIdentity, evaluate,
        routes::{Navigation, Route, resolve},
    },
    cart::{Cart, CartError, LineItem, LineUpdate},
    catalog::{Catalog, CatalogError, StockSource},
    pricing::{ExchangeRate, PricingError, Totals, compute_totals},
    products::{Product, ProductKey},
    receipt::{Receipt, ReceiptError},
    sales::{Checkout, Client, PaymentMethod, Sale, SaleError, SaleKind, prepare_sale},
    session::{NoopObserver, ProfileUpdate, Session, SessionError, SessionEvent, SessionObserver},
    settings::{Settings, SettingsError},
};
