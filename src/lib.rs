//! Tiller
//!
//! Tiller is the pricing and access core of a point-of-sale application: carts and their totals,
//! checkout-time sale validation, and role, plan and permission gating for the views a signed-in
//! user can reach.

pub mod access;
pub mod cart;
pub mod catalog;
pub mod fixtures;
pub mod prelude;
pub mod pricing;
pub mod products;
pub mod receipt;
pub mod sales;
pub mod session;
pub mod settings;
