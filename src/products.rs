//! Products

use rusty_money::{Money, iso::Currency};
use slotmap::new_key_type;

new_key_type! {
    /// Product Key
    pub struct ProductKey;
}

/// A product as read from the store.
#[derive(Debug, Clone, PartialEq)]
pub struct Product<'a> {
    /// External product identity
    pub id: String,

    /// Internal product code (e.g. `LAPTOP001`)
    pub code: String,

    /// Product name
    pub name: String,

    /// Barcode, when the product carries one
    pub barcode: Option<String>,

    /// Product category
    pub category: Option<String>,

    /// Listed unit price
    pub price: Money<'a, Currency>,

    /// Available quantity
    pub stock: u32,
}

impl<'a> Product<'a> {
    /// Create a product whose internal code is its identity.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        price: Money<'a, Currency>,
        stock: u32,
    ) -> Self {
        let id = id.into();

        Self {
            code: id.clone(),
            id,
            name: name.into(),
            barcode: None,
            category: None,
            price,
            stock,
        }
    }

    /// Whether any units are available.
    pub fn in_stock(&self) -> bool {
        self.stock > 0
    }
}
