//! Catalog
//!
//! Products keyed by their external identity, as last read from the store.

use rustc_hash::FxHashMap;
use slotmap::SlotMap;
use thiserror::Error;

use crate::products::{Product, ProductKey};

/// Catalog errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    /// A product with this identity is already present.
    #[error("product {0} already exists")]
    Duplicate(String),

    /// No product with this identity.
    #[error("product {0} not found")]
    NotFound(String),
}

/// Authoritative available quantity by product identity.
pub trait StockSource {
    /// Units available for `product`, or `None` if the product is unknown.
    fn available(&self, product: &str) -> Option<u32>;
}

/// Product catalog
#[derive(Debug, Clone, Default)]
pub struct Catalog<'a> {
    products: SlotMap<ProductKey, Product<'a>>,
    keys: FxHashMap<String, ProductKey>,
}

impl<'a> Catalog<'a> {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self {
            products: SlotMap::with_key(),
            keys: FxHashMap::default(),
        }
    }

    /// Insert a product.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Duplicate`] if the identity is taken.
    pub fn insert(&mut self, product: Product<'a>) -> Result<ProductKey, CatalogError> {
        if self.keys.contains_key(&product.id) {
            return Err(CatalogError::Duplicate(product.id));
        }

        let id = product.id.clone();
        let key = self.products.insert(product);

        self.keys.insert(id, key);

        Ok(key)
    }

    /// Get a product by key.
    pub fn get(&self, key: ProductKey) -> Option<&Product<'a>> {
        self.products.get(key)
    }

    /// Get a product by identity.
    pub fn find(&self, id: &str) -> Option<&Product<'a>> {
        self.keys.get(id).and_then(|key| self.products.get(*key))
    }

    /// Key for a product identity.
    pub fn key(&self, id: &str) -> Option<ProductKey> {
        self.keys.get(id).copied()
    }

    /// Record a new available quantity for a product.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] if the product is unknown.
    pub fn set_stock(&mut self, id: &str, stock: u32) -> Result<(), CatalogError> {
        let product = self
            .keys
            .get(id)
            .and_then(|key| self.products.get_mut(*key))
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))?;

        product.stock = stock;

        Ok(())
    }

    /// Remove a product, returning it if it was present.
    pub fn remove(&mut self, id: &str) -> Option<Product<'a>> {
        let key = self.keys.remove(id)?;

        self.products.remove(key)
    }

    /// Products whose name or code contains `term` (case-insensitive), or whose barcode
    /// contains it verbatim. An empty term matches everything.
    pub fn search(&self, term: &str) -> Vec<&Product<'a>> {
        let needle = term.to_lowercase();

        self.products
            .values()
            .filter(|product| {
                product.name.to_lowercase().contains(&needle)
                    || product.code.to_lowercase().contains(&needle)
                    || product
                        .barcode
                        .as_deref()
                        .is_some_and(|barcode| barcode.contains(term))
            })
            .collect()
    }

    /// Iterate over every product.
    pub fn iter(&self) -> impl Iterator<Item = &Product<'a>> {
        self.products.values()
    }

    /// Number of products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Check if the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

impl StockSource for Catalog<'_> {
    fn available(&self, product: &str) -> Option<u32> {
        self.find(product).map(|product| product.stock)
    }
}
