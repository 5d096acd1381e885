//! Fixtures

use std::{fs, path::PathBuf};

use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use rusty_money::iso::Currency;
use thiserror::Error;

use crate::{
    access::UserIdentity,
    cart::{Cart, CartError, LineUpdate},
    catalog::{Catalog, CatalogError},
    fixtures::{orders::OrderFixture, products::ProductsFixture, users::UsersFixture},
    products::Product,
    sales::{Checkout, Sale, SaleError, prepare_sale},
    settings::{Settings, SettingsError},
};

pub mod orders;
pub mod products;
pub mod users;

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Invalid discount format
    #[error("Invalid discount: {0}")]
    InvalidDiscount(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Currency mismatch between products
    #[error("Currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(String, String),

    /// Product not found
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// User not found
    #[error("User not found: {0}")]
    UserNotFound(String),

    /// No products loaded yet
    #[error("No products loaded yet; currency unknown")]
    NoCurrency,

    /// Order has no checkout details
    #[error("Order has no checkout details")]
    NoCheckout,

    /// Catalog error
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Cart error while replaying an order
    #[error("Failed to build cart: {0}")]
    Cart(#[from] CartError),

    /// Settings error
    #[error(transparent)]
    Settings(#[from] SettingsError),

    /// Sale preparation error
    #[error("Failed to prepare sale: {0}")]
    Sale(#[from] SaleError),
}

/// Fixture
#[derive(Debug)]
pub struct Fixture<'a> {
    /// Base path for fixture files
    base_path: PathBuf,

    /// Loaded products
    catalog: Catalog<'a>,

    /// Users by handle
    users: FxHashMap<String, UserIdentity>,

    /// Point-of-sale settings, defaults until loaded
    settings: Settings,

    /// Currency of the loaded products
    currency: Option<&'static Currency>,
}

impl<'a> Fixture<'a> {
    /// Create a new empty fixture with default base path
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Create a new empty fixture with custom base path
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            catalog: Catalog::new(),
            users: FxHashMap::default(),
            settings: Settings::default(),
            currency: None,
        }
    }

    /// Load products from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, if prices use different
    /// currencies, or if a product identity repeats.
    pub fn load_products(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self.base_path.join("products").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;
        let fixture: ProductsFixture = serde_norway::from_str(&contents)?;

        for product_fixture in fixture.products {
            let (_minor, currency) = products::parse_price(&product_fixture.price)?;
            let product: Product<'a> = product_fixture.try_into()?;

            if let Some(existing_currency) = self.currency {
                if existing_currency != currency {
                    return Err(FixtureError::CurrencyMismatch(
                        existing_currency.iso_alpha_code.to_string(),
                        currency.iso_alpha_code.to_string(),
                    ));
                }
            } else {
                self.currency = Some(currency);
            }

            self.catalog.insert(product)?;
        }

        Ok(self)
    }

    /// Load users from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_users(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self.base_path.join("users").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;
        let fixture: UsersFixture = serde_norway::from_str(&contents)?;

        self.users.extend(fixture.users);

        Ok(self)
    }

    /// Load settings from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or a value cannot be parsed.
    pub fn load_settings(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self.base_path.join("settings").join(format!("{name}.yml"));

        self.settings = Settings::load(file_path)?;

        Ok(self)
    }

    /// Load a complete fixture set (products, users and settings with the same name)
    ///
    /// # Errors
    ///
    /// Returns an error if any of the fixture files cannot be loaded.
    pub fn from_set(name: &str) -> Result<Self, FixtureError> {
        let mut fixture = Self::new();

        fixture
            .load_products(name)?
            .load_users(name)?
            .load_settings(name)?;

        Ok(fixture)
    }

    /// Read an order fixture
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn order(&self, name: &str) -> Result<OrderFixture, FixtureError> {
        let file_path = self.base_path.join("orders").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;

        Ok(serde_norway::from_str(&contents)?)
    }

    /// Replay an order into a new cart priced in the settings' base currency.
    ///
    /// Each line is added once, then its quantity and discount are applied as an update, so
    /// quantities beyond stock are clamped the way the point of sale clamps them.
    ///
    /// # Errors
    ///
    /// Returns an error if a product is unknown, a discount is malformed, or the cart rejects
    /// a line.
    pub fn cart(&self, order: &OrderFixture) -> Result<Cart<'a>, FixtureError> {
        let mut cart = Cart::new(self.settings.base_currency);

        for line in &order.lines {
            let product = self.product(&line.product)?;

            cart.add(product)?;

            let mut update = LineUpdate::default();

            if let Some(requested) = line.quantity {
                update = update.quantity(requested);
            }

            if let Some(discount) = &line.discount {
                let points = discount
                    .trim()
                    .parse::<Decimal>()
                    .map_err(|_err| FixtureError::InvalidDiscount(discount.clone()))?;

                update = update.discount(points);
            }

            cart.update_line(&line.product, update)?;
        }

        Ok(cart)
    }

    /// Check `cart` out with the order's checkout details against the loaded catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the order has no checkout details, the seller is unknown, or sale
    /// preparation fails.
    pub fn sale(&self, order: &OrderFixture, cart: &Cart<'a>) -> Result<Sale<'a>, FixtureError> {
        let details = order.checkout.as_ref().ok_or(FixtureError::NoCheckout)?;
        let seller = self.user(&details.seller)?;

        let checkout = Checkout {
            client: details.client.as_ref(),
            seller,
            kind: details.kind,
            payment: details.payment,
        };

        Ok(prepare_sale(cart, &checkout, &self.settings, &self.catalog)?)
    }

    /// Get a product by its identity
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found.
    pub fn product(&self, id: &str) -> Result<&Product<'a>, FixtureError> {
        self.catalog
            .find(id)
            .ok_or_else(|| FixtureError::ProductNotFound(id.to_string()))
    }

    /// Get a user by handle
    ///
    /// # Errors
    ///
    /// Returns an error if the user is not found.
    pub fn user(&self, handle: &str) -> Result<&UserIdentity, FixtureError> {
        self.users
            .get(handle)
            .ok_or_else(|| FixtureError::UserNotFound(handle.to_string()))
    }

    /// Get the catalog
    pub fn catalog(&self) -> &Catalog<'a> {
        &self.catalog
    }

    /// Get the catalog for stock changes
    pub fn catalog_mut(&mut self) -> &mut Catalog<'a> {
        &mut self.catalog
    }

    /// Get the settings
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Get the currency
    ///
    /// # Errors
    ///
    /// Returns an error if no products have been loaded yet.
    pub fn currency(&self) -> Result<&'static Currency, FixtureError> {
        self.currency.ok_or(FixtureError::NoCurrency)
    }
}

impl Default for Fixture<'_> {
    fn default() -> Self {
        Self::new()
    }
}
