//! Cart
//!
//! An ordered collection of line items, at most one per product. Every mutation either applies
//! in full or leaves the cart untouched.

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use thiserror::Error;
use tracing::debug;

use crate::{
    pricing::{ExchangeRate, PricingError, Totals, compute_totals, line_subtotal_minor},
    products::Product,
};

/// Errors related to cart mutations.
#[derive(Debug, Error, PartialEq)]
pub enum CartError {
    /// The product has no units available.
    #[error("product {product} is out of stock")]
    StockExhausted {
        /// Product identity
        product: String,
    },

    /// Adding another unit would exceed the available quantity.
    #[error("product {product} has {available} units available, {requested} requested")]
    StockInsufficient {
        /// Product identity
        product: String,
        /// Quantity the line would have reached
        requested: u32,
        /// Available quantity
        available: u32,
    },

    /// No line exists for the given product.
    #[error("line {0} not found")]
    LineNotFound(String),

    /// The product is priced in a different currency (product, product currency, cart currency).
    #[error("product {0} has currency {1}, but cart has currency {2}")]
    CurrencyMismatch(String, &'static str, &'static str),

    /// Line subtotal could not be computed.
    #[error(transparent)]
    Pricing(#[from] PricingError),
}

/// One product entry in a cart.
#[derive(Debug, Clone, PartialEq)]
pub struct LineItem<'a> {
    product: Product<'a>,
    quantity: u32,
    unit_price: Money<'a, Currency>,
    discount: Decimal,
    subtotal: Money<'a, Currency>,
}

impl<'a> LineItem<'a> {
    fn new(product: Product<'a>) -> Result<Self, PricingError> {
        let unit_price = product.price;
        let subtotal = subtotal_for(&unit_price, 1, Decimal::ZERO)?;

        Ok(Self {
            product,
            quantity: 1,
            unit_price,
            discount: Decimal::ZERO,
            subtotal,
        })
    }

    /// Line identity (the product identity)
    pub fn id(&self) -> &str {
        &self.product.id
    }

    /// Product snapshot this line was built from
    pub fn product(&self) -> &Product<'a> {
        &self.product
    }

    /// Quantity
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Unit price captured when the line was created
    pub fn unit_price(&self) -> &Money<'a, Currency> {
        &self.unit_price
    }

    /// Discount in percentage points
    pub fn discount(&self) -> Decimal {
        self.discount
    }

    /// `quantity × unit price × (1 − discount/100)`
    pub fn subtotal(&self) -> &Money<'a, Currency> {
        &self.subtotal
    }
}

fn subtotal_for<'a>(
    unit_price: &Money<'a, Currency>,
    quantity: u32,
    discount: Decimal,
) -> Result<Money<'a, Currency>, PricingError> {
    let minor = line_subtotal_minor(unit_price.to_minor_units(), quantity, discount)?;

    Ok(Money::from_minor(minor, unit_price.currency()))
}

/// Fields to change on an existing line. Unset fields are left as they are.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LineUpdate {
    /// New quantity, clamped to `[1, available]`
    pub quantity: Option<u32>,

    /// New discount in percentage points, clamped to `[0, 100]`
    pub discount: Option<Decimal>,
}

impl LineUpdate {
    /// Set the quantity.
    #[must_use]
    pub fn quantity(mut self, quantity: u32) -> Self {
        self.quantity = Some(quantity);
        self
    }

    /// Set the discount percentage.
    #[must_use]
    pub fn discount(mut self, discount: Decimal) -> Self {
        self.discount = Some(discount);
        self
    }
}

/// Cart
#[derive(Debug, Clone)]
pub struct Cart<'a> {
    lines: Vec<LineItem<'a>>,
    currency: &'static Currency,
}

impl<'a> Cart<'a> {
    /// Create an empty cart priced in `currency`.
    #[must_use]
    pub fn new(currency: &'static Currency) -> Self {
        Cart {
            lines: Vec::new(),
            currency,
        }
    }

    /// Add one unit of `product`.
    ///
    /// A product already in the cart has its quantity incremented; otherwise a new line is
    /// appended at quantity 1, the product's listed price and no discount.
    ///
    /// # Errors
    ///
    /// - [`CartError::StockExhausted`]: the product has no available units.
    /// - [`CartError::StockInsufficient`]: the increment would exceed available units.
    /// - [`CartError::CurrencyMismatch`]: the product is priced in another currency.
    pub fn add(&mut self, product: &Product<'a>) -> Result<&LineItem<'a>, CartError> {
        let product_currency = product.price.currency();

        if product_currency != self.currency {
            return Err(CartError::CurrencyMismatch(
                product.id.clone(),
                product_currency.iso_alpha_code,
                self.currency.iso_alpha_code,
            ));
        }

        // The line's stock always tracks the newest product seen, even when the add fails.
        if let Some(line) = self.lines.iter_mut().find(|line| line.id() == product.id) {
            line.product.stock = product.stock;
        }

        if !product.in_stock() {
            debug!(product = %product.id, "rejected add: out of stock");

            return Err(CartError::StockExhausted {
                product: product.id.clone(),
            });
        }

        let Some(idx) = self.position(&product.id) else {
            self.lines.push(LineItem::new(product.clone())?);

            return self
                .lines
                .last()
                .ok_or_else(|| CartError::LineNotFound(product.id.clone()));
        };

        let line = self
            .lines
            .get_mut(idx)
            .ok_or_else(|| CartError::LineNotFound(product.id.clone()))?;

        let requested = line.quantity.saturating_add(1);

        if requested > product.stock {
            debug!(
                product = %product.id,
                requested,
                available = product.stock,
                "rejected add: insufficient stock"
            );

            return Err(CartError::StockInsufficient {
                product: product.id.clone(),
                requested,
                available: product.stock,
            });
        }

        line.subtotal = subtotal_for(&line.unit_price, requested, line.discount)?;
        line.quantity = requested;

        Ok(line)
    }

    /// Apply `update` to the line for product `id` and recompute its subtotal.
    ///
    /// # Errors
    ///
    /// - [`CartError::LineNotFound`]: no line exists for `id`.
    /// - [`CartError::Pricing`]: the new subtotal cannot be represented.
    pub fn update_line(&mut self, id: &str, update: LineUpdate) -> Result<&LineItem<'a>, CartError> {
        let line = self
            .lines
            .iter_mut()
            .find(|line| line.id() == id)
            .ok_or_else(|| CartError::LineNotFound(id.to_string()))?;

        let quantity = update.quantity.map_or(line.quantity, |quantity| {
            quantity.clamp(1, line.product.stock.max(1))
        });

        let discount = update.discount.map_or(line.discount, |discount| {
            discount.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED)
        });

        line.subtotal = subtotal_for(&line.unit_price, quantity, discount)?;
        line.quantity = quantity;
        line.discount = discount;

        Ok(line)
    }

    /// Remove the line for product `id`, returning it if it was present.
    pub fn remove_line(&mut self, id: &str) -> Option<LineItem<'a>> {
        let idx = self.position(id)?;

        Some(self.lines.remove(idx))
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Compute the cart totals.
    ///
    /// # Errors
    ///
    /// See [`compute_totals`].
    pub fn totals(
        &self,
        tax_rate: &Percentage,
        exchange_rate: &ExchangeRate,
    ) -> Result<Totals<'a>, PricingError> {
        compute_totals(self, tax_rate, exchange_rate)
    }

    /// Get the line for product `id`.
    pub fn line(&self, id: &str) -> Option<&LineItem<'a>> {
        self.lines.iter().find(|line| line.id() == id)
    }

    /// Iterate over the lines in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &LineItem<'a>> {
        self.lines.iter()
    }

    /// Number of lines in the cart.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Check if the cart is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Currency of the cart.
    #[must_use]
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.lines.iter().position(|line| line.id() == id)
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::{ARS, USD};
    use testresult::TestResult;

    use super::*;

    fn laptop(stock: u32) -> Product<'static> {
        Product::new("1", "Laptop Dell Inspiron 15", Money::from_minor(12_500_000, ARS), stock)
    }

    fn mouse(stock: u32) -> Product<'static> {
        Product::new("2", "Mouse Logitech MX Master 3", Money::from_minor(850_000, ARS), stock)
    }

    #[test]
    fn add_inserts_line_at_listed_price() -> TestResult {
        let mut cart = Cart::new(ARS);

        let line = cart.add(&laptop(15))?;

        assert_eq!(line.quantity(), 1);
        assert_eq!(line.unit_price(), &Money::from_minor(12_500_000, ARS));
        assert_eq!(line.discount(), Decimal::ZERO);
        assert_eq!(line.subtotal(), &Money::from_minor(12_500_000, ARS));

        Ok(())
    }

    #[test]
    fn adding_same_product_twice_increments_one_line() -> TestResult {
        let mut cart = Cart::new(ARS);
        let product = laptop(15);

        cart.add(&product)?;
        cart.add(&product)?;

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.line("1").map(LineItem::quantity), Some(2));
        assert_eq!(
            cart.line("1").map(LineItem::subtotal),
            Some(&Money::from_minor(25_000_000, ARS))
        );

        Ok(())
    }

    #[test]
    fn lines_keep_insertion_order() -> TestResult {
        let mut cart = Cart::new(ARS);

        cart.add(&mouse(45))?;
        cart.add(&laptop(15))?;
        cart.add(&mouse(45))?;

        let ids: Vec<&str> = cart.iter().map(LineItem::id).collect();

        assert_eq!(ids, vec!["2", "1"]);

        Ok(())
    }

    #[test]
    fn add_out_of_stock_leaves_cart_unchanged() {
        let mut cart = Cart::new(ARS);

        let result = cart.add(&laptop(0));

        assert_eq!(
            result.map(LineItem::quantity),
            Err(CartError::StockExhausted {
                product: "1".to_string()
            })
        );
        assert!(cart.is_empty());
    }

    #[test]
    fn add_beyond_stock_keeps_quantity() -> TestResult {
        let mut cart = Cart::new(ARS);
        let product = laptop(2);

        cart.add(&product)?;
        cart.add(&product)?;

        let result = cart.add(&product).map(LineItem::quantity);

        assert_eq!(
            result,
            Err(CartError::StockInsufficient {
                product: "1".to_string(),
                requested: 3,
                available: 2,
            })
        );
        assert_eq!(cart.line("1").map(LineItem::quantity), Some(2));

        Ok(())
    }

    #[test]
    fn failed_add_still_refreshes_stock_bound() -> TestResult {
        let mut cart = Cart::new(ARS);
        let plenty = laptop(5);

        cart.add(&plenty)?;
        cart.add(&plenty)?;
        cart.add(&plenty)?;

        let result = cart.add(&laptop(2)).map(LineItem::quantity);

        assert_eq!(
            result,
            Err(CartError::StockInsufficient {
                product: "1".to_string(),
                requested: 4,
                available: 2,
            })
        );

        let line = cart.update_line("1", LineUpdate::default().quantity(5))?;

        assert_eq!(line.quantity(), 2);
        assert_eq!(line.product().stock, 2);

        Ok(())
    }

    #[test]
    fn exhausted_add_lowers_existing_line_bound() -> TestResult {
        let mut cart = Cart::new(ARS);
        cart.add(&laptop(5))?;

        assert!(cart.add(&laptop(0)).is_err());

        let line = cart.update_line("1", LineUpdate::default().quantity(3))?;

        assert_eq!(line.quantity(), 1);
        assert_eq!(line.product().stock, 0);

        Ok(())
    }

    #[test]
    fn add_rejects_foreign_currency() {
        let mut cart = Cart::new(ARS);
        let product = Product::new("usd", "Imported", Money::from_minor(100, USD), 3);

        let result = cart.add(&product).map(LineItem::quantity);

        assert_eq!(
            result,
            Err(CartError::CurrencyMismatch(
                "usd".to_string(),
                USD.iso_alpha_code,
                ARS.iso_alpha_code
            ))
        );
        assert!(cart.is_empty());
    }

    #[test]
    fn update_line_clamps_quantity_to_stock() -> TestResult {
        let mut cart = Cart::new(ARS);
        cart.add(&laptop(5))?;

        let high = cart.update_line("1", LineUpdate::default().quantity(50))?.quantity();
        let low = cart.update_line("1", LineUpdate::default().quantity(0))?.quantity();

        assert_eq!(high, 5);
        assert_eq!(low, 1);

        Ok(())
    }

    #[test]
    fn update_line_recomputes_subtotal_with_discount() -> TestResult {
        let mut cart = Cart::new(ARS);
        cart.add(&mouse(45))?;

        let line = cart.update_line(
            "2",
            LineUpdate::default().quantity(3).discount(Decimal::from(10)),
        )?;

        // 3 × 8500.00 × 0.9 = 22950.00
        assert_eq!(line.subtotal(), &Money::from_minor(2_295_000, ARS));

        let line = cart.update_line("2", LineUpdate::default().discount(Decimal::ZERO))?;

        assert_eq!(line.quantity(), 3);
        assert_eq!(line.subtotal(), &Money::from_minor(2_550_000, ARS));

        Ok(())
    }

    #[test]
    fn update_line_clamps_discount() -> TestResult {
        let mut cart = Cart::new(ARS);
        cart.add(&mouse(45))?;

        let over = cart
            .update_line("2", LineUpdate::default().discount(Decimal::from(150)))?
            .discount();
        let under = cart
            .update_line("2", LineUpdate::default().discount(Decimal::from(-5)))?
            .discount();

        assert_eq!(over, Decimal::ONE_HUNDRED);
        assert_eq!(under, Decimal::ZERO);

        Ok(())
    }

    #[test]
    fn update_unknown_line_errors() {
        let mut cart = Cart::new(ARS);

        let result = cart
            .update_line("missing", LineUpdate::default().quantity(2))
            .map(LineItem::quantity);

        assert_eq!(result, Err(CartError::LineNotFound("missing".to_string())));
    }

    #[test]
    fn remove_line_is_idempotent() -> TestResult {
        let mut cart = Cart::new(ARS);
        cart.add(&laptop(5))?;
        cart.add(&mouse(5))?;

        assert!(cart.remove_line("1").is_some());
        assert!(cart.remove_line("1").is_none());
        assert_eq!(cart.len(), 1);

        Ok(())
    }

    #[test]
    fn clear_empties_cart() -> TestResult {
        let mut cart = Cart::new(ARS);
        cart.add(&laptop(5))?;

        cart.clear();
        cart.clear();

        assert!(cart.is_empty());

        Ok(())
    }
}
