//! Pricing
//!
//! Line subtotal arithmetic and cart totals. All amounts are held in minor units and every
//! derived amount is rounded to the nearest minor unit, midpoint away from zero.

use decimal_percentage::Percentage;
use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;

use crate::cart::Cart;

/// Errors that can occur while pricing a cart.
#[derive(Debug, Error, PartialEq)]
pub enum PricingError {
    /// The exchange rate was zero or negative.
    #[error("exchange rate must be greater than zero, got {0}")]
    InvalidExchangeRate(Decimal),

    /// An intermediate amount could not be represented in minor units.
    #[error("amount overflowed or could not be represented in minor units")]
    Conversion,

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Rate used to express base-currency totals in a secondary currency.
///
/// `rate` is the number of base-currency major units per secondary-currency major unit
/// (e.g. `350.50` ARS per USD).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExchangeRate {
    currency: &'static Currency,
    rate: Decimal,
}

impl ExchangeRate {
    /// Create a new exchange rate into `currency`.
    #[must_use]
    pub fn new(currency: &'static Currency, rate: Decimal) -> Self {
        Self { currency, rate }
    }

    /// Secondary currency
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Base units per secondary unit
    pub fn rate(&self) -> Decimal {
        self.rate
    }
}

/// Derived cart totals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Totals<'a> {
    /// Sum of line subtotals
    pub subtotal: Money<'a, Currency>,

    /// Tax charged on the subtotal
    pub tax: Money<'a, Currency>,

    /// Subtotal plus tax
    pub total: Money<'a, Currency>,

    /// Total expressed in the secondary currency
    pub secondary_total: Money<'a, Currency>,
}

/// Compute the totals for a cart.
///
/// # Errors
///
/// - [`PricingError::InvalidExchangeRate`]: the exchange rate is zero or negative.
/// - [`PricingError::Conversion`]: an amount could not be represented in minor units.
/// - [`PricingError::Money`]: a line's currency differs from the cart currency.
pub fn compute_totals<'a>(
    cart: &Cart<'a>,
    tax_rate: &Percentage,
    exchange_rate: &ExchangeRate,
) -> Result<Totals<'a>, PricingError> {
    if exchange_rate.rate <= Decimal::ZERO {
        return Err(PricingError::InvalidExchangeRate(exchange_rate.rate));
    }

    let currency = cart.currency();

    let subtotal = cart
        .iter()
        .try_fold(Money::from_minor(0, currency), |acc, line| {
            acc.add(*line.subtotal())
        })?;

    let tax = Money::from_minor(
        percent_of_minor(tax_rate, subtotal.to_minor_units())?,
        currency,
    );

    let total = subtotal.add(tax)?;

    let secondary_total = Money::from_minor(
        convert_minor(total.to_minor_units(), currency, exchange_rate)?,
        exchange_rate.currency,
    );

    Ok(Totals {
        subtotal,
        tax,
        total,
        secondary_total,
    })
}

/// Subtotal of a line in minor units: `quantity × unit × (1 − discount/100)`.
///
/// `discount` is in percentage points (`10` means 10%).
///
/// # Errors
///
/// Returns [`PricingError::Conversion`] if the product overflows.
pub fn line_subtotal_minor(
    unit_minor: i64,
    quantity: u32,
    discount: Decimal,
) -> Result<i64, PricingError> {
    let remaining = Decimal::ONE_HUNDRED
        .checked_sub(discount)
        .ok_or(PricingError::Conversion)?;

    Decimal::from(unit_minor)
        .checked_mul(Decimal::from(quantity))
        .and_then(|gross| gross.checked_mul(remaining))
        .and_then(|scaled| scaled.checked_div(Decimal::ONE_HUNDRED))
        .ok_or(PricingError::Conversion)
        .and_then(round_to_minor)
}

/// Apply a percentage to a minor unit amount.
///
/// # Errors
///
/// Returns [`PricingError::Conversion`] if the result overflows.
pub fn percent_of_minor(percent: &Percentage, minor: i64) -> Result<i64, PricingError> {
    ((*percent) * Decimal::ONE)
        .checked_mul(Decimal::from(minor))
        .ok_or(PricingError::Conversion)
        .and_then(round_to_minor)
}

/// Convert a base-currency minor amount into secondary-currency minor units.
fn convert_minor(
    minor: i64,
    base: &Currency,
    exchange_rate: &ExchangeRate,
) -> Result<i64, PricingError> {
    let divisor = minor_scale(base)?
        .checked_mul(exchange_rate.rate)
        .ok_or(PricingError::Conversion)?;

    Decimal::from(minor)
        .checked_mul(minor_scale(exchange_rate.currency)?)
        .and_then(|scaled| scaled.checked_div(divisor))
        .ok_or(PricingError::Conversion)
        .and_then(round_to_minor)
}

/// Minor units per major unit of `currency` (100 for ARS and USD).
///
/// # Errors
///
/// Returns [`PricingError::Conversion`] if the currency exponent is out of range.
pub fn minor_scale(currency: &Currency) -> Result<Decimal, PricingError> {
    10_i64
        .checked_pow(currency.exponent)
        .map(Decimal::from)
        .ok_or(PricingError::Conversion)
}

fn round_to_minor(amount: Decimal) -> Result<i64, PricingError> {
    amount
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or(PricingError::Conversion)
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::{ARS, JPY, USD};
    use testresult::TestResult;

    use crate::{cart::LineUpdate, products::Product};

    use super::*;

    fn usd_rate() -> ExchangeRate {
        ExchangeRate::new(USD, Decimal::new(35050, 2))
    }

    #[test]
    fn line_subtotal_applies_quantity_and_discount() -> TestResult {
        assert_eq!(line_subtotal_minor(100_000, 2, Decimal::from(10))?, 180_000);
        assert_eq!(line_subtotal_minor(100_000, 2, Decimal::ZERO)?, 200_000);
        assert_eq!(line_subtotal_minor(100_000, 3, Decimal::ONE_HUNDRED)?, 0);

        Ok(())
    }

    #[test]
    fn line_subtotal_rounds_half_away_from_zero() -> TestResult {
        // 333 × 0.85 = 283.05
        assert_eq!(line_subtotal_minor(333, 1, Decimal::from(15))?, 283);
        // 5 × 0.5 = 2.5
        assert_eq!(line_subtotal_minor(5, 1, Decimal::from(50))?, 3);

        Ok(())
    }

    #[test]
    fn line_subtotal_overflow_returns_error() {
        let result = line_subtotal_minor(i64::MAX, u32::MAX, Decimal::ZERO);

        assert_eq!(result, Err(PricingError::Conversion));
    }

    #[test]
    fn percent_of_minor_calculates_tax() -> TestResult {
        let rate = Percentage::from(0.21);

        assert_eq!(percent_of_minor(&rate, 180_000)?, 37_800);

        Ok(())
    }

    #[test]
    fn scenario_totals_match_expected_amounts() -> TestResult {
        let mut cart = Cart::new(ARS);
        let product = Product::new("laptop", "Laptop", Money::from_minor(100_000, ARS), 10);

        cart.add(&product)?;
        cart.update_line(
            "laptop",
            LineUpdate::default()
                .quantity(2)
                .discount(Decimal::from(10)),
        )?;

        let totals = compute_totals(&cart, &Percentage::from(0.21), &usd_rate())?;

        assert_eq!(totals.subtotal, Money::from_minor(180_000, ARS));
        assert_eq!(totals.tax, Money::from_minor(37_800, ARS));
        assert_eq!(totals.total, Money::from_minor(217_800, ARS));

        // 2178.00 / 350.50 = 6.2139...
        assert_eq!(totals.secondary_total, Money::from_minor(621, USD));

        Ok(())
    }

    #[test]
    fn empty_cart_totals_are_zero() -> TestResult {
        let cart = Cart::new(ARS);

        let totals = compute_totals(&cart, &Percentage::from(0.21), &usd_rate())?;

        assert_eq!(totals.subtotal, Money::from_minor(0, ARS));
        assert_eq!(totals.tax, Money::from_minor(0, ARS));
        assert_eq!(totals.total, Money::from_minor(0, ARS));
        assert_eq!(totals.secondary_total, Money::from_minor(0, USD));

        Ok(())
    }

    #[test]
    fn totals_are_idempotent() -> TestResult {
        let mut cart = Cart::new(ARS);
        cart.add(&Product::new("a", "A", Money::from_minor(1_999, ARS), 5))?;
        cart.add(&Product::new("b", "B", Money::from_minor(45_050, ARS), 5))?;

        let tax = Percentage::from(0.21);
        let first = compute_totals(&cart, &tax, &usd_rate())?;
        let second = compute_totals(&cart, &tax, &usd_rate())?;

        assert_eq!(first, second);

        Ok(())
    }

    #[test]
    fn subtotal_sums_discounted_line_subtotals() -> TestResult {
        let mut cart = Cart::new(ARS);
        cart.add(&Product::new("a", "A", Money::from_minor(1_999, ARS), 5))?;
        cart.add(&Product::new("b", "B", Money::from_minor(45_050, ARS), 5))?;
        cart.add(&Product::new("c", "C", Money::from_minor(333, ARS), 5))?;

        // 3 × 19.99 × 0.85 = 50.9745
        cart.update_line("a", LineUpdate::default().quantity(3).discount(Decimal::from(15)))?;
        // 2 × 450.50 × 0.925 = 833.425
        cart.update_line("b", LineUpdate::default().quantity(2).discount(Decimal::new(75, 1)))?;

        let totals = compute_totals(&cart, &Percentage::from(0.21), &usd_rate())?;
        let line_sum: i64 = cart.iter().map(|line| line.subtotal().to_minor_units()).sum();

        assert_eq!(totals.subtotal.to_minor_units(), line_sum);
        assert_eq!(totals.subtotal, Money::from_minor(5_097 + 83_343 + 333, ARS));
        assert_eq!(
            totals.total.to_minor_units(),
            totals.subtotal.to_minor_units() + totals.tax.to_minor_units()
        );

        Ok(())
    }

    #[test]
    fn zero_or_negative_exchange_rate_is_rejected() {
        let cart = Cart::new(ARS);
        let tax = Percentage::from(0.21);

        let zero = compute_totals(&cart, &tax, &ExchangeRate::new(USD, Decimal::ZERO));
        let negative = compute_totals(&cart, &tax, &ExchangeRate::new(USD, Decimal::from(-1)));

        assert_eq!(zero, Err(PricingError::InvalidExchangeRate(Decimal::ZERO)));
        assert_eq!(negative, Err(PricingError::InvalidExchangeRate(Decimal::from(-1))));
    }

    #[test]
    fn conversion_respects_currency_exponents() -> TestResult {
        // 1000.00 USD at 0.0068 USD per JPY = 147059 JPY (no minor units)
        let rate = ExchangeRate::new(JPY, Decimal::new(68, 4));

        assert_eq!(convert_minor(100_000, USD, &rate)?, 147_059);

        Ok(())
    }
}
