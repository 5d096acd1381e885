//! Product Fixtures

use rust_decimal::{Decimal, prelude::ToPrimitive};
use rusty_money::{Money, iso::Currency};
use serde::Deserialize;

use crate::{fixtures::FixtureError, pricing::minor_scale, products::Product, settings};

/// Wrapper for products in YAML
#[derive(Debug, Deserialize)]
pub struct ProductsFixture {
    /// Products in catalogue order
    pub products: Vec<ProductFixture>,
}

/// Product fixture from YAML
#[derive(Debug, Deserialize)]
pub struct ProductFixture {
    /// External identity
    pub id: String,

    /// Internal code, defaults to the identity
    #[serde(default)]
    pub code: Option<String>,

    /// Product name
    pub name: String,

    /// Barcode
    #[serde(default)]
    pub barcode: Option<String>,

    /// Category
    #[serde(default)]
    pub category: Option<String>,

    /// Price (e.g. "125000.00 ARS")
    pub price: String,

    /// Available quantity
    #[serde(default)]
    pub stock: u32,
}

impl<'a> TryFrom<ProductFixture> for Product<'a> {
    type Error = FixtureError;

    fn try_from(fixture: ProductFixture) -> Result<Self, Self::Error> {
        let (minor_units, currency) = parse_price(&fixture.price)?;

        let mut product = Product::new(
            fixture.id,
            fixture.name,
            Money::from_minor(minor_units, currency),
            fixture.stock,
        );

        if let Some(code) = fixture.code {
            product.code = code;
        }

        product.barcode = fixture.barcode;
        product.category = fixture.category;

        Ok(product)
    }
}

/// Parse price string (e.g., "125000.00 ARS") into minor units and currency
///
/// # Errors
///
/// Returns an error if the amount is malformed, has more decimals than the currency allows, or
/// the currency is unknown.
pub fn parse_price(s: &str) -> Result<(i64, &'static Currency), FixtureError> {
    let mut parts = s.split_whitespace();

    let (Some(amount), Some(code), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(FixtureError::InvalidPrice(s.to_string()));
    };

    let currency = settings::parse_currency(code)
        .map_err(|_err| FixtureError::UnknownCurrency(code.to_string()))?;

    let amount = amount
        .parse::<Decimal>()
        .map_err(|_err| FixtureError::InvalidPrice(s.to_string()))?;

    let scale = minor_scale(currency).map_err(|_err| FixtureError::InvalidPrice(s.to_string()))?;

    let minor = amount
        .checked_mul(scale)
        .filter(|minor| minor.fract().is_zero())
        .and_then(|minor| minor.to_i64())
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?;

    Ok((minor, currency))
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::{ARS, CLP};
    use testresult::TestResult;

    use super::*;

    #[test]
    fn parse_price_reads_major_units() -> TestResult {
        assert_eq!(parse_price("125000.00 ARS")?, (12_500_000, ARS));
        assert_eq!(parse_price("8500 ARS")?, (850_000, ARS));
        assert_eq!(parse_price("1200 CLP")?, (1_200, CLP));

        Ok(())
    }

    #[test]
    fn parse_price_rejects_bad_input() {
        assert!(matches!(parse_price("12.345 ARS"), Err(FixtureError::InvalidPrice(_))));
        assert!(matches!(parse_price("12 ARS extra"), Err(FixtureError::InvalidPrice(_))));
        assert!(matches!(parse_price("twelve ARS"), Err(FixtureError::InvalidPrice(_))));
        assert!(matches!(parse_price("12"), Err(FixtureError::InvalidPrice(_))));
        assert!(matches!(parse_price("12 XYZ"), Err(FixtureError::UnknownCurrency(code)) if code == "XYZ"));
    }

    #[test]
    fn code_defaults_to_identity() -> TestResult {
        let fixture: ProductFixture =
            serde_norway::from_str("id: \"9\"\nname: Cable\nprice: 10.50 ARS\n")?;

        let product: Product<'_> = fixture.try_into()?;

        assert_eq!(product.code, "9");
        assert_eq!(product.stock, 0);
        assert_eq!(product.price, Money::from_minor(1_050, ARS));

        Ok(())
    }
}
