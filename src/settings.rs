//! Settings
//!
//! Currencies and rates used to price a cart.

use std::{fs, path::Path};

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use rusty_money::iso::{self, Currency};
use serde::Deserialize;
use thiserror::Error;

use crate::pricing::ExchangeRate;

/// Settings errors
#[derive(Debug, Error)]
pub enum SettingsError {
    /// IO error reading the settings file
    #[error("failed to read settings file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("failed to parse settings: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Unknown currency code
    #[error("unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Invalid percentage format
    #[error("invalid percentage: {0}")]
    InvalidPercentage(String),

    /// Invalid decimal amount
    #[error("invalid amount: {0}")]
    InvalidAmount(String),
}

/// Point-of-sale settings.
#[derive(Debug, Clone, Copy)]
pub struct Settings {
    /// Currency carts are priced in
    pub base_currency: &'static Currency,

    /// Tax charged on the cart subtotal
    pub tax_rate: Percentage,

    /// Rate for the secondary-currency total
    pub exchange_rate: ExchangeRate,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_currency: iso::ARS,
            tax_rate: Percentage::from(0.21),
            exchange_rate: ExchangeRate::new(iso::USD, Decimal::new(35_050, 2)),
        }
    }
}

/// Settings as written in YAML. Every field is optional and falls back to the default.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SettingsFile {
    /// Base currency code (e.g. `ARS`)
    pub base_currency: Option<String>,

    /// Secondary currency code (e.g. `USD`)
    pub secondary_currency: Option<String>,

    /// Base units per secondary unit (e.g. `"350.50"`)
    pub exchange_rate: Option<String>,

    /// Tax rate (e.g. `"21%"` or `"0.21"`)
    pub tax_rate: Option<String>,
}

impl TryFrom<SettingsFile> for Settings {
    type Error = SettingsError;

    fn try_from(file: SettingsFile) -> Result<Self, Self::Error> {
        let defaults = Settings::default();

        let base_currency = file
            .base_currency
            .as_deref()
            .map_or(Ok(defaults.base_currency), parse_currency)?;

        let secondary = file
            .secondary_currency
            .as_deref()
            .map_or(Ok(defaults.exchange_rate.currency()), parse_currency)?;

        let rate = file
            .exchange_rate
            .as_deref()
            .map_or(Ok(defaults.exchange_rate.rate()), parse_decimal)?;

        let tax_rate = file
            .tax_rate
            .as_deref()
            .map_or(Ok(defaults.tax_rate), parse_percentage)?;

        Ok(Settings {
            base_currency,
            tax_rate,
            exchange_rate: ExchangeRate::new(secondary, rate),
        })
    }
}

impl Settings {
    /// Parse settings from YAML.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is malformed or a value cannot be parsed.
    pub fn from_yaml(contents: &str) -> Result<Self, SettingsError> {
        let file: SettingsFile = serde_norway::from_str(contents)?;

        file.try_into()
    }

    /// Load settings from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        Self::from_yaml(&fs::read_to_string(path)?)
    }
}

/// Parse a supported ISO currency code.
///
/// # Errors
///
/// Returns [`SettingsError::UnknownCurrency`] for unsupported codes.
pub fn parse_currency(code: &str) -> Result<&'static Currency, SettingsError> {
    match code.trim() {
        "ARS" => Ok(iso::ARS),
        "USD" => Ok(iso::USD),
        "EUR" => Ok(iso::EUR),
        "BRL" => Ok(iso::BRL),
        "CLP" => Ok(iso::CLP),
        "UYU" => Ok(iso::UYU),
        other => Err(SettingsError::UnknownCurrency(other.to_string())),
    }
}

/// Parse percentage string (e.g., "21%" or "0.21") into a `Percentage`
///
/// # Errors
///
/// Returns an error if the string cannot be parsed.
pub fn parse_percentage(s: &str) -> Result<Percentage, SettingsError> {
    let trimmed = s.trim();

    if let Some(percent_str) = trimmed.strip_suffix('%') {
        let value = percent_str
            .trim()
            .parse::<f64>()
            .map_err(|_err| SettingsError::InvalidPercentage(s.to_string()))?;

        Ok(Percentage::from(value / 100.0))
    } else {
        let value = trimmed
            .parse::<f64>()
            .map_err(|_err| SettingsError::InvalidPercentage(s.to_string()))?;

        Ok(Percentage::from(value))
    }
}

/// Parse a decimal amount (e.g. "350.50").
///
/// # Errors
///
/// Returns [`SettingsError::InvalidAmount`] if the string is not a decimal number.
pub fn parse_decimal(s: &str) -> Result<Decimal, SettingsError> {
    s.trim()
        .parse::<Decimal>()
        .map_err(|_err| SettingsError::InvalidAmount(s.to_string()))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use testresult::TestResult;

    use crate::pricing::percent_of_minor;

    use super::*;

    #[test]
    fn defaults_match_point_of_sale() -> TestResult {
        let settings = Settings::default();

        assert_eq!(settings.base_currency, iso::ARS);
        assert_eq!(settings.exchange_rate.currency(), iso::USD);
        assert_eq!(settings.exchange_rate.rate(), Decimal::new(35_050, 2));
        assert_eq!(percent_of_minor(&settings.tax_rate, 10_000)?, 2_100);

        Ok(())
    }

    #[test]
    fn yaml_overrides_selected_fields() -> TestResult {
        let settings = Settings::from_yaml("exchange_rate: \"1000\"\ntax_rate: \"10.5%\"\n")?;

        assert_eq!(settings.base_currency, iso::ARS);
        assert_eq!(settings.exchange_rate.rate(), Decimal::from(1000));
        assert_eq!(percent_of_minor(&settings.tax_rate, 10_000)?, 1_050);

        Ok(())
    }

    #[test]
    fn unknown_currency_is_rejected() {
        let result = Settings::from_yaml("base_currency: XYZ\n");

        assert!(matches!(result, Err(SettingsError::UnknownCurrency(code)) if code == "XYZ"));
    }

    #[test]
    fn invalid_rate_is_rejected() {
        let result = Settings::from_yaml("exchange_rate: lots\n");

        assert!(matches!(result, Err(SettingsError::InvalidAmount(_))));
    }

    #[test]
    fn parse_percentage_accepts_both_forms() -> TestResult {
        let points = parse_percentage("21%")?;
        let fraction = parse_percentage("0.21")?;

        assert_eq!(percent_of_minor(&points, 100)?, 21);
        assert_eq!(percent_of_minor(&fraction, 100)?, 21);
        assert!(parse_percentage("abc%").is_err());

        Ok(())
    }

    #[test]
    fn load_reads_file() -> TestResult {
        let mut file = tempfile::NamedTempFile::new()?;
        writeln!(file, "base_currency: USD\nsecondary_currency: EUR\nexchange_rate: \"1.08\"")?;

        let settings = Settings::load(file.path())?;

        assert_eq!(settings.base_currency, iso::USD);
        assert_eq!(settings.exchange_rate.currency(), iso::EUR);

        Ok(())
    }
}
