//! Type-safe price representation using decimal arithmetic.
//!
//! Shopify returns money as a decimal string plus an ISO 4217 code. Prices are
//! displayed with the narrow currency symbol, rounded to the currency's minor
//! units and followed by the code, e.g. `$1,299.00 USD`.

use core::fmt;
use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when building a [`Price`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PriceError {
    /// The amount is not a decimal number.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),
    /// The currency is not one the store presents prices in.
    #[error("unsupported currency: {0}")]
    UnsupportedCurrency(String),
}

/// ISO 4217 currency codes the storefront can present prices in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    USD,
    EUR,
    GBP,
    CAD,
    AUD,
    JPY,
}

impl CurrencyCode {
    /// Every supported currency, in selector order.
    pub const ALL: [Self; 6] = [
        Self::USD,
        Self::EUR,
        Self::GBP,
        Self::CAD,
        Self::AUD,
        Self::JPY,
    ];

    /// ISO 4217 code.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::USD => "USD",
            Self::EUR => "EUR",
            Self::GBP => "GBP",
            Self::CAD => "CAD",
            Self::AUD => "AUD",
            Self::JPY => "JPY",
        }
    }

    /// Narrow currency symbol.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::USD | Self::CAD | Self::AUD => "$",
            Self::EUR => "€",
            Self::GBP => "£",
            Self::JPY => "¥",
        }
    }

    /// Number of digits after the decimal point.
    #[must_use]
    pub const fn minor_units(self) -> u32 {
        match self {
            Self::JPY => 0,
            _ => 2,
        }
    }

    /// Country whose market presents prices in this currency.
    ///
    /// Passed to Shopify's `@inContext(country:)` directive.
    #[must_use]
    pub const fn default_country(self) -> &'static str {
        match self {
            Self::USD => "US",
            Self::EUR => "DE",
            Self::GBP => "GB",
            Self::CAD => "CA",
            Self::AUD => "AU",
            Self::JPY => "JP",
        }
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CurrencyCode {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|code| code.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| PriceError::UnsupportedCurrency(s.to_string()))
    }
}

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., dollars, not cents).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// Parse a price from Shopify's `{ amount, currencyCode }` strings.
    ///
    /// # Errors
    ///
    /// Returns an error if the amount is not a decimal or the currency is not
    /// supported.
    pub fn parse(amount: &str, currency_code: &str) -> Result<Self, PriceError> {
        let amount = Decimal::from_str(amount.trim())
            .map_err(|_| PriceError::InvalidAmount(amount.to_string()))?;
        Ok(Self::new(amount, currency_code.parse()?))
    }

    /// Amount rounded to the currency's minor units.
    fn rounded(&self) -> Decimal {
        self.amount.round_dp_with_strategy(
            self.currency_code.minor_units(),
            RoundingStrategy::MidpointAwayFromZero,
        )
    }

    /// `-` for amounts that stay negative after rounding.
    fn sign(&self) -> &'static str {
        let rounded = self.rounded();
        if rounded.is_sign_negative() && !rounded.is_zero() {
            "-"
        } else {
            ""
        }
    }

    /// Absolute amount rounded to the currency's minor units, with thousands
    /// separators.
    fn grouped_magnitude(&self) -> String {
        let units = self.currency_code.minor_units();
        let plain = format!("{:.*}", units as usize, self.rounded().abs());
        let (whole, fraction) = plain
            .split_once('.')
            .map_or((plain.as_str(), None), |(w, f)| (w, Some(f)));

        let mut grouped = String::with_capacity(plain.len() + whole.len() / 3);
        for (i, digit) in whole.chars().enumerate() {
            if i > 0 && (whole.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(digit);
        }
        if let Some(fraction) = fraction {
            grouped.push('.');
            grouped.push_str(fraction);
        }
        grouped
    }

    /// Amount rounded to the currency's minor units, with thousands separators.
    #[must_use]
    pub fn formatted_amount(&self) -> String {
        format!("{}{}", self.sign(), self.grouped_magnitude())
    }

    /// Format for display (e.g., `$19.99 USD`, `-$5.00 USD`).
    #[must_use]
    pub fn display(&self) -> String {
        format!(
            "{}{}{} {}",
            self.sign(),
            self.currency_code.symbol(),
            self.grouped_magnitude(),
            self.currency_code
        )
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

/// Format a raw Shopify money pair for display.
///
/// Unknown currencies or unparseable amounts are shown as `"{amount} {code}"`
/// rather than failing the page.
#[must_use]
pub fn format_money(amount: &str, currency_code: &str) -> String {
    Price::parse(amount, currency_code)
        .map_or_else(|_| format!("{amount} {currency_code}"), |price| price.display())
}
