//! Presentment market of a request.

use acme_store_core::CurrencyCode;

/// The shopper's presentment context.
///
/// Shopify prices products in the currency of the country passed to the
/// `@inContext(country:)` directive; without one the store default is used.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Market {
    currency: Option<CurrencyCode>,
}

impl Market {
    /// Market presenting prices in `currency`.
    #[must_use]
    pub const fn new(currency: CurrencyCode) -> Self {
        Self {
            currency: Some(currency),
        }
    }

    /// Currency chosen by the shopper, if any.
    #[must_use]
    pub const fn currency(self) -> Option<CurrencyCode> {
        self.currency
    }

    /// Country code for `@inContext`.
    #[must_use]
    pub const fn country(self) -> Option<&'static str> {
        match self.currency {
            Some(currency) => Some(currency.default_country()),
            None => None,
        }
    }

    pub(crate) const fn cache_key(self) -> &'static str {
        match self.country() {
            Some(country) => country,
            None => "default",
        }
    }
}

impl From<Option<CurrencyCode>> for Market {
    fn from(currency: Option<CurrencyCode>) -> Self {
        Self { currency }
    }
}
