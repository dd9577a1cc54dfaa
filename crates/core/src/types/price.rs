//! Type-safe price representation using decimal arithmetic.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., reais, not centavos).
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

    /// A zero amount in the given currency.
    #[must_use]
    pub const fn zero(currency_code: CurrencyCode) -> Self {
        Self::new(Decimal::ZERO, currency_code)
    }

    /// Price of `quantity` units at this unit price.
    ///
    /// Saturates at the largest representable amount instead of overflowing.
    #[must_use]
    pub fn times(&self, quantity: u32) -> Self {
        Self::new(
            self.amount.saturating_mul(Decimal::from(quantity)),
            self.currency_code,
        )
    }

    /// Sum of two prices, saturating like [`times`](Self::times).
    ///
    /// The result keeps this price's currency.
    #[must_use]
    pub fn saturating_add(&self, other: Self) -> Self {
        Self::new(self.amount.saturating_add(other.amount), self.currency_code)
    }

    /// Format for display (e.g., "R$ 139,90" or "$19.99").
    #[must_use]
    pub fn display(&self) -> String {
        let mut rounded = self.amount.round_dp(2);
        rounded.rescale(2);
        let digits = rounded.to_string();

        match self.currency_code {
            CurrencyCode::BRL => format!("R$ {}", digits.replace('.', ",")),
            _ => format!("{}{digits}", self.currency_code.symbol()),
        }
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.display())
    }
}

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    BRL,
    USD,
    EUR,
    GBP,
    CAD,
    AUD,
}

impl CurrencyCode {
    /// Currency symbol used when formatting prices.
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::BRL => "R$",
            Self::USD | Self::CAD | Self::AUD => "$",
            Self::EUR => "€",
            Self::GBP => "£",
        }
    }

    /// Three-letter ISO code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::BRL => "BRL",
            Self::USD => "USD",
            Self::EUR => "EUR",
            Self::GBP => "GBP",
            Self::CAD => "CAD",
            Self::AUD => "AUD",
        }
    }
}

/// Error returned when parsing an unknown currency code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown currency code: {0}")]
pub struct ParseCurrencyError(pub String);

impl FromStr for CurrencyCode {
    type Err = ParseCurrencyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BRL" => Ok(Self::BRL),
            "USD" => Ok(Self::USD),
            "EUR" => Ok(Self::EUR),
            "GBP" => Ok(Self::GBP),
            "CAD" => Ok(Self::CAD),
            "AUD" => Ok(Self::AUD),
            _ => Err(ParseCurrencyError(s.to_string())),
        }
    }
}
