//! Display currencies supported by the storefront.
//!
//! Catalog prices are stored in USD. The selected currency affects display
//! only: conversion uses a fixed rate table and is never written back to
//! stored amounts.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Supported display currencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Currency {
    #[default]
    Usd,
    Eur,
    Inr,
}

impl Currency {
    /// Currency symbol used for display.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Usd => "$",
            Self::Eur => "\u{20ac}",
            Self::Inr => "\u{20b9}",
        }
    }

    /// ISO 4217 currency code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Usd => "USD",
            Self::Eur => "EUR",
            Self::Inr => "INR",
        }
    }

    /// Fixed display conversion rate from USD.
    #[must_use]
    pub fn rate(self) -> Decimal {
        match self {
            Self::Usd => Decimal::ONE,
            Self::Eur => Decimal::new(93, 2),
            Self::Inr => Decimal::new(8345, 2),
        }
    }

    /// Convert a USD amount into this currency at the fixed display rate,
    /// rounded to two decimal places.
    #[must_use]
    pub fn convert(self, usd_amount: Decimal) -> Decimal {
        (usd_amount * self.rate()).round_dp(2)
    }

    /// Format a USD amount for display in this currency (e.g. `"$19.99"`).
    #[must_use]
    pub fn display(self, usd_amount: Decimal) -> String {
        format!("{}{:.2}", self.symbol(), self.convert(usd_amount))
    }
}
