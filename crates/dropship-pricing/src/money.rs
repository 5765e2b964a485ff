//! Currency and rounding helpers.
//!
//! Prices flow through the engine as `f64` decimal amounts (supplier feeds
//! report them that way) and are rounded to cents only at the edges, when a
//! [`PricingCalculationResult`](crate::PricingCalculationResult) is built.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported store currencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Currency {
    #[default]
    USD,
    EUR,
    GBP,
    CAD,
    AUD,
}

impl Currency {
    /// Get the currency code (e.g., "USD").
    pub fn code(&self) -> &'static str {
        match self {
            Currency::USD => "USD",
            Currency::EUR => "EUR",
            Currency::GBP => "GBP",
            Currency::CAD => "CAD",
            Currency::AUD => "AUD",
        }
    }

    /// Get the currency symbol (e.g., "$").
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::USD => "$",
            Currency::EUR => "\u{20ac}",
            Currency::GBP => "\u{00a3}",
            Currency::CAD => "CA$",
            Currency::AUD => "A$",
        }
    }

    /// Parse a currency code string.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.to_uppercase().as_str() {
            "USD" => Some(Currency::USD),
            "EUR" => Some(Currency::EUR),
            "GBP" => Some(Currency::GBP),
            "CAD" => Some(Currency::CAD),
            "AUD" => Some(Currency::AUD),
            _ => None,
        }
    }

    /// Format an amount as a display string (e.g., "$49.99").
    pub fn format(&self, amount: f64) -> String {
        format!("{}{:.2}", self.symbol(), amount)
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Round to `places` decimals, with ties going up.
///
/// NaN and infinities pass through unchanged.
pub fn round_half_up(value: f64, places: u32) -> f64 {
    let factor = 10_f64.powi(places as i32);
    (value * factor + 0.5).floor() / factor
}

/// Round a monetary or percentage value to cents / basis points.
pub fn round2(value: f64) -> f64 {
    round_half_up(value, 2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_half_up() {
        assert_eq!(round2(66.666_666), 66.67);
        assert_eq!(round2(0.125), 0.13);
        assert_eq!(round2(32.5), 32.5);
        assert_eq!(round_half_up(2.5, 0), 3.0);
    }

    #[test]
    fn test_round_passes_nan_through() {
        assert!(round2(f64::NAN).is_nan());
        assert!(round2(f64::INFINITY).is_infinite());
    }

    #[test]
    fn test_currency_format() {
        assert_eq!(Currency::USD.format(20.0), "$20.00");
        assert_eq!(Currency::GBP.format(3.5), "\u{00a3}3.50");
    }

    #[test]
    fn test_currency_from_code() {
        assert_eq!(Currency::from_code("usd"), Some(Currency::USD));
        assert_eq!(Currency::from_code("JPY"), None);
    }
}
