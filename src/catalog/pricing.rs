//! Size & finish pricing

use rust_decimal::{Decimal, prelude::ToPrimitive};
use rustc_hash::FxHashMap;
use rusty_money::{
    Money,
    iso::{self, Currency},
};

use crate::catalog::CatalogError;

/// Per-size multipliers and per-finish surcharges applied to a product's base price.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceTable {
    sizes: FxHashMap<String, Decimal>,
    finishes: FxHashMap<String, Money<'static, Currency>>,
}

impl PriceTable {
    /// Create an empty price table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a size and the multiplier applied to the base price.
    #[must_use]
    pub fn with_size(mut self, size: impl Into<String>, multiplier: Decimal) -> Self {
        self.sizes.insert(size.into(), multiplier);
        self
    }

    /// Register a finish and the surcharge added per unit.
    #[must_use]
    pub fn with_finish(
        mut self,
        finish: impl Into<String>,
        surcharge: Money<'static, Currency>,
    ) -> Self {
        self.finishes.insert(finish.into(), surcharge);
        self
    }

    /// Multiplier for a size
    pub fn size_multiplier(&self, size: &str) -> Option<Decimal> {
        self.sizes.get(size).copied()
    }

    /// Surcharge for a finish
    pub fn finish_surcharge(&self, finish: &str) -> Option<Money<'static, Currency>> {
        self.finishes.get(finish).copied()
    }

    /// Unit price of a product in the given size and finish.
    ///
    /// The base price is scaled by the size multiplier, rounded to the
    /// currency's minor unit, then the finish surcharge is added.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::UnknownSize`] / [`CatalogError::UnknownFinish`]: the
    ///   selection is not in the table.
    /// - [`CatalogError::CurrencyMismatch`]: the surcharge is in a different
    ///   currency to the base price.
    /// - [`CatalogError::PriceOverflow`]: the result does not fit in minor units.
    pub fn unit_price(
        &self,
        base_price: Money<'static, Currency>,
        size: &str,
        finish: &str,
    ) -> Result<Money<'static, Currency>, CatalogError> {
        let multiplier = self
            .size_multiplier(size)
            .ok_or_else(|| CatalogError::UnknownSize(size.to_string()))?;

        let surcharge = self
            .finish_surcharge(finish)
            .ok_or_else(|| CatalogError::UnknownFinish(finish.to_string()))?;

        let currency = base_price.currency();

        if surcharge.currency() != currency {
            return Err(CatalogError::CurrencyMismatch(
                currency.iso_alpha_code.to_string(),
                surcharge.currency().iso_alpha_code.to_string(),
            ));
        }

        let sized_minor = Decimal::from(base_price.to_minor_units())
            .checked_mul(multiplier)
            .and_then(|value| value.round_dp(0).to_i64())
            .ok_or(CatalogError::PriceOverflow)?;

        let unit_minor = sized_minor
            .checked_add(surcharge.to_minor_units())
            .ok_or(CatalogError::PriceOverflow)?;

        Ok(Money::from_minor(unit_minor, currency))
    }
}

/// Parse a price string (e.g. "30.00 USD", "450000 VND").
///
/// # Errors
///
/// Returns an error if the string is not in the format "AMOUNT CURRENCY",
/// the amount is not a decimal number, or the currency code is not one the
/// storefront sells in.
pub fn parse_price(s: &str) -> Result<Money<'static, Currency>, CatalogError> {
    let mut parts = s.split_whitespace();

    let (Some(amount), Some(code), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(CatalogError::InvalidPrice(format!(
            "expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    };

    let amount = amount
        .parse::<Decimal>()
        .map_err(|_err| CatalogError::InvalidPrice(s.to_string()))?;

    Ok(Money::from_decimal(amount, parse_currency(code)?))
}

/// Parse a supported ISO currency code.
///
/// # Errors
///
/// Returns [`CatalogError::UnknownCurrency`] for codes outside USD, VND, EUR and GBP.
pub fn parse_currency(code: &str) -> Result<&'static Currency, CatalogError> {
    match code {
        "USD" => Ok(iso::USD),
        "VND" => Ok(iso::VND),
        "EUR" => Ok(iso::EUR),
        "GBP" => Ok(iso::GBP),
        other => Err(CatalogError::UnknownCurrency(other.to_string())),
    }
}

/// Parse a size multiplier such as "1", "3.8" or "0.25".
///
/// # Errors
///
/// Returns [`CatalogError::InvalidMultiplier`] when the value is not a
/// positive decimal.
pub fn parse_multiplier(s: &str) -> Result<Decimal, CatalogError> {
    let value = s
        .trim()
        .parse::<Decimal>()
        .map_err(|_err| CatalogError::InvalidMultiplier(s.to_string()))?;

    if value <= Decimal::ZERO {
        return Err(CatalogError::InvalidMultiplier(s.to_string()));
    }

    Ok(value)
}
