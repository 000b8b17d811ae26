use std::{fmt::Display, str::FromStr};

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

//--------------------------------------     TalerAmount     ---------------------------------------------------------

/// An amount in a Taler-denominated asset, carried on the wire as `CURRENCY:VALUE` (e.g. `CHF:12.50`).
///
/// The value is an exact decimal. Scaling to an asset's divisibility is done explicitly via [`TalerAmount::rounded`],
/// which rounds half-away-from-zero, matching how invoice totals are settled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TalerAmount {
    pub currency: String,
    pub value: Decimal,
}

#[derive(Debug, Clone, Error)]
pub enum TalerAmountError {
    #[error("'{0}' is not in CURRENCY:VALUE format")]
    MissingSeparator(String),
    #[error("'{0}' does not contain a currency code")]
    MissingCurrency(String),
    #[error("Invalid amount value in '{0}': {1}")]
    InvalidValue(String, String),
}

impl TalerAmount {
    pub fn new<S: Into<String>>(currency: S, value: Decimal) -> Self {
        Self { currency: currency.into(), value }
    }

    /// Rounds the value to `digits` decimal places, half-away-from-zero.
    pub fn rounded(&self, digits: u32) -> Self {
        Self { currency: self.currency.clone(), value: round_to_divisibility(self.value, digits) }
    }
}

fn round_to_divisibility(value: Decimal, digits: u32) -> Decimal {
    value.round_dp_with_strategy(digits, RoundingStrategy::MidpointAwayFromZero)
}

impl FromStr for TalerAmount {
    type Err = TalerAmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (currency, value) = s.split_once(':').ok_or_else(|| TalerAmountError::MissingSeparator(s.to_string()))?;
        if currency.trim().is_empty() {
            return Err(TalerAmountError::MissingCurrency(s.to_string()));
        }
        let value = Decimal::from_str(value.trim())
            .map_err(|e| TalerAmountError::InvalidValue(s.to_string(), e.to_string()))?;
        Ok(Self::new(currency.trim(), value))
    }
}

impl Display for TalerAmount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.currency, self.value)
    }
}
