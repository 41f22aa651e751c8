//! # Money & Currency
//!
//! Exact decimal money arithmetic. Amounts are [`rust_decimal::Decimal`] —
//! floats are never used for monetary values anywhere in the engine.
//!
//! Each [`Currency`] carries its minor-unit precision; [`Money`] values are
//! rounded to that precision with round-half-up ([`RoundingStrategy::MidpointAwayFromZero`])
//! at the billing boundary. Cross-currency arithmetic is a checked error,
//! never a silent conversion — conversion is out of scope for this engine.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::MoneyError;

/// Supported billing currencies with their minor-unit precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Currency {
    /// United States dollar (2 minor units).
    #[serde(rename = "USD")]
    Usd,
    /// Euro (2 minor units).
    #[serde(rename = "EUR")]
    Eur,
    /// Pound sterling (2 minor units).
    #[serde(rename = "GBP")]
    Gbp,
    /// United Arab Emirates dirham (2 minor units).
    #[serde(rename = "AED")]
    Aed,
    /// Pakistani rupee (2 minor units).
    #[serde(rename = "PKR")]
    Pkr,
    /// Japanese yen (0 minor units).
    #[serde(rename = "JPY")]
    Jpy,
}

impl Currency {
    /// Number of decimal places in this currency's minor unit.
    pub fn minor_units(&self) -> u32 {
        match self {
            Self::Usd | Self::Eur | Self::Gbp | Self::Aed | Self::Pkr => 2,
            Self::Jpy => 0,
        }
    }

    /// The ISO 4217 code for this currency.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Usd => "USD",
            Self::Eur => "EUR",
            Self::Gbp => "GBP",
            Self::Aed => "AED",
            Self::Pkr => "PKR",
            Self::Jpy => "JPY",
        }
    }

    /// Parse an ISO 4217 code (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns [`MoneyError::UnknownCurrency`] for codes outside the
    /// supported set.
    pub fn parse(code: &str) -> Result<Self, MoneyError> {
        match code.trim().to_ascii_uppercase().as_str() {
            "USD" => Ok(Self::Usd),
            "EUR" => Ok(Self::Eur),
            "GBP" => Ok(Self::Gbp),
            "AED" => Ok(Self::Aed),
            "PKR" => Ok(Self::Pkr),
            "JPY" => Ok(Self::Jpy),
            other => Err(MoneyError::UnknownCurrency(other.to_string())),
        }
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Currency {
    type Err = MoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// An exact monetary amount paired with its currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    /// The exact decimal amount.
    pub amount: Decimal,
    /// The currency the amount is denominated in.
    pub currency: Currency,
}

impl Money {
    /// Create a money value. Amounts may be any sign; billing operations
    /// that require non-negative values validate at their own boundary.
    pub fn new(amount: Decimal, currency: Currency) -> Self {
        Self { amount, currency }
    }

    /// The zero amount in the given currency.
    pub fn zero(currency: Currency) -> Self {
        Self::new(Decimal::ZERO, currency)
    }

    /// Add another amount, rejecting cross-currency addition.
    ///
    /// # Errors
    ///
    /// Returns [`MoneyError::CurrencyMismatch`] if the currencies differ.
    pub fn checked_add(&self, other: &Money) -> Result<Money, MoneyError> {
        if self.currency != other.currency {
            return Err(MoneyError::CurrencyMismatch {
                expected: self.currency,
                actual: other.currency,
            });
        }
        Ok(Money::new(self.amount + other.amount, self.currency))
    }

    /// Round to the currency's minor-unit precision, round-half-up.
    pub fn rounded(&self) -> Money {
        Money::new(
            round_half_up(self.amount, self.currency.minor_units()),
            self.currency,
        )
    }

    /// Whether the amount is negative.
    pub fn is_negative(&self) -> bool {
        self.amount.is_sign_negative() && !self.amount.is_zero()
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.amount, self.currency)
    }
}

/// Round an amount to `dp` decimal places, round-half-up.
pub fn round_half_up(amount: Decimal, dp: u32) -> Decimal {
    amount.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}
