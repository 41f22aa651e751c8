//! # Core Error Hierarchy
//!
//! Structured error types shared across the billing engine, built with
//! `thiserror`. No `Box<dyn Error>`, no `.unwrap()` outside tests.
//!
//! Each error variant carries the offending value so operators can diagnose
//! misconfiguration without guesswork. Domain-specific errors (rate
//! resolution, bin assignment, accrual) live in their own crates; this
//! module only covers the construction-time validation of core primitives
//! and money arithmetic.

use rust_decimal::Decimal;
use thiserror::Error;

/// Validation errors raised when constructing core domain primitives.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Country code is not exactly two ASCII letters.
    #[error("invalid country code: \"{0}\" (expected ISO 3166-1 alpha-2)")]
    InvalidCountryCode(String),

    /// Weight must be zero or positive.
    #[error("invalid weight: {0} kg (must not be negative)")]
    NegativeWeight(Decimal),

    /// A package dimension must be strictly positive.
    #[error("invalid dimension: {field} = {value} cm (must be positive)")]
    NonPositiveDimension {
        /// Which dimension was rejected (`length_cm`, `width_cm`, `height_cm`).
        field: &'static str,
        /// The rejected value.
        value: Decimal,
    },

    /// An effective period must end strictly after it starts.
    #[error("invalid effective period: until {until} is not after from {from}")]
    EmptyPeriod {
        /// Inclusive start of the period.
        from: chrono::NaiveDate,
        /// Exclusive end of the period.
        until: chrono::NaiveDate,
    },

    /// A day range must end strictly after it starts.
    #[error("invalid day range: end {end} is not after start {start}")]
    EmptyDayRange {
        /// Inclusive start of the range.
        start: chrono::NaiveDate,
        /// Exclusive end of the range.
        end: chrono::NaiveDate,
    },

    /// Unknown service level string.
    #[error("invalid service level: \"{0}\" (expected economy, standard, or express)")]
    InvalidServiceLevel(String),

    /// A monetary rate field must not be negative.
    #[error("invalid rate amount: {field} = {value} (must not be negative)")]
    NegativeRate {
        /// Which rate field was rejected.
        field: &'static str,
        /// The rejected value.
        value: Decimal,
    },
}

/// Errors raised by money arithmetic.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MoneyError {
    /// Two amounts in different currencies cannot be combined.
    ///
    /// Currency conversion is out of scope for this engine; every
    /// computation is expected to be pre-normalized to one currency.
    #[error("currency mismatch: expected {expected}, got {actual}")]
    CurrencyMismatch {
        /// The currency of the left-hand operand.
        expected: crate::money::Currency,
        /// The currency of the right-hand operand.
        actual: crate::money::Currency,
    },

    /// Unknown currency code string.
    #[error("unknown currency code: \"{0}\"")]
    UnknownCurrency(String),
}
