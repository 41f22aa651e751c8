//! # Chargeable Weight
//!
//! Weight computation for billing. A package is billed on the greater of
//! its actual weight and its volumetric weight, where volumetric weight is
//! `(length × width × height) / 5000` with dimensions in centimeters and
//! the result in kilograms.
//!
//! The divisor applies per physical parcel: a multi-package shipment sums
//! each package's already-computed chargeable weight, never
//! volumetric-then-sum.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// The fixed volumetric divisor: cm³ per volumetric kilogram.
pub const VOLUMETRIC_DIVISOR: Decimal = dec!(5000);

/// A non-negative weight in kilograms.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct WeightKg(Decimal);

impl WeightKg {
    /// Create a weight, rejecting negative values.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::NegativeWeight`] for negative input.
    pub fn new(kg: Decimal) -> Result<Self, ValidationError> {
        if kg.is_sign_negative() && !kg.is_zero() {
            return Err(ValidationError::NegativeWeight(kg));
        }
        Ok(Self(kg))
    }

    /// The zero weight.
    pub fn zero() -> Self {
        Self(Decimal::ZERO)
    }

    /// Access the underlying decimal value in kilograms.
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// Sum two weights. Non-negative inputs keep the result valid.
    pub fn plus(&self, other: WeightKg) -> WeightKg {
        Self(self.0 + other.0)
    }
}

impl TryFrom<Decimal> for WeightKg {
    type Error = ValidationError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<WeightKg> for Decimal {
    fn from(w: WeightKg) -> Self {
        w.0
    }
}

impl std::fmt::Display for WeightKg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} kg", self.0)
    }
}

/// Validated physical dimensions of a package in centimeters.
///
/// All three dimensions must be strictly positive; a package with unknown
/// or partial dimensions simply carries no `PackageDimensions` at all, and
/// its volumetric weight is zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageDimensions {
    length_cm: Decimal,
    width_cm: Decimal,
    height_cm: Decimal,
}

impl PackageDimensions {
    /// Create dimensions, rejecting non-positive values.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::NonPositiveDimension`] naming the first
    /// offending field.
    pub fn new(
        length_cm: Decimal,
        width_cm: Decimal,
        height_cm: Decimal,
    ) -> Result<Self, ValidationError> {
        for (field, value) in [
            ("length_cm", length_cm),
            ("width_cm", width_cm),
            ("height_cm", height_cm),
        ] {
            if value <= Decimal::ZERO {
                return Err(ValidationError::NonPositiveDimension { field, value });
            }
        }
        Ok(Self {
            length_cm,
            width_cm,
            height_cm,
        })
    }

    /// Length in centimeters.
    pub fn length_cm(&self) -> Decimal {
        self.length_cm
    }

    /// Width in centimeters.
    pub fn width_cm(&self) -> Decimal {
        self.width_cm
    }

    /// Height in centimeters.
    pub fn height_cm(&self) -> Decimal {
        self.height_cm
    }

    /// Volumetric weight: `(L × W × H) / 5000`, centimeters in,
    /// kilograms out.
    pub fn volumetric_weight(&self) -> WeightKg {
        WeightKg(self.length_cm * self.width_cm * self.height_cm / VOLUMETRIC_DIVISOR)
    }
}

/// Volumetric weight of an optionally-dimensioned package.
///
/// Zero when dimensions are absent.
pub fn volumetric_weight(dims: Option<&PackageDimensions>) -> WeightKg {
    dims.map(PackageDimensions::volumetric_weight)
        .unwrap_or_else(WeightKg::zero)
}

/// Chargeable weight: the greater of actual and volumetric weight.
pub fn chargeable_weight(actual: WeightKg, dims: Option<&PackageDimensions>) -> WeightKg {
    actual.max(volumetric_weight(dims))
}

/// Aggregate chargeable weight for a multi-package shipment.
///
/// Sums per-package chargeable weights — each parcel is weighed
/// independently before aggregation.
pub fn aggregate_chargeable_weight(weights: impl IntoIterator<Item = WeightKg>) -> WeightKg {
    weights
        .into_iter()
        .fold(WeightKg::zero(), |acc, w| acc.plus(w))
}
