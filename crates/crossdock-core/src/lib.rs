//! # crossdock-core — Foundational Types
//!
//! Leaf crate of the Crossdock billing engine. Provides the domain
//! primitives shared by every other crate:
//!
//! - [`ids`] — UUID-backed identifier newtypes (one distinct type per entity)
//! - [`country`] — validated ISO 3166-1 alpha-2 country codes
//! - [`money`] — currency codes, minor-unit precision, and exact decimal
//!   money arithmetic (floats are never used for amounts)
//! - [`weight`] — actual/volumetric/chargeable weight computation
//! - [`temporal`] — half-open effective periods and day-range algebra
//! - [`domain`] — service levels and the package lifecycle
//! - [`error`] — the shared validation/money error hierarchy
//!
//! All validation happens at construction time: a value of one of these
//! types is valid by definition.

pub mod country;
pub mod domain;
pub mod error;
pub mod ids;
pub mod money;
pub mod temporal;
pub mod weight;

pub use country::CountryCode;
pub use domain::{PackageStatus, ServiceLevel};
pub use error::{MoneyError, ValidationError};
pub use ids::{
    AssignmentId, BinId, ChargeId, PackageId, PricingId, RateId, WarehouseId, ZoneId,
};
pub use money::{Currency, Money};
pub use temporal::{DayRange, EffectivePeriod};
pub use weight::{PackageDimensions, WeightKg, VOLUMETRIC_DIVISOR};
