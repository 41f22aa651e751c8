//! # Rate Quotes
//!
//! The pure shipping-cost computation:
//! `cost = max(base + per_kg × chargeable_weight, min_charge)`, rounded to
//! the rate currency's minor units with round-half-up.
//!
//! [`RateQuoter`] composes the zone directory and the rate book but holds
//! no state of its own — two calls with identical arguments and no
//! intervening rate-table writes return identical quotes, so results are
//! safely retryable and cacheable for a given reference date.

use std::sync::Arc;

use chrono::NaiveDate;
use crossdock_core::money::round_half_up;
use crossdock_core::{
    CountryCode, Currency, Money, RateId, ServiceLevel, WarehouseId, WeightKg, ZoneId,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::rate::{RateBook, RateError};
use crate::zone::{ZoneDirectory, ZoneError};

/// Errors raised while quoting.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QuoteError {
    /// Zone resolution failed.
    #[error(transparent)]
    Zone(#[from] ZoneError),

    /// Rate selection or validation failed.
    #[error(transparent)]
    Rate(#[from] RateError),
}

/// A quote request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteRequest {
    pub warehouse_id: WarehouseId,
    pub destination: CountryCode,
    pub service_level: ServiceLevel,
    pub chargeable_weight: WeightKg,
    pub as_of: NaiveDate,
}

/// A computed shipping quote.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateQuote {
    pub rate_id: RateId,
    pub zone_id: ZoneId,
    pub zone_name: String,
    pub service_level: ServiceLevel,
    pub currency: Currency,
    /// Flat component from the rate row.
    pub base_rate: Decimal,
    /// Per-kilogram component from the rate row.
    pub per_kg_rate: Decimal,
    /// `per_kg_rate × chargeable_weight`, rounded to minor units.
    pub weight_charge: Decimal,
    /// `max(base + per_kg × weight, min_charge)`, rounded to minor units.
    pub total: Decimal,
    pub chargeable_weight: WeightKg,
    pub as_of: NaiveDate,
}

impl RateQuote {
    /// The total as a [`Money`] value.
    pub fn total_money(&self) -> Money {
        Money::new(self.total, self.currency)
    }
}

/// The rate resolver: zone lookup + rate selection + cost computation.
///
/// Pure read-and-compute over the injected directory and book; no side
/// effects, no locking beyond their read locks.
#[derive(Debug, Clone)]
pub struct RateQuoter {
    zones: Arc<ZoneDirectory>,
    rates: Arc<RateBook>,
}

impl RateQuoter {
    /// Create a quoter over a zone directory and rate book.
    pub fn new(zones: Arc<ZoneDirectory>, rates: Arc<RateBook>) -> Self {
        Self { zones, rates }
    }

    /// Compute a shipping quote.
    ///
    /// # Errors
    ///
    /// - [`ZoneError::ZoneNotFound`] when no active zone contains the
    ///   destination country (independent of warehouse or weight).
    /// - [`RateError::RateNotFound`] / [`RateError::NoRatesForZone`] when
    ///   the warehouse does not rate the resolved zone.
    /// - [`RateError::WeightExceedsRateLimit`] when the matched rate
    ///   carries a ceiling below the chargeable weight; the caller decides
    ///   whether to retry with another service level.
    pub fn quote(&self, req: &QuoteRequest) -> Result<RateQuote, QuoteError> {
        let zone = self.zones.resolve(&req.destination)?;
        let rate = self.rates.rate_as_of(
            req.warehouse_id,
            zone.id,
            req.service_level,
            req.as_of,
        )?;

        if let Some(max_weight) = rate.max_weight_kg {
            if req.chargeable_weight > max_weight {
                return Err(RateError::WeightExceedsRateLimit {
                    rate: rate.id,
                    max_weight,
                    weight: req.chargeable_weight,
                }
                .into());
            }
        }

        let minor = rate.currency.minor_units();
        let weight_charge = rate.per_kg_rate * req.chargeable_weight.as_decimal();
        let cost = (rate.base_rate + weight_charge).max(rate.min_charge);

        Ok(RateQuote {
            rate_id: rate.id,
            zone_id: zone.id,
            zone_name: zone.name,
            service_level: rate.service_level,
            currency: rate.currency,
            base_rate: rate.base_rate,
            per_kg_rate: rate.per_kg_rate,
            weight_charge: round_half_up(weight_charge, minor),
            total: round_half_up(cost, minor),
            chargeable_weight: req.chargeable_weight,
            as_of: req.as_of,
        })
    }
}
