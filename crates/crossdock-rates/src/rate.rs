//! # Shipping Rate Book
//!
//! Effective-dated shipping rate rows keyed by
//! (warehouse, zone, service level). The non-overlap invariant is enforced
//! with an explicit range-exclusion check at write time: publishing a rate
//! whose effective period overlaps an existing row for the same key is
//! rejected. The read path still scans for multi-matches and reports
//! [`RateError::AmbiguousRates`] — a violated invariant is fatal data
//! corruption, never something to resolve by picking "most recent".

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use crossdock_core::{
    Currency, EffectivePeriod, RateId, ServiceLevel, ValidationError, WarehouseId, WeightKg,
    ZoneId,
};
use parking_lot::RwLock;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by rate book operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RateError {
    /// No rate row for the requested service level covers the reference date.
    #[error(
        "no {service} rate for warehouse {warehouse} zone {zone} effective on {as_of}"
    )]
    RateNotFound {
        warehouse: WarehouseId,
        zone: ZoneId,
        service: ServiceLevel,
        as_of: NaiveDate,
    },

    /// The zone resolved, but the warehouse carries no rate row for it at
    /// any service level.
    #[error("warehouse {warehouse} has no rates for zone {zone}")]
    NoRatesForZone {
        warehouse: WarehouseId,
        zone: ZoneId,
    },

    /// The chargeable weight exceeds the matched rate's weight ceiling.
    ///
    /// The caller decides whether to retry with a different service level.
    #[error(
        "chargeable weight {weight} exceeds the {max_weight} limit of rate {rate}"
    )]
    WeightExceedsRateLimit {
        rate: RateId,
        max_weight: WeightKg,
        weight: WeightKg,
    },

    /// Publishing would create overlapping effective periods for one key.
    #[error("effective period overlaps existing rate {existing}")]
    OverlappingPeriod { existing: RateId },

    /// Two rows for one key cover the reference date. The write boundary
    /// makes this impossible; detecting it at read time means the data
    /// store was corrupted out-of-band.
    #[error(
        "data integrity violation: {count} rates for warehouse {warehouse} zone {zone} \
         {service} cover {as_of}"
    )]
    AmbiguousRates {
        warehouse: WarehouseId,
        zone: ZoneId,
        service: ServiceLevel,
        as_of: NaiveDate,
        count: usize,
    },

    /// A monetary field on the new rate failed validation.
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

/// An effective-dated shipping rate row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShippingRate {
    pub id: RateId,
    pub warehouse_id: WarehouseId,
    pub zone_id: ZoneId,
    pub service_level: ServiceLevel,
    /// Flat component of the cost.
    pub base_rate: Decimal,
    /// Per-kilogram component, applied to chargeable weight.
    pub per_kg_rate: Decimal,
    /// Floor for the computed cost.
    pub min_charge: Decimal,
    /// Optional ceiling on chargeable weight for this rate.
    pub max_weight_kg: Option<WeightKg>,
    pub currency: Currency,
    pub effective: EffectivePeriod,
    pub created_at: DateTime<Utc>,
}

/// Input for publishing a rate row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewShippingRate {
    pub warehouse_id: WarehouseId,
    pub zone_id: ZoneId,
    pub service_level: ServiceLevel,
    pub base_rate: Decimal,
    pub per_kg_rate: Decimal,
    pub min_charge: Decimal,
    #[serde(default)]
    pub max_weight_kg: Option<WeightKg>,
    pub currency: Currency,
    pub effective: EffectivePeriod,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct RateKey {
    warehouse: WarehouseId,
    zone: ZoneId,
    service: ServiceLevel,
}

/// Thread-safe shipping rate book.
///
/// Rows are grouped by key; the write lock spans the overlap scan and the
/// insert so concurrent publishes cannot slip an overlapping pair past the
/// check.
#[derive(Debug, Default)]
pub struct RateBook {
    inner: RwLock<HashMap<RateKey, Vec<ShippingRate>>>,
}

impl RateBook {
    /// Create an empty rate book.
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a rate row, enforcing non-negative amounts and the
    /// non-overlap invariant for its (warehouse, zone, service) key.
    ///
    /// # Errors
    ///
    /// - [`RateError::Invalid`] for negative monetary fields.
    /// - [`RateError::OverlappingPeriod`] naming the conflicting row.
    pub fn publish(&self, new: NewShippingRate) -> Result<ShippingRate, RateError> {
        for (field, value) in [
            ("base_rate", new.base_rate),
            ("per_kg_rate", new.per_kg_rate),
            ("min_charge", new.min_charge),
        ] {
            if value.is_sign_negative() && !value.is_zero() {
                return Err(ValidationError::NegativeRate { field, value }.into());
            }
        }

        let key = RateKey {
            warehouse: new.warehouse_id,
            zone: new.zone_id,
            service: new.service_level,
        };

        let mut inner = self.inner.write();
        let rows = inner.entry(key).or_default();
        if let Some(existing) = rows.iter().find(|r| r.effective.overlaps(&new.effective)) {
            return Err(RateError::OverlappingPeriod {
                existing: existing.id,
            });
        }

        let rate = ShippingRate {
            id: RateId::new(),
            warehouse_id: new.warehouse_id,
            zone_id: new.zone_id,
            service_level: new.service_level,
            base_rate: new.base_rate,
            per_kg_rate: new.per_kg_rate,
            min_charge: new.min_charge,
            max_weight_kg: new.max_weight_kg,
            currency: new.currency,
            effective: new.effective,
            created_at: Utc::now(),
        };
        rows.push(rate.clone());
        tracing::debug!(
            rate = %rate.id,
            warehouse = %rate.warehouse_id,
            zone = %rate.zone_id,
            service = %rate.service_level,
            "rate published"
        );
        Ok(rate)
    }

    /// Select the single rate row for a key whose effective period contains
    /// the reference date.
    ///
    /// # Errors
    ///
    /// - [`RateError::RateNotFound`] when the service level has no covering
    ///   row but the warehouse does rate the zone.
    /// - [`RateError::NoRatesForZone`] when the warehouse has no rows for
    ///   the zone at any service level.
    /// - [`RateError::AmbiguousRates`] when more than one row covers the
    ///   date (fatal data-integrity violation).
    pub fn rate_as_of(
        &self,
        warehouse: WarehouseId,
        zone: ZoneId,
        service: ServiceLevel,
        as_of: NaiveDate,
    ) -> Result<ShippingRate, RateError> {
        let inner = self.inner.read();
        let key = RateKey {
            warehouse,
            zone,
            service,
        };
        let matches: Vec<&ShippingRate> = inner
            .get(&key)
            .map(|rows| rows.iter().filter(|r| r.effective.contains(as_of)).collect())
            .unwrap_or_default();

        match matches.len() {
            1 => Ok(matches[0].clone()),
            0 => {
                let zone_has_rates = ServiceLevel::ALL.iter().any(|s| {
                    inner
                        .get(&RateKey {
                            warehouse,
                            zone,
                            service: *s,
                        })
                        .map(|rows| !rows.is_empty())
                        .unwrap_or(false)
                });
                if zone_has_rates {
                    Err(RateError::RateNotFound {
                        warehouse,
                        zone,
                        service,
                        as_of,
                    })
                } else {
                    Err(RateError::NoRatesForZone { warehouse, zone })
                }
            }
            count => {
                tracing::error!(
                    warehouse = %warehouse,
                    zone = %zone,
                    service = %service,
                    %as_of,
                    count,
                    "overlapping rate rows detected at read time"
                );
                Err(RateError::AmbiguousRates {
                    warehouse,
                    zone,
                    service,
                    as_of,
                    count,
                })
            }
        }
    }

    /// Get a rate row by ID.
    pub fn get(&self, rate_id: &RateId) -> Option<ShippingRate> {
        self.inner
            .read()
            .values()
            .flatten()
            .find(|r| r.id == *rate_id)
            .cloned()
    }

    /// List every published rate row.
    pub fn list(&self) -> Vec<ShippingRate> {
        let mut rates: Vec<ShippingRate> =
            self.inner.read().values().flatten().cloned().collect();
        rates.sort_by_key(|r| (r.warehouse_id, r.zone_id, r.effective.effective_from));
        rates
    }
}
