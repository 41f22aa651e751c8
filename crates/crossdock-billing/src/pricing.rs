//! # Storage Pricing Policies
//!
//! A pricing policy names the free-day allowance and the daily rate that
//! applies once the allowance is spent. Policies are effective-dated and
//! scoped: a row carries either a specific warehouse or no warehouse at
//! all, the latter acting as the tenant-wide default. For any given day a
//! warehouse-specific row wins over the default.
//!
//! Like the rate book, non-overlap within a scope is enforced at publish
//! time, so the covering lookup can treat each day as having at most one
//! policy per scope.

use chrono::NaiveDate;
use crossdock_core::{
    Currency, DayRange, EffectivePeriod, PricingId, ValidationError, WarehouseId,
};
use parking_lot::RwLock;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by the pricing schedule.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PricingError {
    /// No policy (warehouse-specific or default) covers the day.
    #[error("no storage pricing covers {date} for warehouse {warehouse}")]
    NoPricingForDate {
        warehouse: WarehouseId,
        date: NaiveDate,
    },

    /// New policy's period overlaps an existing row in the same scope.
    #[error("effective period overlaps existing pricing {existing}")]
    OverlappingPricing { existing: PricingId },

    /// Referenced pricing row does not exist.
    #[error("unknown pricing: {0}")]
    UnknownPricing(PricingId),

    /// Field-level validation failure.
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

/// An effective-dated storage pricing policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoragePricing {
    pub id: PricingId,
    /// `None` scopes the row as the tenant-wide default.
    pub warehouse_id: Option<WarehouseId>,
    /// Cumulative free storage days granted per package, measured from its
    /// first assignment onward. Not reset by bin moves.
    pub free_days: u32,
    /// Fee per storage day once the allowance is exhausted.
    pub daily_rate: Decimal,
    pub currency: Currency,
    pub effective: EffectivePeriod,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Payload for publishing a pricing policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewStoragePricing {
    #[serde(default)]
    pub warehouse_id: Option<WarehouseId>,
    pub free_days: u32,
    pub daily_rate: Decimal,
    pub currency: Currency,
    pub effective: EffectivePeriod,
}

#[derive(Debug, Default)]
struct ScheduleInner {
    policies: Vec<StoragePricing>,
}

/// The storage pricing schedule.
#[derive(Debug, Default)]
pub struct PricingSchedule {
    inner: RwLock<ScheduleInner>,
}

impl PricingSchedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a pricing policy.
    ///
    /// # Errors
    ///
    /// Rejects a negative daily rate and any effective-period overlap with
    /// an existing row of the same scope. Default-scope and
    /// warehouse-scope rows never conflict with each other.
    pub fn publish(&self, new: NewStoragePricing) -> Result<StoragePricing, PricingError> {
        if new.daily_rate.is_sign_negative() && !new.daily_rate.is_zero() {
            return Err(ValidationError::NegativeRate {
                field: "daily_rate",
                value: new.daily_rate,
            }
            .into());
        }

        let mut inner = self.inner.write();
        if let Some(existing) = inner
            .policies
            .iter()
            .find(|p| p.warehouse_id == new.warehouse_id && p.effective.overlaps(&new.effective))
        {
            return Err(PricingError::OverlappingPricing {
                existing: existing.id,
            });
        }

        let policy = StoragePricing {
            id: PricingId::new(),
            warehouse_id: new.warehouse_id,
            free_days: new.free_days,
            daily_rate: new.daily_rate,
            currency: new.currency,
            effective: new.effective,
            created_at: chrono::Utc::now(),
        };
        inner.policies.push(policy.clone());
        tracing::info!(
            pricing = %policy.id,
            scope = %policy.warehouse_id.map(|w| w.to_string()).unwrap_or_else(|| "default".to_string()),
            free_days = policy.free_days,
            "storage pricing published"
        );
        Ok(policy)
    }

    /// Fetch a policy by id.
    pub fn get(&self, id: PricingId) -> Result<StoragePricing, PricingError> {
        self.inner
            .read()
            .policies
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or(PricingError::UnknownPricing(id))
    }

    /// All policies, default scope first, then by warehouse and start day.
    pub fn list(&self) -> Vec<StoragePricing> {
        let mut policies = self.inner.read().policies.clone();
        policies.sort_by_key(|p| (p.warehouse_id.is_some(), p.warehouse_id, p.effective.effective_from));
        policies
    }

    /// Split a day range into sub-ranges, each paired with the policy
    /// governing it: the warehouse-specific policy when one covers the
    /// day, the default otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::NoPricingForDate`] naming the first
    /// uncovered day. Accrual treats a coverage gap as a configuration
    /// error to surface, never as free storage.
    pub fn policies_covering(
        &self,
        warehouse: WarehouseId,
        range: DayRange,
    ) -> Result<Vec<(DayRange, StoragePricing)>, PricingError> {
        let inner = self.inner.read();
        let specific: Vec<&StoragePricing> = inner
            .policies
            .iter()
            .filter(|p| p.warehouse_id == Some(warehouse))
            .collect();
        let default: Vec<&StoragePricing> = inner
            .policies
            .iter()
            .filter(|p| p.warehouse_id.is_none())
            .collect();

        let mut segments = Vec::new();
        let mut cursor = range.start();
        while cursor < range.end() {
            let (policy, period_end) = if let Some(p) =
                specific.iter().find(|p| p.effective.contains(cursor))
            {
                (*p, p.effective.effective_until)
            } else if let Some(p) = default.iter().find(|p| p.effective.contains(cursor)) {
                // A later-starting specific row takes over mid-segment.
                let next_specific = specific
                    .iter()
                    .map(|s| s.effective.effective_from)
                    .filter(|&from| from > cursor)
                    .min();
                let end = match (p.effective.effective_until, next_specific) {
                    (Some(a), Some(b)) => Some(a.min(b)),
                    (Some(a), None) => Some(a),
                    (None, Some(b)) => Some(b),
                    (None, None) => None,
                };
                (*p, end)
            } else {
                return Err(PricingError::NoPricingForDate {
                    warehouse,
                    date: cursor,
                });
            };

            let end = period_end.map_or(range.end(), |e| e.min(range.end()));
            // `contains(cursor)` guarantees end > cursor.
            let segment = DayRange::new(cursor, end).map_err(PricingError::Invalid)?;
            segments.push((segment, policy.clone()));
            cursor = end;
        }
        Ok(segments)
    }
}
