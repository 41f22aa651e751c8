//! # Storage Charge Ledger
//!
//! Append-only record of emitted storage charges. Two rules make the
//! accrual engine idempotent across retries and restarts:
//!
//! - at most one row per `(package, charge_from)` — a duplicate append is
//!   rejected, not silently merged;
//! - the per-package high-water mark (the latest `charge_to`) marks the
//!   first day not yet charged, and accrual never emits below it.
//!
//! Rows are immutable once appended except for the one-way `is_invoiced`
//! flag.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use crossdock_core::{BinId, ChargeId, Currency, Money, PackageId, PricingId};
use parking_lot::RwLock;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by the charge ledger.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChargeError {
    /// A row already covers this package and start day.
    #[error("package {package} already has a charge starting {charge_from}")]
    DuplicatePeriod {
        package: PackageId,
        charge_from: NaiveDate,
    },

    /// Referenced charge does not exist.
    #[error("unknown charge: {0}")]
    UnknownCharge(ChargeId),
}

/// One emitted storage charge covering `[charge_from, charge_to)`.
///
/// A row with a zero total is meaningful: it records free-day allowance
/// consumption and advances the high-water mark.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageCharge {
    pub id: ChargeId,
    pub package_id: PackageId,
    /// Bin occupied during the period.
    pub bin_id: BinId,
    /// Pricing policy that governed the period.
    pub pricing_id: PricingId,
    /// Inclusive first day covered.
    pub charge_from: NaiveDate,
    /// Exclusive first day not covered.
    pub charge_to: NaiveDate,
    /// Days actually billed in the period.
    pub days_charged: u32,
    /// Days absorbed by the free-day allowance in the period.
    pub free_days_applied: u32,
    /// Daily rate in force, before the bin premium.
    pub daily_rate: Decimal,
    /// `daily_rate × days_charged`, rounded to minor units.
    pub base_storage_fee: Decimal,
    /// `bin daily premium × days_charged`, rounded to minor units.
    pub bin_location_fee: Decimal,
    /// `base_storage_fee + bin_location_fee`.
    pub total_storage_fee: Decimal,
    pub currency: Currency,
    /// One-way flag: set when the charge lands on an invoice.
    pub is_invoiced: bool,
    pub created_at: DateTime<Utc>,
}

impl StorageCharge {
    /// The total as a [`Money`] value.
    pub fn total_money(&self) -> Money {
        Money::new(self.total_storage_fee, self.currency)
    }

    /// Calendar days covered by the row, billed or free.
    pub fn days_covered(&self) -> u32 {
        self.days_charged + self.free_days_applied
    }
}

#[derive(Debug, Default)]
struct LedgerInner {
    by_package: HashMap<PackageId, Vec<StorageCharge>>,
}

/// The append-only charge ledger.
#[derive(Debug, Default)]
pub struct ChargeLedger {
    inner: RwLock<LedgerInner>,
}

impl ChargeLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a charge row.
    ///
    /// # Errors
    ///
    /// Returns [`ChargeError::DuplicatePeriod`] when a row for the same
    /// package and start day already exists. Callers racing an accrual
    /// pass treat this as "already done".
    pub fn append(&self, charge: StorageCharge) -> Result<StorageCharge, ChargeError> {
        let mut inner = self.inner.write();
        let rows = inner.by_package.entry(charge.package_id).or_default();
        if rows.iter().any(|c| c.charge_from == charge.charge_from) {
            return Err(ChargeError::DuplicatePeriod {
                package: charge.package_id,
                charge_from: charge.charge_from,
            });
        }
        rows.push(charge.clone());
        rows.sort_by_key(|c| c.charge_from);
        tracing::debug!(
            charge = %charge.id,
            package = %charge.package_id,
            period = %format!("[{}, {})", charge.charge_from, charge.charge_to),
            total = %charge.total_storage_fee,
            "storage charge appended"
        );
        Ok(charge)
    }

    /// The first day not yet covered for a package, or `None` when no
    /// charge exists.
    pub fn high_water_mark(&self, package: PackageId) -> Option<NaiveDate> {
        self.inner
            .read()
            .by_package
            .get(&package)
            .and_then(|rows| rows.iter().map(|c| c.charge_to).max())
    }

    /// All charges for a package, ordered by period start.
    pub fn charges_for(&self, package: PackageId) -> Vec<StorageCharge> {
        self.inner
            .read()
            .by_package
            .get(&package)
            .cloned()
            .unwrap_or_default()
    }

    /// Sum of a package's totals per currency.
    pub fn totals_for(&self, package: PackageId) -> HashMap<Currency, Decimal> {
        let inner = self.inner.read();
        let mut totals: HashMap<Currency, Decimal> = HashMap::new();
        for charge in inner.by_package.get(&package).into_iter().flatten() {
            *totals.entry(charge.currency).or_default() += charge.total_storage_fee;
        }
        totals
    }

    /// Mark a charge invoiced. Idempotent; the flag never clears.
    pub fn mark_invoiced(&self, id: ChargeId) -> Result<StorageCharge, ChargeError> {
        let mut inner = self.inner.write();
        for rows in inner.by_package.values_mut() {
            if let Some(charge) = rows.iter_mut().find(|c| c.id == id) {
                charge.is_invoiced = true;
                return Ok(charge.clone());
            }
        }
        Err(ChargeError::UnknownCharge(id))
    }

    /// Every charge in the ledger, ordered by package then period start.
    pub fn list_all(&self) -> Vec<StorageCharge> {
        let inner = self.inner.read();
        let mut all: Vec<StorageCharge> = inner
            .by_package
            .values()
            .flat_map(|rows| rows.iter().cloned())
            .collect();
        all.sort_by_key(|c| (c.package_id, c.charge_from));
        all
    }
}
