//! # Storage Fee Accrual
//!
//! Walks a package's assignment history and turns uncharged storage days
//! into ledger rows. Days are counted half-open on calendar dates: a
//! package assigned on day D and removed on day E is stored for `E − D`
//! days, and a same-day assign/remove accrues nothing.
//!
//! Idempotence comes from the charge ledger, not from the caller: accrual
//! starts at the package's high-water mark, and the `(package, start day)`
//! uniqueness check catches concurrent passes racing each other. Running
//! the same pass twice, or restarting mid-pass, never double-charges.
//!
//! The free-day allowance is cumulative per package: it is spent against
//! total storage days across all assignments, so moving a package between
//! bins never refreshes it.

use std::sync::Arc;

use chrono::NaiveDate;
use crossdock_core::money::round_half_up;
use crossdock_core::{BinId, ChargeId, DayRange, PackageId};
use crossdock_warehouse::{WarehouseError, WarehouseLedger};
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use crate::charge::{ChargeError, ChargeLedger, StorageCharge};
use crate::pricing::{PricingError, PricingSchedule};

/// Errors raised during accrual.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccrualError {
    /// Warehouse lookup failed.
    #[error(transparent)]
    Warehouse(#[from] WarehouseError),

    /// The package exists but has never been placed in a bin, so there
    /// is nothing to accrue against.
    #[error("package {0} has never been assigned to a bin")]
    NotInStorage(PackageId),

    /// Pricing coverage failed.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// Ledger append failed.
    #[error(transparent)]
    Charge(#[from] ChargeError),
}

/// Outcome of a batch accrual pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AccrualSummary {
    /// Packages examined.
    pub packages_processed: usize,
    /// Packages whose accrual failed; their error is logged, the pass
    /// continues.
    pub packages_failed: usize,
    /// Charge rows emitted across the pass.
    pub charges_emitted: usize,
}

/// The storage fee accrual engine.
#[derive(Clone)]
pub struct AccrualEngine {
    warehouse: Arc<WarehouseLedger>,
    pricing: Arc<PricingSchedule>,
    charges: Arc<ChargeLedger>,
}

impl AccrualEngine {
    pub fn new(
        warehouse: Arc<WarehouseLedger>,
        pricing: Arc<PricingSchedule>,
        charges: Arc<ChargeLedger>,
    ) -> Self {
        Self {
            warehouse,
            pricing,
            charges,
        }
    }

    /// Accrue storage charges for one package up to (but not including)
    /// `through`.
    ///
    /// Returns the rows emitted by this call; an empty vec means the
    /// package was already fully charged. Terminal packages accrue too —
    /// their billing window simply ends at removal — only the batch pass
    /// filters them out.
    ///
    /// # Errors
    ///
    /// Fails when the package is unknown, has no assignment history, or a
    /// storage day has no pricing coverage. A pricing gap aborts the package without emitting partial
    /// rows past the gap.
    pub fn accrue_package(
        &self,
        package_id: PackageId,
        through: NaiveDate,
    ) -> Result<Vec<StorageCharge>, AccrualError> {
        let view = self.warehouse.billing_view(package_id)?;
        if view.assignments.is_empty() {
            return Err(AccrualError::NotInStorage(package_id));
        }

        // Billable intervals on calendar dates, one per assignment row.
        let mut intervals: Vec<(DayRange, BinId)> = Vec::new();
        for record in &view.assignments {
            let start = record.assigned_at.date_naive();
            let end = record
                .removed_at
                .map(|t| t.date_naive())
                .unwrap_or(through)
                .min(through);
            // Empty means same-day churn or a not-yet-started window.
            if let Ok(range) = DayRange::new(start, end) {
                intervals.push((range, record.bin_id));
            }
        }
        intervals.sort_by_key(|(range, _)| range.start());

        let high_water = self.charges.high_water_mark(package_id);
        // Storage days consumed so far, charged or free. The free-day
        // allowance is spent against this counter.
        let mut days_so_far: u32 = 0;
        let mut emitted = Vec::new();

        for (range, bin_id) in intervals {
            // Days below the high-water mark are already on the ledger;
            // they still advance the allowance counter.
            let (already_covered, chargeable) = match high_water {
                Some(mark) if range.end() <= mark => (range.days(), None),
                Some(mark) if range.start() < mark => {
                    let covered = DayRange::new(range.start(), mark)
                        .map(|r| r.days())
                        .unwrap_or(0);
                    (covered, DayRange::new(mark, range.end()).ok())
                }
                _ => (0, Some(range)),
            };
            days_so_far += already_covered;
            let Some(chargeable) = chargeable else {
                continue;
            };

            let premium = view
                .bin_premiums
                .get(&bin_id)
                .copied()
                .unwrap_or(Decimal::ZERO);

            for (segment, policy) in self
                .pricing
                .policies_covering(view.package.warehouse_id, chargeable)?
            {
                let elapsed = segment.days();
                let remaining_free = policy.free_days.saturating_sub(days_so_far);
                let free_applied = remaining_free.min(elapsed);
                let billable = elapsed - free_applied;

                let minor = policy.currency.minor_units();
                let base = round_half_up(policy.daily_rate * Decimal::from(billable), minor);
                let bin_fee = round_half_up(premium * Decimal::from(billable), minor);

                let charge = StorageCharge {
                    id: ChargeId::new(),
                    package_id,
                    bin_id,
                    pricing_id: policy.id,
                    charge_from: segment.start(),
                    charge_to: segment.end(),
                    days_charged: billable,
                    free_days_applied: free_applied,
                    daily_rate: policy.daily_rate,
                    base_storage_fee: base,
                    bin_location_fee: bin_fee,
                    total_storage_fee: base + bin_fee,
                    currency: policy.currency,
                    is_invoiced: false,
                    created_at: chrono::Utc::now(),
                };
                match self.charges.append(charge) {
                    Ok(row) => emitted.push(row),
                    // A concurrent pass got here first; its row stands.
                    Err(ChargeError::DuplicatePeriod { .. }) => {
                        tracing::warn!(
                            package = %package_id,
                            from = %segment.start(),
                            "charge period already present, skipping"
                        );
                    }
                    Err(err) => return Err(err.into()),
                }
                days_so_far += elapsed;
            }
        }

        if !emitted.is_empty() {
            tracing::info!(
                package = %package_id,
                rows = emitted.len(),
                through = %through,
                "storage charges accrued"
            );
        }
        Ok(emitted)
    }

    /// Run accrual for every billable package up to `through`.
    ///
    /// Terminal and never-assigned packages are skipped. Per-package
    /// failures are logged and counted without aborting the pass.
    pub fn run_accrual_pass(&self, through: NaiveDate) -> AccrualSummary {
        let mut summary = AccrualSummary::default();
        for package_id in self.warehouse.billable_package_ids() {
            summary.packages_processed += 1;
            match self.accrue_package(package_id, through) {
                Ok(rows) => summary.charges_emitted += rows.len(),
                Err(err) => {
                    summary.packages_failed += 1;
                    tracing::error!(package = %package_id, error = %err, "accrual failed for package");
                }
            }
        }
        tracing::info!(
            processed = summary.packages_processed,
            failed = summary.packages_failed,
            emitted = summary.charges_emitted,
            through = %through,
            "accrual pass complete"
        );
        summary
    }

    /// The charge ledger this engine writes to.
    pub fn charges(&self) -> &Arc<ChargeLedger> {
        &self.charges
    }
}
