//! # crossdock-billing — Storage Fee Accrual
//!
//! Turns warehouse dwell time into charge rows:
//!
//! - [`pricing`] — effective-dated storage pricing policies (free-day
//!   allowance + daily rate), with warehouse-specific rows overriding the
//!   tenant-wide default day by day.
//! - [`charge`] — the append-only storage charge ledger with per-package
//!   high-water marks and one-way invoicing.
//! - [`accrual`] — the [`accrual::AccrualEngine`]: segments each package's
//!   assignment history into charge periods, applies the cumulative
//!   free-day allowance, and emits rows idempotently — re-running a pass
//!   for the same date never double-charges.

pub mod accrual;
pub mod charge;
pub mod pricing;

pub use accrual::{AccrualEngine, AccrualError, AccrualSummary};
pub use charge::{ChargeError, ChargeLedger, StorageCharge};
pub use pricing::{NewStoragePricing, PricingError, PricingSchedule, StoragePricing};
