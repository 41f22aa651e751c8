//! # crossdock-warehouse — Packages, Bins & Assignments
//!
//! The physical side of the billing engine:
//!
//! - [`package`] — intake records with actual weight, optional dimensions,
//!   and the lifecycle status that gates storage billing.
//! - [`bin`] — bin locations with a hard slot capacity, an optional
//!   aggregate weight ceiling, and an optional daily storage premium.
//! - [`ledger`] — the [`ledger::WarehouseLedger`]: a single-lock manager
//!   over packages, bins, and the append-only assignment history.
//!   Occupancy is a derived counter kept in lockstep with that history and
//!   auditable against it via [`ledger::WarehouseLedger::verify_occupancy`].

pub mod bin;
pub mod ledger;
pub mod package;

pub use bin::{BinLocation, NewBin};
pub use ledger::{
    AssignmentRecord, OccupancyDrift, PackageStorageView, WarehouseError, WarehouseLedger,
};
pub use package::{NewPackage, Package};
