//! # Package Records
//!
//! A package is the unit of intake, storage, and billing. Its chargeable
//! weight is derived, never stored: the greater of actual and volumetric
//! weight at the moment it is asked for, so a corrected dimension
//! measurement is reflected everywhere immediately.

use chrono::{DateTime, Utc};
use crossdock_core::weight::chargeable_weight;
use crossdock_core::{PackageDimensions, PackageId, PackageStatus, WarehouseId, WeightKg};
use serde::{Deserialize, Serialize};

/// A package held at a warehouse.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Package {
    pub id: PackageId,
    pub warehouse_id: WarehouseId,
    /// Inbound carrier tracking number, as scanned at intake.
    pub tracking_number: String,
    pub description: Option<String>,
    pub status: PackageStatus,
    pub actual_weight: WeightKg,
    /// Absent when the package was not measured at intake.
    pub dimensions: Option<PackageDimensions>,
    /// When the package was logged at the warehouse. Storage billing and
    /// the free-day allowance both anchor here.
    pub received_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Package {
    /// Billable weight: `max(actual, volumetric)`.
    pub fn chargeable_weight(&self) -> WeightKg {
        chargeable_weight(self.actual_weight, self.dimensions.as_ref())
    }
}

/// Payload for registering a package at intake.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPackage {
    pub warehouse_id: WarehouseId,
    pub tracking_number: String,
    #[serde(default)]
    pub description: Option<String>,
    pub actual_weight: WeightKg,
    #[serde(default)]
    pub dimensions: Option<PackageDimensions>,
    /// Backfill hook for migrated records; defaults to the intake time.
    #[serde(default)]
    pub received_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample_package(actual: WeightKg, dims: Option<PackageDimensions>) -> Package {
        let now = Utc::now();
        Package {
            id: PackageId::new(),
            warehouse_id: WarehouseId::new(),
            tracking_number: "1Z999AA10123456784".to_string(),
            description: None,
            status: PackageStatus::Received,
            actual_weight: actual,
            dimensions: dims,
            received_at: now,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn chargeable_weight_prefers_volumetric_for_bulky_packages() {
        let dims = PackageDimensions::new(dec!(40), dec!(30), dec!(20)).unwrap();
        let pkg = sample_package(WeightKg::new(dec!(2)).unwrap(), Some(dims));
        assert_eq!(pkg.chargeable_weight().as_decimal(), dec!(4.8));
    }

    #[test]
    fn chargeable_weight_is_actual_without_dimensions() {
        let pkg = sample_package(WeightKg::new(dec!(3.25)).unwrap(), None);
        assert_eq!(pkg.chargeable_weight(), pkg.actual_weight);
    }
}
