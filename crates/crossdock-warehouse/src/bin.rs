//! # Bin Locations
//!
//! A bin is a physical storage slot group inside a warehouse. It carries a
//! hard capacity in package slots, an optional aggregate actual-weight
//! ceiling, and an optional daily premium that storage billing adds on top
//! of the base daily rate while a package occupies the bin.

use chrono::{DateTime, Utc};
use crossdock_core::{BinId, WarehouseId, WeightKg};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A bin location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BinLocation {
    pub id: BinId,
    pub warehouse_id: WarehouseId,
    /// Human-readable location code, unique within the warehouse
    /// (e.g. `"A-03-2"`).
    pub code: String,
    /// Maximum number of packages held at once.
    pub capacity: u32,
    /// Aggregate actual-weight ceiling across current occupants — a
    /// physical shelf limit, so volumetric weight plays no part.
    /// `None` means unconstrained.
    pub max_weight_kg: Option<WeightKg>,
    /// Extra per-day storage fee while a package sits in this bin, in the
    /// storage pricing currency. Zero for ordinary shelving.
    pub daily_premium: Decimal,
    /// Inactive bins keep their history but accept no new assignments.
    pub active: bool,
    /// Derived counter: number of open assignments. Maintained in
    /// lockstep with the assignment history, never written directly.
    pub occupancy: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BinLocation {
    /// Free package slots remaining.
    pub fn free_slots(&self) -> u32 {
        self.capacity.saturating_sub(self.occupancy)
    }
}

/// Payload for creating a bin location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBin {
    pub warehouse_id: WarehouseId,
    pub code: String,
    pub capacity: u32,
    #[serde(default)]
    pub max_weight_kg: Option<WeightKg>,
    #[serde(default)]
    pub daily_premium: Decimal,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}
