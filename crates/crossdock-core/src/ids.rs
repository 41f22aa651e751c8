//! # Identifier Newtypes
//!
//! UUID-backed identifier newtypes for every entity in the billing engine.
//! Each identifier is a distinct type — you cannot pass a [`PackageId`]
//! where a [`BinId`] is expected, and the compiler enforces it.
//!
//! All identifiers are always valid by construction (random v4 UUIDs).

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A unique identifier for a package received at a warehouse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PackageId(Uuid);

impl PackageId {
    /// Create a new random package identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a package identifier from an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for PackageId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PackageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A unique identifier for a bin location within a warehouse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BinId(Uuid);

impl BinId {
    /// Create a new random bin identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a bin identifier from an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for BinId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for BinId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A unique identifier for a partner warehouse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WarehouseId(Uuid);

impl WarehouseId {
    /// Create a new random warehouse identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a warehouse identifier from an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for WarehouseId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for WarehouseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A unique identifier for a shipping zone (a named group of countries).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ZoneId(Uuid);

impl ZoneId {
    /// Create a new random zone identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a zone identifier from an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ZoneId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ZoneId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A unique identifier for a shipping rate row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RateId(Uuid);

impl RateId {
    /// Create a new random rate identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a rate identifier from an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RateId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A unique identifier for a storage pricing policy row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PricingId(Uuid);

impl PricingId {
    /// Create a new random pricing identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a pricing identifier from an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for PricingId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PricingId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A unique identifier for an immutable storage charge ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChargeId(Uuid);

impl ChargeId {
    /// Create a new random charge identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a charge identifier from an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ChargeId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ChargeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A unique identifier for a package-to-bin assignment event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AssignmentId(Uuid);

impl AssignmentId {
    /// Create a new random assignment identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create an assignment identifier from an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for AssignmentId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for AssignmentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn package_id_unique() {
        assert_ne!(PackageId::new(), PackageId::new());
    }

    #[test]
    fn bin_id_from_uuid_roundtrip() {
        let uuid = Uuid::new_v4();
        let id = BinId::from_uuid(uuid);
        assert_eq!(*id.as_uuid(), uuid);
    }

    #[test]
    fn ids_display_as_plain_uuid() {
        let uuid = Uuid::new_v4();
        assert_eq!(WarehouseId::from_uuid(uuid).to_string(), uuid.to_string());
        assert_eq!(ZoneId::from_uuid(uuid).to_string(), uuid.to_string());
    }

    #[test]
    fn ids_serialize_as_uuid_string() {
        let uuid = Uuid::new_v4();
        let id = ChargeId::from_uuid(uuid);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{uuid}\""));
    }
}
