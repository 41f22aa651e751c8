//! # Domain Enums
//!
//! Single-definition enums for the billing engine's closed vocabularies:
//! the shipping service level and the package lifecycle status. Every
//! consumer matches exhaustively — adding a variant is a compile-time
//! event across the workspace, not a stringly-typed surprise.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Shipping service level offered on a rate row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceLevel {
    /// Slowest, cheapest service.
    Economy,
    /// Default service.
    Standard,
    /// Fastest, most expensive service.
    Express,
}

impl ServiceLevel {
    /// All service levels, in ascending speed order.
    pub const ALL: [ServiceLevel; 3] = [Self::Economy, Self::Standard, Self::Express];

    /// Return the string representation of this service level.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Economy => "economy",
            Self::Standard => "standard",
            Self::Express => "express",
        }
    }

    /// Parse a service level string (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidServiceLevel`] for unknown input.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        match s.trim().to_ascii_lowercase().as_str() {
            "economy" => Ok(Self::Economy),
            "standard" => Ok(Self::Standard),
            "express" => Ok(Self::Express),
            other => Err(ValidationError::InvalidServiceLevel(other.to_string())),
        }
    }
}

impl std::fmt::Display for ServiceLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ServiceLevel {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Package lifecycle status.
///
/// A package enters the engine as `RECEIVED`, moves through processing
/// states while in the warehouse, and terminates in one of the disposal
/// states. Once a terminal state is reached the package stops accruing
/// storage charges; already-emitted charge rows are retained for audit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PackageStatus {
    /// Intake complete, package logged at the warehouse.
    Received,
    /// Staff are consolidating, repacking, or inspecting the package.
    Processing,
    /// Quoted and awaiting dispatch.
    ReadyToShip,
    /// Handed to the outbound courier.
    Shipped,
    /// Confirmed delivered to the customer.
    Delivered,
    /// Disposed of at customer request or per policy.
    Disposed,
    /// Returned to sender.
    Returned,
    /// Lost in the warehouse.
    Missing,
    /// Damaged beyond forwarding.
    Damaged,
}

impl PackageStatus {
    /// Return the string representation of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Received => "RECEIVED",
            Self::Processing => "PROCESSING",
            Self::ReadyToShip => "READY_TO_SHIP",
            Self::Shipped => "SHIPPED",
            Self::Delivered => "DELIVERED",
            Self::Disposed => "DISPOSED",
            Self::Returned => "RETURNED",
            Self::Missing => "MISSING",
            Self::Damaged => "DAMAGED",
        }
    }

    /// Whether this status ends storage billing for the package.
    ///
    /// Terminal packages are skipped by the batch accrual pass; their
    /// existing charge rows remain in the ledger.
    pub fn is_terminal_for_billing(&self) -> bool {
        matches!(
            self,
            Self::Shipped
                | Self::Delivered
                | Self::Disposed
                | Self::Returned
                | Self::Missing
                | Self::Damaged
        )
    }
}

impl std::fmt::Display for PackageStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
