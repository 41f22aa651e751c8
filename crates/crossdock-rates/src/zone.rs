//! # Zone Directory
//!
//! Named groupings of destination countries. The directory maintains a
//! country → zone index alongside the zone records and enforces the
//! country-uniqueness invariant at write time: a country may belong to at
//! most one *active* zone. Because every mutation goes through the same
//! write lock and the same index check, read-time ambiguity (two active
//! zones claiming one country) cannot arise.
//!
//! Membership changes take effect immediately; there is no historical
//! versioning of zone membership.

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use crossdock_core::{CountryCode, ZoneId};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by zone directory operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ZoneError {
    /// No active zone contains the requested country.
    #[error("no active zone contains country {0}")]
    ZoneNotFound(CountryCode),

    /// The zone record does not exist.
    #[error("zone {0} not found")]
    UnknownZone(ZoneId),

    /// Adding the country would put it in two active zones at once.
    #[error("country {country} already belongs to active zone \"{zone_name}\"")]
    CountryAlreadyZoned {
        /// The country that was being added.
        country: CountryCode,
        /// The active zone that already claims it.
        zone_name: String,
    },

    /// Zone names are unique within the directory.
    #[error("zone name \"{0}\" already exists")]
    DuplicateZoneName(String),

    /// A zone must carry a non-empty name.
    #[error("zone name must not be empty")]
    EmptyZoneName,
}

/// A named grouping of destination countries sharing a rate table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Zone {
    pub id: ZoneId,
    pub name: String,
    pub active: bool,
    pub countries: BTreeSet<CountryCode>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a zone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewZone {
    pub name: String,
    #[serde(default = "default_active")]
    pub active: bool,
    pub countries: BTreeSet<CountryCode>,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Default)]
struct DirectoryInner {
    zones: HashMap<ZoneId, Zone>,
    /// Index over the countries of *active* zones only.
    country_index: HashMap<CountryCode, ZoneId>,
}

/// Thread-safe zone directory.
///
/// All mutations run under a single write lock so the country index and
/// the zone records can never drift apart. `parking_lot::RwLock` is
/// non-poisonable — a panicking writer does not permanently corrupt the
/// directory.
#[derive(Debug, Default)]
pub struct ZoneDirectory {
    inner: RwLock<DirectoryInner>,
}

impl ZoneDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a zone, enforcing name uniqueness and country uniqueness.
    ///
    /// # Errors
    ///
    /// - [`ZoneError::EmptyZoneName`] for a blank name.
    /// - [`ZoneError::DuplicateZoneName`] if the name is taken.
    /// - [`ZoneError::CountryAlreadyZoned`] if the zone is active and any
    ///   of its countries already belongs to another active zone.
    pub fn create_zone(&self, new: NewZone) -> Result<Zone, ZoneError> {
        let name = new.name.trim().to_string();
        if name.is_empty() {
            return Err(ZoneError::EmptyZoneName);
        }

        let mut inner = self.inner.write();
        if inner.zones.values().any(|z| z.name == name) {
            return Err(ZoneError::DuplicateZoneName(name));
        }
        if new.active {
            for country in &new.countries {
                if let Some(existing) = inner.country_index.get(country) {
                    let zone_name = inner
                        .zones
                        .get(existing)
                        .map(|z| z.name.clone())
                        .unwrap_or_default();
                    return Err(ZoneError::CountryAlreadyZoned {
                        country: country.clone(),
                        zone_name,
                    });
                }
            }
        }

        let now = Utc::now();
        let zone = Zone {
            id: ZoneId::new(),
            name,
            active: new.active,
            countries: new.countries,
            created_at: now,
            updated_at: now,
        };
        if zone.active {
            for country in &zone.countries {
                inner.country_index.insert(country.clone(), zone.id);
            }
        }
        inner.zones.insert(zone.id, zone.clone());
        tracing::debug!(zone = %zone.name, countries = zone.countries.len(), "zone created");
        Ok(zone)
    }

    /// Resolve the active zone containing a destination country.
    ///
    /// Deterministic and side-effect free. The country-uniqueness invariant
    /// makes the answer unique by construction.
    ///
    /// # Errors
    ///
    /// Returns [`ZoneError::ZoneNotFound`] when no active zone contains the
    /// country.
    pub fn resolve(&self, country: &CountryCode) -> Result<Zone, ZoneError> {
        let inner = self.inner.read();
        let zone_id = inner
            .country_index
            .get(country)
            .ok_or_else(|| ZoneError::ZoneNotFound(country.clone()))?;
        inner
            .zones
            .get(zone_id)
            .cloned()
            .ok_or_else(|| ZoneError::ZoneNotFound(country.clone()))
    }

    /// Add a country to an existing zone.
    ///
    /// # Errors
    ///
    /// - [`ZoneError::UnknownZone`] if the zone does not exist.
    /// - [`ZoneError::CountryAlreadyZoned`] if the zone is active and the
    ///   country already belongs to a different active zone.
    pub fn add_country(&self, zone_id: ZoneId, country: CountryCode) -> Result<Zone, ZoneError> {
        let mut inner = self.inner.write();
        let is_active = inner
            .zones
            .get(&zone_id)
            .ok_or(ZoneError::UnknownZone(zone_id))?
            .active;

        if is_active {
            if let Some(existing) = inner.country_index.get(&country) {
                if *existing != zone_id {
                    let zone_name = inner
                        .zones
                        .get(existing)
                        .map(|z| z.name.clone())
                        .unwrap_or_default();
                    return Err(ZoneError::CountryAlreadyZoned { country, zone_name });
                }
            }
            inner.country_index.insert(country.clone(), zone_id);
        }
        let zone = inner
            .zones
            .get_mut(&zone_id)
            .expect("checked above under the same write lock");
        zone.countries.insert(country);
        zone.updated_at = Utc::now();
        Ok(zone.clone())
    }

    /// Remove a country from a zone. Removing an absent country is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`ZoneError::UnknownZone`] if the zone does not exist.
    pub fn remove_country(&self, zone_id: ZoneId, country: &CountryCode) -> Result<Zone, ZoneError> {
        let mut inner = self.inner.write();
        let zone = inner
            .zones
            .get_mut(&zone_id)
            .ok_or(ZoneError::UnknownZone(zone_id))?;
        if zone.countries.remove(country) {
            zone.updated_at = Utc::now();
        }
        let zone = zone.clone();
        if inner.country_index.get(country) == Some(&zone_id) {
            inner.country_index.remove(country);
        }
        Ok(zone)
    }

    /// Activate or deactivate a zone, re-indexing its countries.
    ///
    /// # Errors
    ///
    /// - [`ZoneError::UnknownZone`] if the zone does not exist.
    /// - [`ZoneError::CountryAlreadyZoned`] if activation would claim a
    ///   country that meanwhile joined another active zone.
    pub fn set_active(&self, zone_id: ZoneId, active: bool) -> Result<Zone, ZoneError> {
        let mut inner = self.inner.write();
        let zone = inner
            .zones
            .get(&zone_id)
            .ok_or(ZoneError::UnknownZone(zone_id))?
            .clone();

        if active && !zone.active {
            for country in &zone.countries {
                if let Some(existing) = inner.country_index.get(country) {
                    if *existing != zone_id {
                        let zone_name = inner
                            .zones
                            .get(existing)
                            .map(|z| z.name.clone())
                            .unwrap_or_default();
                        return Err(ZoneError::CountryAlreadyZoned {
                            country: country.clone(),
                            zone_name,
                        });
                    }
                }
            }
            for country in &zone.countries {
                inner.country_index.insert(country.clone(), zone_id);
            }
        } else if !active && zone.active {
            for country in &zone.countries {
                if inner.country_index.get(country) == Some(&zone_id) {
                    inner.country_index.remove(country);
                }
            }
        }

        let zone = inner
            .zones
            .get_mut(&zone_id)
            .expect("checked above under the same write lock");
        zone.active = active;
        zone.updated_at = Utc::now();
        Ok(zone.clone())
    }

    /// Get a zone by ID.
    pub fn get(&self, zone_id: &ZoneId) -> Option<Zone> {
        self.inner.read().zones.get(zone_id).cloned()
    }

    /// List all zones (active and inactive).
    pub fn list(&self) -> Vec<Zone> {
        let mut zones: Vec<Zone> = self.inner.read().zones.values().cloned().collect();
        zones.sort_by(|a, b| a.name.cmp(&b.name));
        zones
    }
}
