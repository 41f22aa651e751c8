//! # Ratecard Subcommand
//!
//! Rate card files are YAML documents describing the shipping zones,
//! effective-dated rates, and storage pricing policies for one warehouse.
//! Validation pushes the file through the same publishing rules the live
//! engines enforce, so a card that validates here also loads cleanly over
//! the API.
//!
//! ## Commands
//!
//! - `crossdock ratecard validate <file>` — Load and check a rate card.

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Args, Subcommand};
use crossdock_billing::{NewStoragePricing, PricingSchedule};
use crossdock_core::{
    CountryCode, Currency, EffectivePeriod, ServiceLevel, WarehouseId, WeightKg, ZoneId,
};
use crossdock_rates::{NewShippingRate, NewZone, RateBook, ZoneDirectory};
use rust_decimal::Decimal;
use serde::Deserialize;

/// Arguments for the `crossdock ratecard` subcommand.
#[derive(Args, Debug)]
pub struct RatecardArgs {
    #[command(subcommand)]
    pub command: RatecardCommand,
}

/// Ratecard subcommands.
#[derive(Subcommand, Debug)]
pub enum RatecardCommand {
    /// Load a rate card file and check it against every publishing rule.
    Validate {
        /// Path to the rate card YAML file.
        file: PathBuf,
    },
}

// ---------------------------------------------------------------------------
// File format
// ---------------------------------------------------------------------------

/// On-disk rate card document.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RateCard {
    /// Warehouse this card belongs to. A random id is used when omitted,
    /// which is fine for validation-only runs.
    #[serde(default)]
    pub warehouse_id: Option<WarehouseId>,
    #[serde(default)]
    pub zones: Vec<ZoneSpec>,
    #[serde(default)]
    pub rates: Vec<RateSpec>,
    #[serde(default)]
    pub storage_pricing: Vec<PricingSpec>,
}

/// A shipping zone and the countries it serves.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ZoneSpec {
    pub name: String,
    pub countries: Vec<String>,
    #[serde(default = "default_true")]
    pub active: bool,
}

/// One effective-dated rate row, referencing its zone by name.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RateSpec {
    pub zone: String,
    pub service_level: String,
    pub base_rate: Decimal,
    pub per_kg_rate: Decimal,
    pub min_charge: Decimal,
    #[serde(default)]
    pub max_weight_kg: Option<Decimal>,
    pub currency: String,
    pub effective_from: NaiveDate,
    #[serde(default)]
    pub effective_until: Option<NaiveDate>,
}

/// One storage pricing policy.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PricingSpec {
    /// When true the policy is scoped to the card's warehouse; otherwise
    /// it is the tenant-wide default.
    #[serde(default)]
    pub warehouse_scoped: bool,
    pub free_days: u32,
    pub daily_rate: Decimal,
    pub currency: String,
    pub effective_from: NaiveDate,
    #[serde(default)]
    pub effective_until: Option<NaiveDate>,
}

fn default_true() -> bool {
    true
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// A rate card pushed through the live engines.
#[derive(Debug)]
pub struct LoadedRateCard {
    pub warehouse_id: WarehouseId,
    pub zones: Arc<ZoneDirectory>,
    pub rates: Arc<RateBook>,
    pub pricing: Arc<PricingSchedule>,
    /// Zone ids by card name, for callers that need to cross-reference.
    pub zone_ids: HashMap<String, ZoneId>,
}

/// Parse a rate card file.
pub fn load(path: &Path) -> Result<RateCard> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading rate card {}", path.display()))?;
    serde_yaml::from_str(&text).with_context(|| format!("parsing rate card {}", path.display()))
}

/// Publish every entry in the card through the engines' write boundaries.
///
/// Any rule the live system would reject — duplicate zone names, a country
/// in two zones, overlapping effective periods, negative amounts — fails
/// here with the same error.
pub fn build(card: &RateCard) -> Result<LoadedRateCard> {
    let warehouse_id = card.warehouse_id.unwrap_or_else(WarehouseId::new);

    let zones = Arc::new(ZoneDirectory::new());
    let mut zone_ids = HashMap::new();
    for spec in &card.zones {
        let mut countries = BTreeSet::new();
        for code in &spec.countries {
            countries.insert(
                CountryCode::new(code)
                    .with_context(|| format!("zone {:?}, country {code:?}", spec.name))?,
            );
        }
        let zone = zones
            .create_zone(NewZone {
                name: spec.name.clone(),
                active: spec.active,
                countries,
            })
            .with_context(|| format!("zone {:?}", spec.name))?;
        zone_ids.insert(spec.name.clone(), zone.id);
    }

    let rates = Arc::new(RateBook::new());
    for (idx, spec) in card.rates.iter().enumerate() {
        let Some(&zone_id) = zone_ids.get(&spec.zone) else {
            bail!("rate #{}: unknown zone {:?}", idx + 1, spec.zone);
        };
        let service_level = ServiceLevel::parse(&spec.service_level)
            .with_context(|| format!("rate #{}", idx + 1))?;
        let currency =
            Currency::parse(&spec.currency).with_context(|| format!("rate #{}", idx + 1))?;
        let max_weight_kg = spec
            .max_weight_kg
            .map(WeightKg::new)
            .transpose()
            .with_context(|| format!("rate #{}", idx + 1))?;
        let effective = EffectivePeriod::new(spec.effective_from, spec.effective_until)
            .with_context(|| format!("rate #{}", idx + 1))?;
        rates
            .publish(NewShippingRate {
                warehouse_id,
                zone_id,
                service_level,
                base_rate: spec.base_rate,
                per_kg_rate: spec.per_kg_rate,
                min_charge: spec.min_charge,
                max_weight_kg,
                currency,
                effective,
            })
            .with_context(|| format!("rate #{} ({:?} {})", idx + 1, spec.zone, spec.service_level))?;
    }

    let pricing = Arc::new(build_pricing(&card.storage_pricing, warehouse_id)?);

    Ok(LoadedRateCard {
        warehouse_id,
        zones,
        rates,
        pricing,
        zone_ids,
    })
}

/// Publish pricing specs into a fresh schedule. Shared with `accrue`.
pub(crate) fn build_pricing(
    specs: &[PricingSpec],
    warehouse_id: WarehouseId,
) -> Result<PricingSchedule> {
    let pricing = PricingSchedule::new();
    for (idx, spec) in specs.iter().enumerate() {
        let currency = Currency::parse(&spec.currency)
            .with_context(|| format!("storage pricing #{}", idx + 1))?;
        let effective = EffectivePeriod::new(spec.effective_from, spec.effective_until)
            .with_context(|| format!("storage pricing #{}", idx + 1))?;
        pricing
            .publish(NewStoragePricing {
                warehouse_id: spec.warehouse_scoped.then_some(warehouse_id),
                free_days: spec.free_days,
                daily_rate: spec.daily_rate,
                currency,
                effective,
            })
            .with_context(|| format!("storage pricing #{}", idx + 1))?;
    }
    Ok(pricing)
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

/// Execute the ratecard subcommand.
pub fn run_ratecard(args: &RatecardArgs) -> Result<u8> {
    match &args.command {
        RatecardCommand::Validate { file } => cmd_validate(file),
    }
}

fn cmd_validate(file: &Path) -> Result<u8> {
    let card = load(file)?;
    match build(&card) {
        Ok(_) => {
            println!(
                "{}: OK ({} zones, {} rates, {} storage policies)",
                file.display(),
                card.zones.len(),
                card.rates.len(),
                card.storage_pricing.len()
            );
            Ok(0)
        }
        Err(e) => {
            eprintln!("{}: INVALID — {e:#}", file.display());
            Ok(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample_card() -> RateCard {
        serde_yaml::from_str(
            r#"
zones:
  - name: North America
    countries: [US, CA]
  - name: Gulf
    countries: [AE]
rates:
  - zone: North America
    service_level: standard
    base_rate: "10"
    per_kg_rate: "2"
    min_charge: "15"
    currency: USD
    effective_from: 2026-01-01
storage_pricing:
  - free_days: 7
    daily_rate: "0.50"
    currency: USD
    effective_from: 2026-01-01
"#,
        )
        .unwrap()
    }

    #[test]
    fn valid_card_builds() {
        let card = sample_card();
        let loaded = build(&card).unwrap();
        assert_eq!(loaded.zone_ids.len(), 2);
        assert_eq!(loaded.rates.list().len(), 1);
        assert_eq!(loaded.pricing.list().len(), 1);
    }

    #[test]
    fn rate_referencing_unknown_zone_fails() {
        let mut card = sample_card();
        card.rates[0].zone = "Atlantis".to_string();
        let err = build(&card).unwrap_err();
        assert!(err.to_string().contains("unknown zone"));
    }

    #[test]
    fn country_in_two_zones_fails() {
        let mut card = sample_card();
        card.zones[1].countries.push("US".to_string());
        assert!(build(&card).is_err());
    }

    #[test]
    fn overlapping_rate_periods_fail() {
        let mut card = sample_card();
        card.rates.push(RateSpec {
            zone: "North America".to_string(),
            service_level: "standard".to_string(),
            base_rate: dec!(12),
            per_kg_rate: dec!(2),
            min_charge: dec!(15),
            max_weight_kg: None,
            currency: "USD".to_string(),
            effective_from: NaiveDate::from_ymd_opt(2026, 6, 1).unwrap(),
            effective_until: None,
        });
        assert!(build(&card).is_err());
    }

    #[test]
    fn negative_rate_fails() {
        let mut card = sample_card();
        card.rates[0].base_rate = dec!(-1);
        assert!(build(&card).is_err());
    }

    #[test]
    fn unknown_top_level_key_is_rejected() {
        let err = serde_yaml::from_str::<RateCard>("surcharges: []\n").unwrap_err();
        assert!(err.to_string().contains("surcharges"));
    }
}
