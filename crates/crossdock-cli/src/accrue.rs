//! # Accrue Subcommand
//!
//! Replays a warehouse scenario file — bins, packages, and timestamped
//! movement events — through the storage accrual engine and prints the
//! charge rows it produces. Useful for pricing dry-runs and for
//! reproducing billing questions from support tickets without touching a
//! live deployment.

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use clap::Args;
use crossdock_billing::{AccrualEngine, ChargeLedger};
use crossdock_core::{BinId, PackageId, PackageStatus, WarehouseId, WeightKg};
use crossdock_warehouse::{NewBin, NewPackage, WarehouseLedger};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::ratecard::PricingSpec;

/// Arguments for the `crossdock accrue` subcommand.
#[derive(Args, Debug)]
pub struct AccrueArgs {
    /// Scenario file describing pricing, bins, packages, and events.
    pub scenario: PathBuf,

    /// Exclusive end of the accrual window. Overrides the scenario's
    /// `through` field; defaults to today.
    #[arg(long)]
    pub through: Option<NaiveDate>,
}

// ---------------------------------------------------------------------------
// File format
// ---------------------------------------------------------------------------

/// On-disk scenario document.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Scenario {
    #[serde(default)]
    warehouse_id: Option<WarehouseId>,
    storage_pricing: Vec<PricingSpec>,
    #[serde(default)]
    bins: Vec<BinSpec>,
    #[serde(default)]
    packages: Vec<PackageSpec>,
    /// Applied in file order; timestamps drive day counting.
    #[serde(default)]
    events: Vec<EventSpec>,
    #[serde(default)]
    through: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct BinSpec {
    code: String,
    capacity: u32,
    #[serde(default)]
    max_weight_kg: Option<Decimal>,
    #[serde(default)]
    daily_premium: Decimal,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PackageSpec {
    tracking: String,
    weight_kg: Decimal,
    #[serde(default)]
    received_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct EventSpec {
    at: DateTime<Utc>,
    #[serde(flatten)]
    action: EventAction,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
enum EventAction {
    /// Place a package in a bin (moves it if already binned).
    Assign {
        package: String,
        bin: String,
        #[serde(default)]
        reason: Option<String>,
    },
    /// Take a package out of its current bin.
    Remove {
        package: String,
        #[serde(default)]
        reason: Option<String>,
    },
    /// Change a package's lifecycle status.
    Status {
        package: String,
        status: PackageStatus,
    },
}

// ---------------------------------------------------------------------------
// Command
// ---------------------------------------------------------------------------

/// Execute the accrue subcommand.
pub fn run_accrue(args: &AccrueArgs) -> Result<u8> {
    let text = std::fs::read_to_string(&args.scenario)
        .with_context(|| format!("reading scenario {}", args.scenario.display()))?;
    let scenario: Scenario = serde_yaml::from_str(&text)
        .with_context(|| format!("parsing scenario {}", args.scenario.display()))?;

    let through = args
        .through
        .or(scenario.through)
        .unwrap_or_else(|| Utc::now().date_naive());

    replay(&scenario, through)
}

fn replay(scenario: &Scenario, through: NaiveDate) -> Result<u8> {
    let warehouse_id = scenario.warehouse_id.unwrap_or_else(WarehouseId::new);
    let warehouse = Arc::new(WarehouseLedger::new());
    let pricing = Arc::new(crate::ratecard::build_pricing(
        &scenario.storage_pricing,
        warehouse_id,
    )?);
    let charges = Arc::new(ChargeLedger::new());
    let engine = AccrualEngine::new(warehouse.clone(), pricing, charges.clone());

    let mut bins: HashMap<&str, BinId> = HashMap::new();
    for spec in &scenario.bins {
        let max_weight_kg = spec
            .max_weight_kg
            .map(WeightKg::new)
            .transpose()
            .with_context(|| format!("bin {:?}", spec.code))?;
        let bin = warehouse
            .create_bin(NewBin {
                warehouse_id,
                code: spec.code.clone(),
                capacity: spec.capacity,
                max_weight_kg,
                daily_premium: spec.daily_premium,
                active: true,
            })
            .with_context(|| format!("bin {:?}", spec.code))?;
        bins.insert(&spec.code, bin.id);
    }

    let mut packages: HashMap<&str, PackageId> = HashMap::new();
    for spec in &scenario.packages {
        let actual_weight =
            WeightKg::new(spec.weight_kg).with_context(|| format!("package {:?}", spec.tracking))?;
        let package = warehouse
            .register_package(NewPackage {
                warehouse_id,
                tracking_number: spec.tracking.clone(),
                description: None,
                actual_weight,
                dimensions: None,
                received_at: spec.received_at,
            })
            .with_context(|| format!("package {:?}", spec.tracking))?;
        packages.insert(&spec.tracking, package.id);
    }

    for (idx, event) in scenario.events.iter().enumerate() {
        apply_event(&warehouse, &bins, &packages, event)
            .with_context(|| format!("event #{} at {}", idx + 1, event.at))?;
    }

    let mut failures = 0usize;
    let mut totals: BTreeMap<String, Decimal> = BTreeMap::new();
    println!("accruing through {through} (exclusive)");
    for spec in &scenario.packages {
        let package_id = packages[spec.tracking.as_str()];
        match engine.accrue_package(package_id, through) {
            Ok(rows) => {
                for row in &rows {
                    println!(
                        "  {}  {} → {}  {} billed + {} free  @ {}  total {} {}",
                        spec.tracking,
                        row.charge_from,
                        row.charge_to,
                        row.days_charged,
                        row.free_days_applied,
                        row.daily_rate,
                        row.total_storage_fee,
                        row.currency,
                    );
                    let entry = totals.entry(row.currency.to_string()).or_insert(Decimal::ZERO);
                    *entry += row.total_storage_fee;
                }
                if rows.is_empty() {
                    println!("  {}  no charges", spec.tracking);
                }
            }
            Err(e) => {
                failures += 1;
                eprintln!("  {}  FAILED — {e:#}", spec.tracking);
            }
        }
    }

    for (currency, total) in &totals {
        println!("total {currency}: {total}");
    }

    Ok(if failures > 0 { 1 } else { 0 })
}

fn apply_event(
    warehouse: &WarehouseLedger,
    bins: &HashMap<&str, BinId>,
    packages: &HashMap<&str, PackageId>,
    event: &EventSpec,
) -> Result<()> {
    let lookup_package = |tracking: &str| -> Result<PackageId> {
        packages
            .get(tracking)
            .copied()
            .with_context(|| format!("unknown package {tracking:?}"))
    };
    match &event.action {
        EventAction::Assign {
            package,
            bin,
            reason,
        } => {
            let Some(&bin_id) = bins.get(bin.as_str()) else {
                bail!("unknown bin {bin:?}");
            };
            warehouse.assign_full(lookup_package(package)?, bin_id, event.at, reason.clone())?;
        }
        EventAction::Remove { package, reason } => {
            warehouse.remove_full(lookup_package(package)?, event.at, reason.clone())?;
        }
        EventAction::Status { package, status } => {
            warehouse.set_status_with_time(lookup_package(package)?, *status, event.at)?;
        }
    }
    Ok(())
}
