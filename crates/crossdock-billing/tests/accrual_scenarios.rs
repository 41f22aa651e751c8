//! End-to-end accrual scenarios over the in-memory warehouse, pricing
//! schedule, and charge ledger.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use crossdock_billing::{
    AccrualEngine, ChargeLedger, NewStoragePricing, PricingSchedule, StorageCharge,
};
use crossdock_core::{
    Currency, EffectivePeriod, PackageId, PackageStatus, WarehouseId, WeightKg,
};
use crossdock_warehouse::{NewBin, NewPackage, WarehouseLedger};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn ts(date: NaiveDate) -> DateTime<Utc> {
    date.and_hms_opt(10, 30, 0).unwrap().and_utc()
}

struct Fixture {
    warehouse: Arc<WarehouseLedger>,
    pricing: Arc<PricingSchedule>,
    charges: Arc<ChargeLedger>,
    engine: AccrualEngine,
    warehouse_id: WarehouseId,
}

/// Default pricing: 7 free days, then 2.00 USD per day, from 2026-01-01.
fn fixture() -> Fixture {
    let warehouse = Arc::new(WarehouseLedger::new());
    let pricing = Arc::new(PricingSchedule::new());
    let charges = Arc::new(ChargeLedger::new());
    pricing
        .publish(NewStoragePricing {
            warehouse_id: None,
            free_days: 7,
            daily_rate: dec!(2.00),
            currency: Currency::Usd,
            effective: EffectivePeriod::open_ended(d(2026, 1, 1)),
        })
        .unwrap();
    let engine = AccrualEngine::new(warehouse.clone(), pricing.clone(), charges.clone());
    Fixture {
        warehouse,
        pricing,
        charges,
        engine,
        warehouse_id: WarehouseId::new(),
    }
}

fn add_bin(fx: &Fixture, code: &str, premium: Decimal) -> crossdock_warehouse::BinLocation {
    fx.warehouse
        .create_bin(NewBin {
            warehouse_id: fx.warehouse_id,
            code: code.to_string(),
            capacity: 10,
            max_weight_kg: None,
            daily_premium: premium,
            active: true,
        })
        .unwrap()
}

fn add_package(fx: &Fixture, received: NaiveDate) -> crossdock_warehouse::Package {
    fx.warehouse
        .register_package(NewPackage {
            warehouse_id: fx.warehouse_id,
            tracking_number: format!("TRK-{}", uuid::Uuid::new_v4()),
            description: None,
            actual_weight: WeightKg::new(dec!(2)).unwrap(),
            dimensions: None,
            received_at: Some(ts(received)),
        })
        .unwrap()
}

fn total(rows: &[StorageCharge]) -> Decimal {
    rows.iter().map(|c| c.total_storage_fee).sum()
}

#[test]
fn seven_free_days_then_daily_rate() {
    let fx = fixture();
    let bin = add_bin(&fx, "A-01", Decimal::ZERO);
    let pkg = add_package(&fx, d(2026, 3, 1));
    fx.warehouse
        .assign_with_time(pkg.id, bin.id, ts(d(2026, 3, 1)))
        .unwrap();

    // 10 storage days: 7 free, 3 at 2.00.
    let rows = fx.engine.accrue_package(pkg.id, d(2026, 3, 11)).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].free_days_applied, 7);
    assert_eq!(rows[0].days_charged, 3);
    assert_eq!(rows[0].total_storage_fee, dec!(6.00));
    assert_eq!(rows[0].currency, Currency::Usd);
}

#[test]
fn never_assigned_package_is_not_in_storage() {
    let fx = fixture();
    let pkg = add_package(&fx, d(2026, 3, 1));

    let err = fx.engine.accrue_package(pkg.id, d(2026, 3, 11)).unwrap_err();
    assert!(matches!(
        err,
        crossdock_billing::AccrualError::NotInStorage(id) if id == pkg.id
    ));
}

#[test]
fn rerun_is_idempotent_and_extension_charges_only_new_days() {
    let fx = fixture();
    let bin = add_bin(&fx, "A-01", Decimal::ZERO);
    let pkg = add_package(&fx, d(2026, 3, 1));
    fx.warehouse
        .assign_with_time(pkg.id, bin.id, ts(d(2026, 3, 1)))
        .unwrap();

    let first = fx.engine.accrue_package(pkg.id, d(2026, 3, 11)).unwrap();
    assert_eq!(total(&first), dec!(6.00));

    // Same date again: nothing new.
    let again = fx.engine.accrue_package(pkg.id, d(2026, 3, 11)).unwrap();
    assert!(again.is_empty());

    // Two more days, allowance long spent.
    let extended = fx.engine.accrue_package(pkg.id, d(2026, 3, 13)).unwrap();
    assert_eq!(extended.len(), 1);
    assert_eq!(extended[0].charge_from, d(2026, 3, 11));
    assert_eq!(extended[0].days_charged, 2);
    assert_eq!(extended[0].free_days_applied, 0);
    assert_eq!(total(&extended), dec!(4.00));
}

#[test]
fn split_runs_equal_a_single_run() {
    let fx = fixture();
    let bin = add_bin(&fx, "A-01", Decimal::ZERO);
    let pkg = add_package(&fx, d(2026, 3, 1));
    fx.warehouse
        .assign_with_time(pkg.id, bin.id, ts(d(2026, 3, 1)))
        .unwrap();

    // Daily pass, day by day, up to the same horizon as the single run.
    for offset in 1..=10 {
        fx.engine
            .accrue_package(pkg.id, d(2026, 3, 1) + chrono::Duration::days(offset))
            .unwrap();
    }

    let rows = fx.charges.charges_for(pkg.id);
    assert_eq!(total(&rows), dec!(6.00));
    let free: u32 = rows.iter().map(|c| c.free_days_applied).sum();
    let charged: u32 = rows.iter().map(|c| c.days_charged).sum();
    assert_eq!(free, 7);
    assert_eq!(charged, 3);
}

#[test]
fn free_rows_still_advance_the_high_water_mark() {
    let fx = fixture();
    let bin = add_bin(&fx, "A-01", Decimal::ZERO);
    let pkg = add_package(&fx, d(2026, 3, 1));
    fx.warehouse
        .assign_with_time(pkg.id, bin.id, ts(d(2026, 3, 1)))
        .unwrap();

    let rows = fx.engine.accrue_package(pkg.id, d(2026, 3, 6)).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].free_days_applied, 5);
    assert_eq!(rows[0].total_storage_fee, dec!(0.00));
    assert_eq!(fx.charges.high_water_mark(pkg.id), Some(d(2026, 3, 6)));
}

#[test]
fn same_day_churn_accrues_nothing() {
    let fx = fixture();
    let bin = add_bin(&fx, "A-01", Decimal::ZERO);
    let pkg = add_package(&fx, d(2026, 3, 1));
    fx.warehouse
        .assign_with_time(pkg.id, bin.id, ts(d(2026, 3, 1)))
        .unwrap();
    fx.warehouse
        .remove_with_time(pkg.id, ts(d(2026, 3, 1)))
        .unwrap();

    let rows = fx.engine.accrue_package(pkg.id, d(2026, 3, 10)).unwrap();
    assert!(rows.is_empty());
}

#[test]
fn bin_move_does_not_refresh_the_allowance() {
    let fx = fixture();
    let a = add_bin(&fx, "A-01", Decimal::ZERO);
    let b = add_bin(&fx, "B-01", Decimal::ZERO);
    let pkg = add_package(&fx, d(2026, 3, 1));
    fx.warehouse
        .assign_with_time(pkg.id, a.id, ts(d(2026, 3, 1)))
        .unwrap();
    fx.warehouse
        .assign_with_time(pkg.id, b.id, ts(d(2026, 3, 4)))
        .unwrap();

    // 3 days in A + 7 in B = 10 storage days: still 7 free, 3 billed.
    let rows = fx.engine.accrue_package(pkg.id, d(2026, 3, 11)).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].bin_id, a.id);
    assert_eq!(rows[0].free_days_applied, 3);
    assert_eq!(rows[1].bin_id, b.id);
    assert_eq!(rows[1].free_days_applied, 4);
    assert_eq!(rows[1].days_charged, 3);
    assert_eq!(total(&rows), dec!(6.00));
}

#[test]
fn bin_premium_applies_to_billed_days_only() {
    let fx = fixture();
    let bin = add_bin(&fx, "CLIMATE-01", dec!(0.50));
    let pkg = add_package(&fx, d(2026, 3, 1));
    fx.warehouse
        .assign_with_time(pkg.id, bin.id, ts(d(2026, 3, 1)))
        .unwrap();

    let rows = fx.engine.accrue_package(pkg.id, d(2026, 3, 11)).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].base_storage_fee, dec!(6.00));
    // Premium on the 3 billed days, not the 7 free ones.
    assert_eq!(rows[0].bin_location_fee, dec!(1.50));
    assert_eq!(rows[0].total_storage_fee, dec!(7.50));
}

#[test]
fn pricing_change_splits_the_charge_period() {
    let fx = fixture();
    // Fixture default runs from 2026-01-01; it is open-ended, so scope a
    // fresh schedule for this scenario instead.
    let pricing = Arc::new(PricingSchedule::new());
    pricing
        .publish(NewStoragePricing {
            warehouse_id: None,
            free_days: 0,
            daily_rate: dec!(2.00),
            currency: Currency::Usd,
            effective: EffectivePeriod::bounded(d(2026, 1, 1), d(2026, 3, 6)).unwrap(),
        })
        .unwrap();
    pricing
        .publish(NewStoragePricing {
            warehouse_id: None,
            free_days: 0,
            daily_rate: dec!(3.00),
            currency: Currency::Usd,
            effective: EffectivePeriod::open_ended(d(2026, 3, 6)),
        })
        .unwrap();
    let engine = AccrualEngine::new(fx.warehouse.clone(), pricing, fx.charges.clone());

    let bin = add_bin(&fx, "A-01", Decimal::ZERO);
    let pkg = add_package(&fx, d(2026, 3, 1));
    fx.warehouse
        .assign_with_time(pkg.id, bin.id, ts(d(2026, 3, 1)))
        .unwrap();

    let rows = engine.accrue_package(pkg.id, d(2026, 3, 11)).unwrap();
    assert_eq!(rows.len(), 2);
    // 5 days at 2.00, 5 days at 3.00.
    assert_eq!(rows[0].charge_to, d(2026, 3, 6));
    assert_eq!(rows[0].total_storage_fee, dec!(10.00));
    assert_eq!(rows[1].charge_from, d(2026, 3, 6));
    assert_eq!(rows[1].total_storage_fee, dec!(15.00));
}

#[test]
fn warehouse_specific_pricing_overrides_default() {
    let fx = fixture();
    fx.pricing
        .publish(NewStoragePricing {
            warehouse_id: Some(fx.warehouse_id),
            free_days: 0,
            daily_rate: dec!(5.00),
            currency: Currency::Usd,
            effective: EffectivePeriod::open_ended(d(2026, 1, 1)),
        })
        .unwrap();

    let bin = add_bin(&fx, "A-01", Decimal::ZERO);
    let pkg = add_package(&fx, d(2026, 3, 1));
    fx.warehouse
        .assign_with_time(pkg.id, bin.id, ts(d(2026, 3, 1)))
        .unwrap();

    let rows = fx.engine.accrue_package(pkg.id, d(2026, 3, 3)).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].free_days_applied, 0);
    assert_eq!(rows[0].total_storage_fee, dec!(10.00));
}

#[test]
fn terminal_package_still_accrues_through_removal() {
    let fx = fixture();
    let bin = add_bin(&fx, "A-01", Decimal::ZERO);
    let pkg = add_package(&fx, d(2026, 3, 1));
    fx.warehouse
        .assign_with_time(pkg.id, bin.id, ts(d(2026, 3, 1)))
        .unwrap();
    // Shipping closes the assignment on 2026-03-10.
    fx.warehouse
        .set_status_with_time(pkg.id, PackageStatus::Shipped, ts(d(2026, 3, 10)))
        .unwrap();

    // Direct accrual past the removal date stops at the removal date.
    let rows = fx.engine.accrue_package(pkg.id, d(2026, 3, 20)).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].charge_to, d(2026, 3, 10));
    assert_eq!(rows[0].days_covered(), 9);
    assert_eq!(total(&rows), dec!(4.00));
}

#[test]
fn accrual_pass_skips_terminal_packages_and_is_idempotent() {
    let fx = fixture();
    let bin = add_bin(&fx, "A-01", Decimal::ZERO);
    let active = add_package(&fx, d(2026, 3, 1));
    let shipped = add_package(&fx, d(2026, 3, 1));
    fx.warehouse
        .assign_with_time(active.id, bin.id, ts(d(2026, 3, 1)))
        .unwrap();
    fx.warehouse
        .assign_with_time(shipped.id, bin.id, ts(d(2026, 3, 1)))
        .unwrap();
    fx.warehouse
        .set_status_with_time(shipped.id, PackageStatus::Shipped, ts(d(2026, 3, 2)))
        .unwrap();

    let summary = fx.engine.run_accrual_pass(d(2026, 3, 11));
    assert_eq!(summary.packages_processed, 1);
    assert_eq!(summary.packages_failed, 0);
    assert_eq!(summary.charges_emitted, 1);
    assert!(fx.charges.charges_for(shipped.id).is_empty());

    let rerun = fx.engine.run_accrual_pass(d(2026, 3, 11));
    assert_eq!(rerun.charges_emitted, 0);
}

#[test]
fn pricing_gap_fails_the_package_without_partial_rows() {
    let fx = fixture();
    let pricing = Arc::new(PricingSchedule::new());
    pricing
        .publish(NewStoragePricing {
            warehouse_id: None,
            free_days: 0,
            daily_rate: dec!(2.00),
            currency: Currency::Usd,
            effective: EffectivePeriod::bounded(d(2026, 1, 1), d(2026, 3, 5)).unwrap(),
        })
        .unwrap();
    let engine = AccrualEngine::new(fx.warehouse.clone(), pricing, fx.charges.clone());

    let bin = add_bin(&fx, "A-01", Decimal::ZERO);
    let pkg = add_package(&fx, d(2026, 3, 1));
    fx.warehouse
        .assign_with_time(pkg.id, bin.id, ts(d(2026, 3, 1)))
        .unwrap();

    assert!(engine.accrue_package(pkg.id, d(2026, 3, 10)).is_err());
    assert!(fx.charges.charges_for(pkg.id).is_empty());
}

#[test]
fn charged_days_cover_every_storage_day_exactly_once() {
    let fx = fixture();
    let a = add_bin(&fx, "A-01", Decimal::ZERO);
    let b = add_bin(&fx, "B-01", Decimal::ZERO);
    let pkg = add_package(&fx, d(2026, 3, 1));

    // Two stints with a gap off the shelf in between.
    fx.warehouse
        .assign_with_time(pkg.id, a.id, ts(d(2026, 3, 1)))
        .unwrap();
    fx.warehouse
        .remove_with_time(pkg.id, ts(d(2026, 3, 5)))
        .unwrap();
    fx.warehouse
        .assign_with_time(pkg.id, b.id, ts(d(2026, 3, 9)))
        .unwrap();

    fx.engine.accrue_package(pkg.id, d(2026, 3, 15)).unwrap();
    let rows = fx.charges.charges_for(pkg.id);

    // Storage days: [03-01, 03-05) = 4 and [03-09, 03-15) = 6.
    let covered: u32 = rows.iter().map(StorageCharge::days_covered).sum();
    assert_eq!(covered, 10);

    // No row overlaps another and none spans the off-shelf gap.
    for pair in rows.windows(2) {
        assert!(pair[0].charge_to <= pair[1].charge_from);
    }
    // 7 free days spent across both stints, 3 billed.
    assert_eq!(rows.iter().map(|c| c.free_days_applied).sum::<u32>(), 7);
    assert_eq!(rows.iter().map(|c| c.days_charged).sum::<u32>(), 3);
    assert_eq!(total(&rows), dec!(6.00));
}
