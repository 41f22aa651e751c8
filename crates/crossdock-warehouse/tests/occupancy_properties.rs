//! Property tests for the occupancy invariant: after any interleaving of
//! assignments, moves, removals, and terminal transitions, every bin's
//! stored occupancy counter equals the number of open rows in the
//! assignment history.

use crossdock_core::{PackageStatus, WarehouseId, WeightKg};
use crossdock_warehouse::{NewBin, NewPackage, WarehouseLedger};
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

#[derive(Debug, Clone)]
enum Op {
    Assign { package: usize, bin: usize },
    Remove { package: usize },
    Ship { package: usize },
}

fn op_strategy(packages: usize, bins: usize) -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..packages, 0..bins).prop_map(|(package, bin)| Op::Assign { package, bin }),
        (0..packages).prop_map(|package| Op::Remove { package }),
        (0..packages).prop_map(|package| Op::Ship { package }),
    ]
}

proptest! {
    #[test]
    fn occupancy_matches_open_history(
        ops in proptest::collection::vec(op_strategy(6, 3), 1..60)
    ) {
        let ledger = WarehouseLedger::new();
        let warehouse = WarehouseId::new();

        let bins: Vec<_> = (0..3)
            .map(|i| {
                ledger
                    .create_bin(NewBin {
                        warehouse_id: warehouse,
                        code: format!("B-{i:02}"),
                        capacity: 4,
                        max_weight_kg: Some(WeightKg::new(dec!(20)).unwrap()),
                        daily_premium: Decimal::ZERO,
                        active: true,
                    })
                    .unwrap()
            })
            .collect();
        let packages: Vec<_> = (0..6)
            .map(|i| {
                ledger
                    .register_package(NewPackage {
                        warehouse_id: warehouse,
                        tracking_number: format!("TRK-{i}"),
                        description: None,
                        actual_weight: WeightKg::new(dec!(2)).unwrap(),
                        dimensions: None,
                        received_at: None,
                    })
                    .unwrap()
            })
            .collect();

        for op in ops {
            // Constraint rejections are expected mid-sequence; the
            // invariant must hold regardless of which ops succeed.
            match op {
                Op::Assign { package, bin } => {
                    let _ = ledger.assign(packages[package].id, bins[bin].id);
                }
                Op::Remove { package } => {
                    let _ = ledger.remove(packages[package].id);
                }
                Op::Ship { package } => {
                    let _ = ledger.set_status(packages[package].id, PackageStatus::Shipped);
                }
            }
        }

        prop_assert!(ledger.verify_occupancy().is_empty());

        let open_total: u32 = packages
            .iter()
            .filter(|p| {
                ledger
                    .current_assignment(p.id)
                    .unwrap()
                    .is_some()
            })
            .count() as u32;
        let occupancy_total: u32 = bins
            .iter()
            .map(|b| ledger.get_bin(b.id).unwrap().occupancy)
            .sum();
        prop_assert_eq!(open_total, occupancy_total);
    }
}
