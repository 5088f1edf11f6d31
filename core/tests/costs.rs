//! Cost curve tests: compounding unit cost, exact bulk sums, and the
//! max-buyable probe.

mod common;

use common::{approx_eq, unit};
use idle_core::unit::{bulk_cost, bulk_cost_within, unit_cost};
use proptest::prelude::*;

/// Corner Shop: base cost 100, growth 10%. Units #1..#3 cost 100, 110, 121.
#[test]
fn sequential_costs_compound_on_ownership() {
    let shop = unit("corner_shop");
    assert!(approx_eq(unit_cost(&shop.config, 0), 100.0));
    assert!(approx_eq(unit_cost(&shop.config, 1), 110.0));
    assert!(approx_eq(unit_cost(&shop.config, 2), 121.0));
    assert!(approx_eq(shop.cost_of(3), 331.0));
}

/// With 330 in the bank the probe stops one short of the 331 needed for three.
#[test]
fn max_affordable_stops_before_overspending() {
    let shop = unit("corner_shop");
    assert_eq!(shop.max_affordable(330.0), 2);
    assert_eq!(shop.max_affordable(331.5), 3);
    assert_eq!(shop.max_affordable(99.0), 0);
}

#[test]
fn bulk_cost_starts_from_current_ownership() {
    let mut shop = unit("corner_shop");
    shop.owned = 2;
    assert!(approx_eq(shop.cost_of(1), 121.0));
    assert!(approx_eq(shop.cost_of(2), bulk_cost(&shop.config, 2, 2)));
    assert_eq!(shop.cost_of(0), 0.0);
}

/// An unbounded balance still terminates at the probe cap.
#[test]
fn max_affordable_terminates_on_infinite_balance() {
    let shop = unit("ice_cream");
    let k = shop.max_affordable(f64::INFINITY);
    assert_eq!(k, idle_core::unit::MAX_AFFORDABLE_PROBE);
}

proptest! {
    #[test]
    fn cost_strictly_increases(n in 0u64..2_000) {
        let shop = unit("corner_shop");
        prop_assert!(unit_cost(&shop.config, n + 1) > unit_cost(&shop.config, n));
    }

    #[test]
    fn bulk_cost_is_additive(o in 0u64..200, k1 in 0u64..50, k2 in 0u64..50) {
        let wash = unit("car_wash");
        let whole = bulk_cost(&wash.config, o, k1 + k2);
        let parts = bulk_cost(&wash.config, o, k1) + bulk_cost(&wash.config, o + k1, k2);
        prop_assert!(approx_eq(whole, parts), "whole={whole} parts={parts}");
    }

    #[test]
    fn bounded_bulk_cost_agrees_with_full_sum(o in 0u64..100, k in 0u64..60, limit in 0.0f64..1e7) {
        let shop = unit("corner_shop");
        let full = bulk_cost(&shop.config, o, k);
        match bulk_cost_within(&shop.config, o, k, limit) {
            Ok(cost) => {
                prop_assert_eq!(cost, full);
                prop_assert!(cost <= limit);
            }
            Err(partial) => {
                prop_assert!(partial > limit);
                prop_assert!(partial <= full);
            }
        }
    }

    #[test]
    fn max_affordable_is_exactly_the_boundary(balance in 0.0f64..1_000_000.0) {
        let shop = unit("corner_shop");
        let k = shop.max_affordable(balance);
        prop_assert!(shop.cost_of(k) <= balance);
        prop_assert!(shop.cost_of(k + 1) > balance);
    }
}
