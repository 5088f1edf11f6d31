//! Purchase tests: units, managers, declines, and speed tier unlocks.

mod common;

use common::{approx_eq, funded_session, session};
use idle_core::{
    error::SimError,
    event::SimEvent,
    registry::Purchase,
    unit::BuyMode,
};

#[test]
fn buying_units_withdraws_exact_cost() {
    let mut session = funded_session("buy-units-test", 1_000.0);

    let purchase = session.buy_units("corner_shop", 3).unwrap();

    assert!(purchase.is_completed());
    assert!(approx_eq(purchase.cost(), 331.0));
    assert!(approx_eq(session.balance(), 669.0));
    assert_eq!(session.units.get("corner_shop").unwrap().owned, 3);
}

/// Declines leave the ledger and the unit untouched.
#[test]
fn unaffordable_purchase_is_declined_silently() {
    let mut session = session("decline-test");
    let balance = session.balance();

    let purchase = session.buy_units("car_wash", 1).unwrap();

    assert_eq!(purchase, Purchase::Declined { cost: 1_400.0 });
    assert_eq!(session.balance(), balance);
    assert_eq!(session.units.get("car_wash").unwrap().owned, 0);
    assert!(session
        .drain_events()
        .iter()
        .any(|e| matches!(e, SimEvent::PurchaseDeclined { item, .. } if item == "car_wash")));
}

#[test]
fn zero_amount_is_rejected() {
    let mut session = funded_session("zero-amount-test", 1_000.0);
    let result = session.buy_units("corner_shop", 0);
    assert!(matches!(result, Err(SimError::InvalidArgument(_))));
    assert_eq!(session.balance(), 1_000.0);
}

#[test]
fn unknown_ids_are_rejected() {
    let mut session = funded_session("unknown-id-test", 1_000.0);
    assert!(matches!(
        session.buy_units("lemonade", 1),
        Err(SimError::UnknownEntity { kind: "unit", .. })
    ));
    assert!(matches!(
        session.buy_manager("lemonade"),
        Err(SimError::UnknownEntity { kind: "unit", .. })
    ));
    assert!(matches!(
        session.buy_upgrade("golden_spoon"),
        Err(SimError::UnknownEntity { kind: "upgrade", .. })
    ));
}

/// The first unit resets `last_tick`, so nothing accrues for time spent at zero.
#[test]
fn first_purchase_starts_from_now() {
    let mut session = funded_session("first-buy-test", 20_000.0);
    session.update(50.0).unwrap();

    session.buy_units("corner_shop", 1).unwrap();
    session.buy_manager("corner_shop").unwrap();
    let report = session.update(52.0).unwrap();

    assert_eq!(session.units.get("corner_shop").unwrap().last_tick, 50.0);
    assert_eq!(report.gained, 0.0);
}

#[test]
fn crossing_threshold_unlocks_tier_and_notifies() {
    let mut session = funded_session("tier-test", 1_000_000.0);

    let purchase = session.buy_units("corner_shop", 10).unwrap();

    assert!(purchase.is_completed());
    let shop = session.units.get("corner_shop").unwrap();
    assert_eq!(shop.speed_tier(), 1);
    assert_eq!(shop.cycle_duration(), 1.5);

    let messages: Vec<_> = session.notifications.active().map(|n| n.content.clone()).collect();
    assert_eq!(
        messages,
        vec!["Corner Shop upgraded to speed tier 1! A cycle now takes 1.50s.".to_string()]
    );

    let events = session.drain_events();
    assert!(events.iter().any(|e| matches!(
        e,
        SimEvent::SpeedTierUnlocked { tier: 1, cycle_duration, .. } if *cycle_duration == 1.5
    )));
}

#[test]
fn purchase_below_threshold_does_not_notify() {
    let mut session = funded_session("no-tier-test", 1_000_000.0);
    session.buy_units("corner_shop", 9).unwrap();
    assert!(session.notifications.is_empty());
    assert_eq!(session.units.get("corner_shop").unwrap().speed_tier(), 0);
}

#[test]
fn manager_starts_idle_unit_and_is_bought_once() {
    let mut session = funded_session("manager-test", 40_000.0);
    session.buy_units("corner_shop", 1).unwrap();

    let first = session.buy_manager("corner_shop").unwrap();
    let second = session.buy_manager("corner_shop").unwrap();

    assert_eq!(first, Purchase::Completed { cost: 15_000.0 });
    assert_eq!(second, Purchase::Declined { cost: 15_000.0 });
    let shop = session.units.get("corner_shop").unwrap();
    assert!(shop.has_manager);
    assert!(shop.running);
    assert!(approx_eq(session.balance(), 40_000.0 - 100.0 - 15_000.0));
}

#[test]
fn buy_mode_resolves_amount() {
    let mut session = funded_session("buy-mode-test", 1_000.0);

    session.set_buy_mode(BuyMode::Max);
    let purchase = session.buy_units_with_mode("ice_cream").unwrap();

    assert!(purchase.is_completed());
    let owned = session.units.get("ice_cream").unwrap().owned;
    assert!(owned > 10, "1000 buys well past ten ice cream stands, got {owned}");
    assert!(session.units.get("ice_cream").unwrap().cost_of(1) > session.balance());
}

#[test]
fn max_mode_with_nothing_affordable_declines() {
    let mut session = session("max-decline-test");
    session.set_buy_mode(BuyMode::Max);
    let purchase = session.buy_units_with_mode("corner_shop").unwrap();
    assert_eq!(purchase, Purchase::Declined { cost: 100.0 });
}

/// An absurd bulk request is declined as soon as the running total passes
/// the balance; it never sums the whole range.
#[test]
fn huge_bulk_request_is_declined_promptly() {
    let mut session = funded_session("huge-bulk-test", 10.0);

    let purchase = session.buy_units("corner_shop", u64::MAX).unwrap();

    assert_eq!(purchase, Purchase::Declined { cost: 100.0 });
    assert_eq!(session.balance(), 10.0);
    assert_eq!(session.units.get("corner_shop").unwrap().owned, 0);
}

#[test]
fn huge_bulk_request_with_deep_pockets_is_declined() {
    let mut session = funded_session("huge-bulk-rich-test", 1e12);

    let purchase = session.buy_units("ice_cream", u64::MAX).unwrap();

    assert!(!purchase.is_completed());
    assert!(purchase.cost() > 1e12);
    assert_eq!(session.balance(), 1e12);
    assert_eq!(session.units.get("ice_cream").unwrap().owned, 0);
}
