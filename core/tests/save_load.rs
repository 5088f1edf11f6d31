//! Save and load tests: snapshot fidelity, rebuilt multipliers, and
//! offline catch-up on the first update after a load.

mod common;

use common::{approx_eq, funded_session, init_logging};
use idle_core::{
    config::GameConfig,
    event::SimEvent,
    save::{GameSave, UnitSave, UpgradeSave},
    session::GameSession,
};

fn played_session() -> GameSession {
    let mut session = funded_session("save-source", 1_000_000.0);
    session.buy_units("ice_cream", 12).unwrap();
    session.buy_units("corner_shop", 3).unwrap();
    session.buy_manager("corner_shop").unwrap();
    session.buy_upgrade("ice_cream_boost_1").unwrap();
    session.buy_upgrade("all_boost_1").unwrap();
    session.update(7.0).unwrap();
    session
}

#[test]
fn save_survives_json_and_restores_state() {
    let source = played_session();
    let json = source.generate_save().to_json().unwrap();
    let save = GameSave::from_json(&json).unwrap();

    let loaded = GameSession::from_save("save-target".into(), &GameConfig::default_test(), &save).unwrap();

    assert_eq!(loaded.now(), source.now());
    assert!(approx_eq(loaded.balance(), source.balance()));
    assert_eq!(loaded.generate_save().factories, source.generate_save().factories);
    assert_eq!(loaded.generate_save().upgrades, source.generate_save().upgrades);
    for (a, b) in loaded.units.units().iter().zip(source.units.units()) {
        assert_eq!(a.owned, b.owned, "{}", a.id());
        assert_eq!(a.speed_tier(), b.speed_tier(), "{}", a.id());
        assert_eq!(a.cycle_duration(), b.cycle_duration(), "{}", a.id());
        assert_eq!(a.revenue_multiplier(), b.revenue_multiplier(), "{}", a.id());
    }
    assert_eq!(loaded.units.get("ice_cream").unwrap().revenue_multiplier(), 9.0);
}

#[test]
fn save_json_uses_stable_field_names() {
    let value = serde_json::to_value(played_session().generate_save()).unwrap();

    assert!(value["time"]["time"].is_number());
    assert!(value["time"]["lastUpdate"].is_number());
    assert!(value["money"]["money"].is_number());
    assert!(value["money"]["time"].is_number());
    let shop = &value["factories"][1];
    assert_eq!(shop["owned"], 3);
    assert_eq!(shop["hasManager"], true);
    assert!(shop["lastTick"].is_number());
    assert!(shop["running"].is_boolean());
    assert_eq!(value["upgrades"][0]["owned"], true);
    assert_eq!(value["upgrades"][1]["owned"], false);
}

/// Reloading the same save into a live session does not re-apply multipliers.
#[test]
fn reloading_does_not_double_apply_upgrades() {
    let mut session = played_session();
    let save = session.generate_save();

    session.load_save(&save).unwrap();
    session.load_save(&save).unwrap();

    assert_eq!(session.units.get("ice_cream").unwrap().revenue_multiplier(), 9.0);
    assert_eq!(session.units.get("corner_shop").unwrap().revenue_multiplier(), 3.0);
}

/// Managed shop (1 owned, 3s cycle, 20 per cycle) saved at t=0 and
/// resumed 30 real seconds later: the first update pays 10 cycles.
#[test]
fn first_update_after_load_catches_up_offline_gap() {
    let mut source = funded_session("offline-source", 20_000.0);
    source.buy_units("corner_shop", 1).unwrap();
    source.buy_manager("corner_shop").unwrap();
    let save = source.generate_save();
    let balance = source.balance();

    let mut loaded = GameSession::from_save("offline-target".into(), &GameConfig::default_test(), &save).unwrap();
    let report = loaded.update(30.0).unwrap();

    assert_eq!(report.cycles, vec![("corner_shop".to_string(), 10)]);
    assert_eq!(report.gained, 200.0);
    assert_eq!(loaded.balance(), balance + 200.0);
    assert_eq!(loaded.units.get("corner_shop").unwrap().last_tick, 30.0);
}

#[test]
fn loading_never_replays_production() {
    let mut source = funded_session("no-replay-source", 20_000.0);
    source.buy_units("corner_shop", 1).unwrap();
    source.buy_manager("corner_shop").unwrap();
    let save = source.generate_save();

    let mut loaded = GameSession::from_save("no-replay-target".into(), &GameConfig::default_test(), &save).unwrap();

    assert_eq!(loaded.balance(), save.money.money);
    let events = loaded.drain_events();
    assert_eq!(events.len(), 1);
    assert!(matches!(events[0], SimEvent::SessionLoaded { .. }));
}

/// A save written before units were added to the config restores what it has.
#[test]
fn short_save_arrays_restore_positionally() {
    init_logging();
    let save = GameSave {
        time: idle_core::save::TimeSave { time: 100.0, last_update: 100.0 },
        money: idle_core::save::MoneySave { time: 100.0, money: 42.0 },
        factories: vec![UnitSave {
            owned:       25,
            last_tick:   99.0,
            has_manager: true,
            running:     true,
        }],
        upgrades: vec![UpgradeSave { owned: true }],
    };

    let loaded = GameSession::from_save("short-save".into(), &GameConfig::default_test(), &save).unwrap();

    let ice_cream = loaded.units.get("ice_cream").unwrap();
    assert_eq!(ice_cream.owned, 25);
    assert_eq!(ice_cream.speed_tier(), 2);
    assert_eq!(ice_cream.revenue_multiplier(), 3.0);
    assert_eq!(loaded.units.get("car_wash").unwrap().owned, 0);
    assert_eq!(loaded.upgrades.available().count(), 3);
    assert_eq!(loaded.balance(), 42.0);
}

/// Loading replaces live state: upgrades owned in the session but not in
/// the save are dropped along with their multipliers.
#[test]
fn loading_older_save_replaces_live_upgrades() {
    let older = funded_session("older-save", 0.0).generate_save();
    let mut session = funded_session("live-session", 1_000_000.0);
    session.buy_units("corner_shop", 5).unwrap();
    session.buy_upgrade("all_boost_1").unwrap();
    assert_eq!(session.units.get("ice_cream").unwrap().revenue_multiplier(), 3.0);

    session.load_save(&older).unwrap();

    assert!(session.upgrades.upgrades().iter().all(|u| !u.owned()));
    for unit in session.units.units() {
        assert_eq!(unit.revenue_multiplier(), 1.0, "{}", unit.id());
        assert_eq!(unit.owned, 0, "{}", unit.id());
    }
    let reloaded = session.generate_save();
    assert_eq!(reloaded.factories, older.factories);
    assert_eq!(reloaded.upgrades, older.upgrades);
    assert_eq!(reloaded.money, older.money);
}

/// Units missing from a short save fall back to fresh state, not to
/// whatever the live session had.
#[test]
fn short_save_resets_units_it_does_not_mention() {
    let mut session = funded_session("short-live", 1_000_000.0);
    session.buy_units("car_wash", 3).unwrap();
    let mut save = session.generate_save();
    save.factories.truncate(1);

    session.load_save(&save).unwrap();

    let wash = session.units.get("car_wash").unwrap();
    assert_eq!(wash.owned, 0);
    assert!(!wash.running);
}

/// A session driven by synthetic time is re-anchored to the wall clock
/// before saving, so the next load catches up from that instant.
#[test]
fn rebased_save_catches_up_from_real_anchor() {
    let mut source = funded_session("rebase-source", 20_000.0);
    source.buy_units("corner_shop", 1).unwrap();
    source.buy_manager("corner_shop").unwrap();
    source.update(600.0).unwrap();

    source.rebase_real_time(50.0);
    let save = source.generate_save();
    assert_eq!(save.time.last_update, 50.0);
    assert_eq!(save.time.time, 600.0);

    let mut loaded = GameSession::from_save("rebase-target".into(), &GameConfig::default_test(), &save).unwrap();
    let report = loaded.update(59.0).unwrap();

    assert_eq!(loaded.now(), 609.0);
    assert_eq!(report.cycles, vec![("corner_shop".to_string(), 3)]);
}
