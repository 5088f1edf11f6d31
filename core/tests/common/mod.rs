#![allow(dead_code)]

use idle_core::{config::GameConfig, session::GameSession, unit::ProductionUnit};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Fresh session on the test tables, started at real time 0.
pub fn session(id: &str) -> GameSession {
    init_logging();
    GameSession::with_session_id(id.to_string(), &GameConfig::default_test(), 0.0)
        .expect("build test session")
}

/// Fresh session with `balance` in the bank.
pub fn funded_session(id: &str, balance: f64) -> GameSession {
    let mut session = session(id);
    session.ledger.set_balance(balance, 0.0);
    session
}

/// Standalone unit built from the test table entry `unit_id`.
pub fn unit(unit_id: &str) -> ProductionUnit {
    let config = GameConfig::default_test();
    let unit_config = config.unit(unit_id).expect("unit in test config").clone();
    ProductionUnit::new(unit_config, 0.0)
}

pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0)
}
