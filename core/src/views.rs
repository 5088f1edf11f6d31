//! Read-only projections for presentation hosts.
//!
//! Pure functions over the current session state, recomputed on every
//! call. Hosts that want per-frame caching do it themselves.

use crate::{
    registry::UnitRegistry,
    session::GameSession,
    types::{GameTime, UnitId, UpgradeId},
    unit::{BuyMode, ProductionUnit, Progress},
    upgrades::UpgradeCatalog,
};
use serde::Serialize;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UnitView {
    pub unit_id:            UnitId,
    pub name:               String,
    pub owned:              u64,
    pub speed_tier:         u32,
    pub cycle_duration:     f64,
    pub has_manager:        bool,
    pub running:            bool,
    /// Units the current buy mode would purchase.
    pub purchase_amount:    u64,
    pub purchase_cost:      f64,
    pub can_afford:         bool,
    pub revenue_per_second: f64,
    pub progress:           Progress,
    pub next_tier_at:       Option<u64>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ManagerOffer {
    pub unit_id:    UnitId,
    pub unit_name:  String,
    pub name:       String,
    pub cost:       f64,
    pub can_afford: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UpgradeOffer {
    pub upgrade_id:  UpgradeId,
    pub name:        String,
    pub cost:        f64,
    pub can_afford:  bool,
    pub description: String,
}

/// Everything a UI needs for one frame.
#[derive(Debug, Clone, Serialize)]
pub struct GameView {
    pub game_time:     GameTime,
    pub balance:       f64,
    pub speed:         f64,
    pub buy_mode:      BuyMode,
    pub units:         Vec<UnitView>,
    pub managers:      Vec<ManagerOffer>,
    pub upgrades:      Vec<UpgradeOffer>,
    pub notifications: Vec<String>,
}

pub fn unit_view(unit: &ProductionUnit, mode: BuyMode, balance: f64, now: GameTime) -> UnitView {
    let purchase_amount = unit.amount_for_mode(mode, balance);
    let purchase_cost = unit.cost_of(purchase_amount);
    UnitView {
        unit_id: unit.config.id.clone(),
        name: unit.config.name.clone(),
        owned: unit.owned,
        speed_tier: unit.speed_tier(),
        cycle_duration: unit.cycle_duration(),
        has_manager: unit.has_manager,
        running: unit.running,
        purchase_amount,
        purchase_cost,
        can_afford: purchase_cost <= balance,
        revenue_per_second: unit.revenue_per_second(),
        progress: unit.progress(now),
        next_tier_at: unit.next_tier_threshold(),
    }
}

/// Managers not yet hired, in config order.
pub fn available_managers(units: &UnitRegistry, balance: f64) -> Vec<ManagerOffer> {
    units
        .units()
        .iter()
        .filter(|u| !u.has_manager)
        .map(|u| ManagerOffer {
            unit_id: u.config.id.clone(),
            unit_name: u.config.name.clone(),
            name: u.config.manager.name.clone(),
            cost: u.config.manager.cost,
            can_afford: balance >= u.config.manager.cost,
        })
        .collect()
}

/// Upgrades not yet owned, with live affordability.
pub fn available_upgrades(catalog: &UpgradeCatalog, units: &UnitRegistry, balance: f64) -> Vec<UpgradeOffer> {
    catalog
        .available()
        .map(|u| UpgradeOffer {
            upgrade_id: u.config.id.clone(),
            name: u.config.name.clone(),
            cost: u.config.cost,
            can_afford: balance >= u.config.cost,
            description: u.description(units),
        })
        .collect()
}

pub fn game_view(session: &GameSession) -> GameView {
    let balance = session.balance();
    let now = session.now();
    GameView {
        game_time: now,
        balance,
        speed: session.clock.speed(),
        buy_mode: session.buy_mode(),
        units: session
            .units
            .units()
            .iter()
            .map(|u| unit_view(u, session.buy_mode(), balance, now))
            .collect(),
        managers: available_managers(&session.units, balance),
        upgrades: available_upgrades(&session.upgrades, &session.units, balance),
        notifications: session
            .notifications
            .active()
            .map(|n| n.content.clone())
            .collect(),
    }
}
