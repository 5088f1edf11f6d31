//! Static balance tables: production units and upgrades.
//!
//! Loaded once at startup and never mutated. Field names follow the
//! JSON files under `data/`.

use crate::{
    error::{SimError, SimResult},
    types::{UnitId, UpgradeId},
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Money a brand new game starts with.
pub const DEFAULT_STARTING_BALANCE: f64 = 10.0;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UnitConfig {
    pub id: UnitId,
    pub name: String,
    pub base_cost: f64,
    /// Compounding cost growth per owned unit, in percent.
    pub cost_increase_percent: f64,
    /// Ascending ownership counts at which a speed tier unlocks.
    pub upgrade_levels: Vec<u64>,
    pub base_money_per_tick: f64,
    /// Base cycle duration in game seconds.
    pub base_time_to_tick: f64,
    pub manager: ManagerConfig,
}

impl UnitConfig {
    /// Fractional growth rate, e.g. 0.10 for 10%.
    pub fn growth_rate(&self) -> f64 {
        self.cost_increase_percent / 100.0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ManagerConfig {
    pub name: String,
    pub cost: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UpgradeConfig {
    pub id: UpgradeId,
    pub name: String,
    pub cost: f64,
    pub effect: UpgradeEffect,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "options", rename_all = "kebab-case")]
pub enum UpgradeEffect {
    MultiplyRevenue(MultiplyRevenue),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MultiplyRevenue {
    pub target: RevenueTarget,
    pub amount: f64,
}

/// Which units a revenue multiplier applies to. Serialized as the unit id,
/// or the literal string "all".
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(from = "String", into = "String")]
pub enum RevenueTarget {
    All,
    Unit(UnitId),
}

impl From<String> for RevenueTarget {
    fn from(value: String) -> Self {
        if value == "all" {
            Self::All
        } else {
            Self::Unit(value)
        }
    }
}

impl From<RevenueTarget> for String {
    fn from(value: RevenueTarget) -> Self {
        match value {
            RevenueTarget::All => "all".to_string(),
            RevenueTarget::Unit(id) => id,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct UnitsFile {
    units: Vec<UnitConfig>,
}

#[derive(Debug, Clone, Deserialize)]
struct UpgradesFile {
    upgrades: Vec<UpgradeConfig>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GameConfig {
    /// Ordered; save records align positionally with this list.
    pub units: Vec<UnitConfig>,
    /// Ordered; save records align positionally with this list.
    pub upgrades: Vec<UpgradeConfig>,
    pub starting_balance: f64,
}

impl GameConfig {
    /// Load from the data/ directory.
    /// In tests, use GameConfig::default_test().
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let units_path = format!("{data_dir}/units.json");
        let units_content = std::fs::read_to_string(&units_path)
            .map_err(|e| anyhow::anyhow!("Cannot read {units_path}: {e}"))?;
        let units_file: UnitsFile = serde_json::from_str(&units_content)?;

        let upgrades_path = format!("{data_dir}/upgrades.json");
        let upgrades_content = std::fs::read_to_string(&upgrades_path)
            .map_err(|e| anyhow::anyhow!("Cannot read {upgrades_path}: {e}"))?;
        let upgrades_file: UpgradesFile = serde_json::from_str(&upgrades_content)?;

        let config = Self {
            units: units_file.units,
            upgrades: upgrades_file.upgrades,
            starting_balance: DEFAULT_STARTING_BALANCE,
        };
        config.validate()?;
        log::info!(
            "config: loaded {} units and {} upgrades from {data_dir}",
            config.units.len(),
            config.upgrades.len()
        );
        Ok(config)
    }

    pub fn unit(&self, id: &str) -> Option<&UnitConfig> {
        self.units.iter().find(|u| u.id == id)
    }

    /// Reject tables the simulation cannot run on.
    pub fn validate(&self) -> SimResult<()> {
        let mut unit_ids = HashSet::new();
        for unit in &self.units {
            if unit.id.trim().is_empty() {
                return Err(SimError::InvalidConfig("unit with empty id".into()));
            }
            if !unit_ids.insert(unit.id.as_str()) {
                return Err(SimError::InvalidConfig(format!("duplicate unit id '{}'", unit.id)));
            }
            if !(unit.base_cost.is_finite() && unit.base_cost > 0.0) {
                return Err(invalid(&unit.id, "baseCost must be > 0"));
            }
            if !(unit.cost_increase_percent.is_finite() && unit.cost_increase_percent > 0.0) {
                return Err(invalid(&unit.id, "costIncreasePercent must be > 0"));
            }
            if !(unit.base_time_to_tick.is_finite() && unit.base_time_to_tick > 0.0) {
                return Err(invalid(&unit.id, "baseTimeToTick must be > 0"));
            }
            if !(unit.base_money_per_tick.is_finite() && unit.base_money_per_tick >= 0.0) {
                return Err(invalid(&unit.id, "baseMoneyPerTick must be >= 0"));
            }
            if !(unit.manager.cost.is_finite() && unit.manager.cost >= 0.0) {
                return Err(invalid(&unit.id, "manager cost must be >= 0"));
            }
            if unit.upgrade_levels.windows(2).any(|w| w[0] >= w[1]) {
                return Err(invalid(&unit.id, "upgradeLevels must be strictly ascending"));
            }
        }

        let mut upgrade_ids = HashSet::new();
        for upgrade in &self.upgrades {
            if !upgrade_ids.insert(upgrade.id.as_str()) {
                return Err(SimError::InvalidConfig(format!(
                    "duplicate upgrade id '{}'",
                    upgrade.id
                )));
            }
            if !(upgrade.cost.is_finite() && upgrade.cost >= 0.0) {
                return Err(invalid(&upgrade.id, "upgrade cost must be >= 0"));
            }
            match &upgrade.effect {
                UpgradeEffect::MultiplyRevenue(m) => {
                    if !(m.amount.is_finite() && m.amount >= 1.0) {
                        return Err(invalid(&upgrade.id, "revenue factor must be >= 1"));
                    }
                    if let RevenueTarget::Unit(target) = &m.target {
                        if !unit_ids.contains(target.as_str()) {
                            return Err(invalid(
                                &upgrade.id,
                                &format!("targets unknown unit '{target}'"),
                            ));
                        }
                    }
                }
            }
        }

        if !(self.starting_balance.is_finite() && self.starting_balance >= 0.0) {
            return Err(SimError::InvalidConfig("starting balance must be >= 0".into()));
        }
        Ok(())
    }

    /// Config with hardcoded tables for use in tests.
    pub fn default_test() -> Self {
        let units = vec![
            UnitConfig {
                id: "ice_cream".into(),
                name: "Ice Cream Stand".into(),
                base_cost: 10.0,
                cost_increase_percent: 7.0,
                upgrade_levels: vec![10, 25, 50, 100],
                base_money_per_tick: 1.0,
                base_time_to_tick: 1.0,
                manager: ManagerConfig { name: "Ice Cream Vendor".into(), cost: 1_000.0 },
            },
            UnitConfig {
                id: "corner_shop".into(),
                name: "Corner Shop".into(),
                base_cost: 100.0,
                cost_increase_percent: 10.0,
                upgrade_levels: vec![10, 25, 50],
                base_money_per_tick: 20.0,
                base_time_to_tick: 3.0,
                manager: ManagerConfig { name: "Shopkeeper".into(), cost: 15_000.0 },
            },
            UnitConfig {
                id: "car_wash".into(),
                name: "Car Wash".into(),
                base_cost: 1_400.0,
                cost_increase_percent: 14.0,
                upgrade_levels: vec![10, 25, 50],
                base_money_per_tick: 90.0,
                base_time_to_tick: 10.0,
                manager: ManagerConfig { name: "Wash Supervisor".into(), cost: 100_000.0 },
            },
        ];

        let upgrades = vec![
            multiply_upgrade("ice_cream_boost_1", "New ice cooler model", 5_000.0, "ice_cream", 3.0),
            multiply_upgrade("corner_shop_boost_1", "Self service checkout", 20_000.0, "corner_shop", 3.0),
            multiply_upgrade("car_wash_boost_1", "Automatic car wash", 55_000.0, "car_wash", 3.0),
            multiply_upgrade("all_boost_1", "New investment strategy", 210_000.0, "all", 3.0),
        ];

        Self {
            units,
            upgrades,
            starting_balance: DEFAULT_STARTING_BALANCE,
        }
    }
}

fn multiply_upgrade(id: &str, name: &str, cost: f64, target: &str, amount: f64) -> UpgradeConfig {
    UpgradeConfig {
        id: id.into(),
        name: name.into(),
        cost,
        effect: UpgradeEffect::MultiplyRevenue(MultiplyRevenue {
            target: RevenueTarget::from(target.to_string()),
            amount,
        }),
    }
}

fn invalid(id: &str, reason: &str) -> SimError {
    SimError::InvalidConfig(format!("'{id}': {reason}"))
}
