//! Upgrade catalog: one-time purchases with data-driven effects.
//!
//! An upgrade's effect is applied exactly once. `enable()` is reached both
//! from a purchase and from loading a save, so it must be a no-op for an
//! upgrade that is already owned.

use crate::{
    config::{MultiplyRevenue, RevenueTarget, UpgradeConfig, UpgradeEffect},
    error::{SimError, SimResult},
    ledger::Ledger,
    registry::{Purchase, UnitRegistry},
    save::UpgradeSave,
    types::GameTime,
};

#[derive(Debug, Clone, PartialEq)]
pub struct UpgradeState {
    pub config: UpgradeConfig,
    owned:      bool,
}

impl UpgradeState {
    pub fn new(config: UpgradeConfig) -> Self {
        Self { config, owned: false }
    }

    pub fn id(&self) -> &str {
        &self.config.id
    }

    pub fn owned(&self) -> bool {
        self.owned
    }

    /// Mark owned and apply the effect. Returns false, changing nothing,
    /// if the upgrade was already owned.
    pub fn enable(&mut self, units: &mut UnitRegistry) -> SimResult<bool> {
        if self.owned {
            return Ok(false);
        }
        match &self.config.effect {
            UpgradeEffect::MultiplyRevenue(MultiplyRevenue { target, amount }) => {
                units.multiply_revenue(target, *amount)?;
            }
        }
        self.owned = true;
        Ok(true)
    }

    /// Player-facing text describing the effect.
    pub fn description(&self, units: &UnitRegistry) -> String {
        match &self.config.effect {
            UpgradeEffect::MultiplyRevenue(MultiplyRevenue { target, amount }) => {
                let boosted = match target {
                    RevenueTarget::All => "everything".to_string(),
                    RevenueTarget::Unit(unit_id) => units
                        .get(unit_id)
                        .map(|u| u.config.name.clone())
                        .unwrap_or_else(|_| unit_id.clone()),
                };
                format!("Boosts revenue of {boosted} by x{amount}")
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct UpgradeCatalog {
    upgrades: Vec<UpgradeState>,
}

impl UpgradeCatalog {
    pub fn new(configs: &[UpgradeConfig]) -> Self {
        Self {
            upgrades: configs.iter().cloned().map(UpgradeState::new).collect(),
        }
    }

    pub fn upgrades(&self) -> &[UpgradeState] {
        &self.upgrades
    }

    pub fn get(&self, upgrade_id: &str) -> SimResult<&UpgradeState> {
        self.upgrades
            .iter()
            .find(|u| u.id() == upgrade_id)
            .ok_or_else(|| SimError::unknown_upgrade(upgrade_id))
    }

    /// Upgrades not yet owned, in config order.
    pub fn available(&self) -> impl Iterator<Item = &UpgradeState> {
        self.upgrades.iter().filter(|u| !u.owned)
    }

    pub fn buy(
        &mut self,
        upgrade_id: &str,
        ledger: &mut Ledger,
        units: &mut UnitRegistry,
        now: GameTime,
    ) -> SimResult<Purchase> {
        let upgrade = self
            .upgrades
            .iter_mut()
            .find(|u| u.config.id == upgrade_id)
            .ok_or_else(|| SimError::unknown_upgrade(upgrade_id))?;
        let cost = upgrade.config.cost;
        if upgrade.owned || !ledger.can_afford(cost) {
            log::debug!("t={now:.1} upgrades: declined {upgrade_id}");
            return Ok(Purchase::Declined { cost });
        }

        ledger.withdraw(cost, now)?;
        upgrade.enable(units)?;
        log::info!("t={now:.1} upgrades: bought {upgrade_id} for {cost:.2}");
        Ok(Purchase::Completed { cost })
    }

    pub fn to_save(&self) -> Vec<UpgradeSave> {
        self.upgrades
            .iter()
            .map(|u| UpgradeSave { owned: u.owned })
            .collect()
    }

    /// Positional restore. Ownership is cleared first, then owned records
    /// re-apply their effect through `enable()`, so the revenue multipliers
    /// are rebuilt, not stored. Expects `units` to have been restored (and
    /// its multipliers reset) just before.
    pub fn load_save(&mut self, saves: &[UpgradeSave], units: &mut UnitRegistry) -> SimResult<()> {
        for upgrade in &mut self.upgrades {
            upgrade.owned = false;
        }
        if saves.len() > self.upgrades.len() {
            log::warn!(
                "upgrades: save has {} records but config has {} upgrades; ignoring extras",
                saves.len(),
                self.upgrades.len()
            );
        }
        for (upgrade, save) in self.upgrades.iter_mut().zip(saves) {
            if save.owned {
                upgrade.enable(units)?;
            }
        }
        Ok(())
    }
}
