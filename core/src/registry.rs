//! Unit registry: owns every production unit and resolves purchase,
//! run, and production requests against the ledger.
//!
//! RULES:
//!   - Unaffordable requests are declined silently (Ok(Declined)); they
//!     never leave a partial state behind.
//!   - Unknown unit ids are caller bugs and surface as UnknownEntity.
//!   - `update_production` makes at most one ledger deposit per call.

use crate::{
    config::{RevenueTarget, UnitConfig},
    error::{SimError, SimResult},
    ledger::Ledger,
    notification::NotificationSink,
    save::UnitSave,
    types::{GameTime, UnitId},
    unit::ProductionUnit,
};
use serde::Serialize;

/// Outcome of a user-triggered purchase.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Purchase {
    Completed { cost: f64 },
    /// For unit purchases `cost` stops accumulating at the first unit the
    /// balance cannot cover, so it is a lower bound on the full price.
    Declined { cost: f64 },
}

impl Purchase {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }

    pub fn cost(&self) -> f64 {
        match self {
            Self::Completed { cost } | Self::Declined { cost } => *cost,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitsBought {
    pub purchase:      Purchase,
    /// Set when this purchase pushed the unit into a higher speed tier.
    pub tier_unlocked: Option<u32>,
}

/// What one production update collected.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductionReport {
    pub game_time: GameTime,
    pub gained:    f64,
    /// Completed cycles per unit, only for units that completed any.
    pub cycles:    Vec<(UnitId, u64)>,
}

impl ProductionReport {
    pub fn total_cycles(&self) -> u64 {
        self.cycles.iter().map(|(_, c)| c).sum()
    }
}

#[derive(Debug, Clone)]
pub struct UnitRegistry {
    units: Vec<ProductionUnit>,
}

impl UnitRegistry {
    pub fn new(configs: &[UnitConfig], now: GameTime) -> Self {
        Self {
            units: configs
                .iter()
                .cloned()
                .map(|c| ProductionUnit::new(c, now))
                .collect(),
        }
    }

    pub fn units(&self) -> &[ProductionUnit] {
        &self.units
    }

    pub fn get(&self, unit_id: &str) -> SimResult<&ProductionUnit> {
        self.units
            .iter()
            .find(|u| u.id() == unit_id)
            .ok_or_else(|| SimError::unknown_unit(unit_id))
    }

    fn get_mut(&mut self, unit_id: &str) -> SimResult<&mut ProductionUnit> {
        self.units
            .iter_mut()
            .find(|u| u.id() == unit_id)
            .ok_or_else(|| SimError::unknown_unit(unit_id))
    }

    /// Buy `amount` units of `unit_id`, paying the exact compounded cost.
    pub fn buy_units(
        &mut self,
        unit_id: &str,
        amount: u64,
        ledger: &mut Ledger,
        now: GameTime,
        sink: &mut dyn NotificationSink,
    ) -> SimResult<UnitsBought> {
        if amount == 0 {
            return Err(SimError::InvalidArgument(format!(
                "purchase amount for '{unit_id}' must be > 0"
            )));
        }
        let unit = self.get_mut(unit_id)?;
        let cost = match unit.cost_within(amount, ledger.balance()) {
            Ok(cost) => cost,
            // `partial` is the running total at the first unit that broke the balance.
            Err(partial) => {
                log::debug!(
                    "t={now:.1} units: declined {amount}x {unit_id}, at least {partial:.2} (balance {:.2})",
                    ledger.balance()
                );
                return Ok(UnitsBought {
                    purchase: Purchase::Declined { cost: partial },
                    tier_unlocked: None,
                });
            }
        };

        ledger.withdraw(cost, now)?;
        if unit.owned == 0 {
            // Production could not have run while nothing was owned.
            unit.last_tick = now;
        }
        unit.owned += amount;
        let tier_unlocked = unit.refresh_speed_tier();
        log::info!(
            "t={now:.1} units: bought {amount}x {unit_id} for {cost:.2}, owned={}",
            unit.owned
        );

        if let Some(tier) = tier_unlocked {
            log::info!(
                "t={now:.1} units: {unit_id} reached speed tier {tier}, cycle={:.3}s",
                unit.cycle_duration()
            );
            sink.notify(&format!(
                "{} upgraded to speed tier {tier}! A cycle now takes {:.2}s.",
                unit.config.name,
                unit.cycle_duration()
            ));
        }

        Ok(UnitsBought {
            purchase: Purchase::Completed { cost },
            tier_unlocked,
        })
    }

    /// Hire the manager for `unit_id`. A managed unit starts a cycle
    /// immediately if it was idle.
    pub fn buy_manager(
        &mut self,
        unit_id: &str,
        ledger: &mut Ledger,
        now: GameTime,
    ) -> SimResult<Purchase> {
        let unit = self.get_mut(unit_id)?;
        let cost = unit.config.manager.cost;
        if unit.has_manager || !ledger.can_afford(cost) {
            log::debug!("t={now:.1} units: declined manager for {unit_id}");
            return Ok(Purchase::Declined { cost });
        }

        ledger.withdraw(cost, now)?;
        unit.has_manager = true;
        if !unit.running {
            unit.running = true;
            unit.last_tick = now;
        }
        log::info!("t={now:.1} units: hired {} for {unit_id}", unit.config.manager.name);
        Ok(Purchase::Completed { cost })
    }

    /// Start one manual cycle. Returns false if the unit was already running.
    pub fn run_unit(&mut self, unit_id: &str, now: GameTime) -> SimResult<bool> {
        let unit = self.get_mut(unit_id)?;
        if unit.running {
            return Ok(false);
        }
        unit.last_tick = now;
        unit.running = true;
        Ok(true)
    }

    /// Accrue every unit up to `now` and deposit the total once.
    pub fn update_production(&mut self, now: GameTime, ledger: &mut Ledger) -> SimResult<ProductionReport> {
        let mut report = ProductionReport {
            game_time: now,
            ..Default::default()
        };
        for unit in &mut self.units {
            let accrual = unit.accrue(now);
            if accrual.cycles > 0 {
                report.gained += accrual.gained;
                report.cycles.push((unit.config.id.clone(), accrual.cycles));
            }
        }
        if report.gained > 0.0 {
            ledger.deposit(report.gained, now)?;
            log::debug!(
                "t={now:.1} units: collected {:.2} from {} cycles",
                report.gained,
                report.total_cycles()
            );
        }
        Ok(report)
    }

    /// Multiply the revenue of one unit, or of every unit.
    pub fn multiply_revenue(&mut self, target: &RevenueTarget, factor: f64) -> SimResult<()> {
        match target {
            RevenueTarget::All => {
                for unit in &mut self.units {
                    unit.multiply_revenue(factor);
                }
            }
            RevenueTarget::Unit(unit_id) => self.get_mut(unit_id)?.multiply_revenue(factor),
        }
        Ok(())
    }

    pub fn to_save(&self) -> Vec<UnitSave> {
        self.units.iter().map(ProductionUnit::to_save).collect()
    }

    /// Positional restore. Every unit is first reset to its fresh state at
    /// `now`, so units without a record and all revenue multipliers start
    /// from scratch. Upgrades rebuild the multipliers afterwards.
    pub fn load_save(&mut self, saves: &[UnitSave], now: GameTime) {
        if saves.len() > self.units.len() {
            log::warn!(
                "units: save has {} records but config has {} units; ignoring extras",
                saves.len(),
                self.units.len()
            );
        }
        for unit in &mut self.units {
            *unit = ProductionUnit::new(unit.config.clone(), now);
        }
        for (unit, save) in self.units.iter_mut().zip(saves) {
            unit.load_save(save);
        }
    }
}
