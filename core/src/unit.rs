//! A single production unit type: cost curve, speed tiers, and the
//! elapsed-time accrual that turns game time into completed cycles.
//!
//! RULES:
//!   - Accrual never iterates per cycle. Offline gaps of any length are
//!     resolved with one floor division.
//!   - `speed_tier` and `cycle_duration` are derived from `owned` and are
//!     recomputed whenever `owned` changes or a save is loaded.

use crate::{
    config::UnitConfig,
    save::UnitSave,
    types::GameTime,
};
use serde::{Deserialize, Serialize};

/// Upper bound on the max-buyable probe, for balances so large the cost
/// curve never catches up in floating point.
pub const MAX_AFFORDABLE_PROBE: u64 = 100_000;

/// Cycles shorter than this on a managed unit are shown as indeterminate.
pub const MIN_VISIBLE_CYCLE_SECS: f64 = 1.0;

/// Cost of buying the unit that takes ownership from `n` to `n + 1`.
pub fn unit_cost(config: &UnitConfig, n: u64) -> f64 {
    config.base_cost * (1.0 + config.growth_rate()).powf(n as f64)
}

/// Exact cost of buying `amount` consecutive units starting at ownership `from`.
pub fn bulk_cost(config: &UnitConfig, from: u64, amount: u64) -> f64 {
    (from..from.saturating_add(amount))
        .map(|n| unit_cost(config, n))
        .sum()
}

/// Like `bulk_cost`, but gives up with `Err(partial)` as soon as the running
/// total exceeds `limit` or overflows. The loop never runs past the
/// affordable prefix, so `amount` can be arbitrarily large.
pub fn bulk_cost_within(config: &UnitConfig, from: u64, amount: u64, limit: f64) -> Result<f64, f64> {
    let mut total = 0.0;
    for n in from..from.saturating_add(amount) {
        total += unit_cost(config, n);
        if total > limit || !total.is_finite() {
            return Err(total);
        }
    }
    Ok(total)
}

/// Number of thresholds at or below `owned`.
pub fn speed_tier_for(thresholds: &[u64], owned: u64) -> u32 {
    thresholds.iter().filter(|&&t| t <= owned).count() as u32
}

/// Each unlocked tier divides the base duration again: tier 1 halves it,
/// tier 2 quarters it.
pub fn cycle_duration_for(base: f64, tier: u32) -> f64 {
    base / f64::from((tier * 2).max(1))
}

/// How many units one purchase click buys.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum BuyMode {
    #[default]
    Single,
    Ten,
    /// Enough to reach the next speed tier threshold.
    Next,
    /// As many as the current balance allows.
    Max,
}

/// Display-only progress of the current cycle.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "state", content = "fraction", rename_all = "snake_case")]
pub enum Progress {
    /// Not running, or nothing owned.
    Idle,
    /// Fraction of the current cycle completed, in [0, 1).
    Fraction(f64),
    /// Managed cycle too fast for a meaningful bar.
    Indeterminate,
}

/// Result of accruing one unit up to a given game time.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Accrual {
    pub cycles: u64,
    pub gained: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProductionUnit {
    pub config:         UnitConfig,
    pub owned:          u64,
    /// Game time the current cycle started.
    pub last_tick:      GameTime,
    pub has_manager:    bool,
    pub running:        bool,
    speed_tier:         u32,
    cycle_duration:     f64,
    revenue_multiplier: f64,
}

impl ProductionUnit {
    pub fn new(config: UnitConfig, now: GameTime) -> Self {
        let cycle_duration = config.base_time_to_tick;
        Self {
            config,
            owned: 0,
            last_tick: now,
            has_manager: false,
            running: false,
            speed_tier: 0,
            cycle_duration,
            revenue_multiplier: 1.0,
        }
    }

    pub fn id(&self) -> &str {
        &self.config.id
    }

    pub fn speed_tier(&self) -> u32 {
        self.speed_tier
    }

    pub fn cycle_duration(&self) -> f64 {
        self.cycle_duration
    }

    pub fn revenue_multiplier(&self) -> f64 {
        self.revenue_multiplier
    }

    /// Multipliers stack multiplicatively.
    pub fn multiply_revenue(&mut self, factor: f64) {
        self.revenue_multiplier *= factor;
    }

    /// Cost of the next `amount` units from the current ownership.
    pub fn cost_of(&self, amount: u64) -> f64 {
        bulk_cost(&self.config, self.owned, amount)
    }

    /// Cost of the next `amount` units if it fits in `limit`.
    pub fn cost_within(&self, amount: u64, limit: f64) -> Result<f64, f64> {
        bulk_cost_within(&self.config, self.owned, amount, limit)
    }

    /// Largest `k` whose bulk cost fits in `balance`. 0 if one unit is unaffordable.
    pub fn max_affordable(&self, balance: f64) -> u64 {
        let mut total = 0.0;
        let mut k = 0;
        while k < MAX_AFFORDABLE_PROBE {
            total += unit_cost(&self.config, self.owned + k);
            if total > balance {
                break;
            }
            k += 1;
        }
        k
    }

    /// Smallest threshold strictly above the current ownership.
    pub fn next_tier_threshold(&self) -> Option<u64> {
        self.config.upgrade_levels.iter().copied().find(|&t| t > self.owned)
    }

    /// Resolve a buy mode into a unit count. Never 0, so the caller can
    /// always quote a price.
    pub fn amount_for_mode(&self, mode: BuyMode, balance: f64) -> u64 {
        match mode {
            BuyMode::Single => 1,
            BuyMode::Ten => 10,
            BuyMode::Next => self
                .next_tier_threshold()
                .map(|t| t - self.owned)
                .unwrap_or(1),
            BuyMode::Max => self.max_affordable(balance).max(1),
        }
    }

    /// Re-derive tier and cycle duration from `owned`.
    /// Returns the new tier if it went up.
    pub fn refresh_speed_tier(&mut self) -> Option<u32> {
        let old = self.speed_tier;
        self.speed_tier = speed_tier_for(&self.config.upgrade_levels, self.owned);
        self.cycle_duration = cycle_duration_for(self.config.base_time_to_tick, self.speed_tier);
        (self.speed_tier > old).then_some(self.speed_tier)
    }

    pub fn revenue_per_cycle(&self) -> f64 {
        self.config.base_money_per_tick * self.owned as f64 * self.revenue_multiplier
    }

    pub fn revenue_per_second(&self) -> f64 {
        self.revenue_per_cycle() / self.cycle_duration
    }

    /// Convert game time elapsed since `last_tick` into completed cycles.
    ///
    /// Managed units roll `last_tick` forward by whole cycles only, keeping
    /// partial progress. A manual unit completes at most one cycle per run
    /// and then stops until it is run again.
    pub fn accrue(&mut self, now: GameTime) -> Accrual {
        if self.owned == 0 || (!self.has_manager && !self.running) {
            return Accrual::default();
        }
        let elapsed = now - self.last_tick;
        if elapsed <= 0.0 {
            return Accrual::default();
        }
        let mut cycles = (elapsed / self.cycle_duration).floor() as u64;
        if !self.has_manager {
            cycles = cycles.min(1);
        }
        if cycles == 0 {
            return Accrual::default();
        }

        if self.has_manager {
            self.last_tick += cycles as f64 * self.cycle_duration;
        } else {
            self.running = false;
        }
        Accrual {
            cycles,
            gained: cycles as f64 * self.revenue_per_cycle(),
        }
    }

    pub fn progress(&self, now: GameTime) -> Progress {
        if self.owned == 0 || !self.running {
            return Progress::Idle;
        }
        if self.has_manager && self.cycle_duration < MIN_VISIBLE_CYCLE_SECS {
            return Progress::Indeterminate;
        }
        let fraction = ((now - self.last_tick) / self.cycle_duration).clamp(0.0, 1.0);
        Progress::Fraction(if fraction >= 1.0 { 1.0 - f64::EPSILON } else { fraction })
    }

    pub fn to_save(&self) -> UnitSave {
        UnitSave {
            owned:       self.owned,
            last_tick:   self.last_tick,
            has_manager: self.has_manager,
            running:     self.running,
        }
    }

    /// Restore runtime state. The revenue multiplier is not part of the
    /// save; it is rebuilt by re-enabling owned upgrades.
    pub fn load_save(&mut self, save: &UnitSave) {
        self.owned = save.owned;
        self.last_tick = save.last_tick;
        self.has_manager = save.has_manager;
        self.running = save.running;
        self.refresh_speed_tier();
    }
}
