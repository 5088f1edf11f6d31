//! Ledger: the single currency balance.

use crate::{
    error::{SimError, SimResult},
    types::GameTime,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Ledger {
    balance:      f64,
    /// Game time of the last mutation. Kept for save symmetry only.
    last_touched: GameTime,
}

impl Ledger {
    pub fn new(balance: f64, now: GameTime) -> Self {
        Self { balance, last_touched: now }
    }

    pub fn balance(&self) -> f64 {
        self.balance
    }

    pub fn last_touched(&self) -> GameTime {
        self.last_touched
    }

    pub fn can_afford(&self, amount: f64) -> bool {
        amount <= self.balance
    }

    pub fn deposit(&mut self, amount: f64, now: GameTime) -> SimResult<()> {
        check_amount(amount)?;
        self.balance += amount;
        self.last_touched = now;
        Ok(())
    }

    /// Withdraw `amount`. Re-validates affordability even though every
    /// caller checks `can_afford` first.
    pub fn withdraw(&mut self, amount: f64, now: GameTime) -> SimResult<()> {
        check_amount(amount)?;
        if amount > self.balance {
            return Err(SimError::InsufficientFunds {
                requested: amount,
                available: self.balance,
            });
        }
        self.balance -= amount;
        self.last_touched = now;
        Ok(())
    }

    /// Save restoration only. Bypasses the withdraw check.
    pub fn set_balance(&mut self, amount: f64, touched_at: GameTime) {
        self.balance = amount;
        self.last_touched = touched_at;
    }
}

fn check_amount(amount: f64) -> SimResult<()> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(SimError::InvalidArgument(format!(
            "ledger amount must be finite and >= 0, got {amount}"
        )));
    }
    Ok(())
}
