use crate::{
    types::{UnitId, UpgradeId},
    unit::BuyMode,
};
use serde::{Deserialize, Serialize};

/// All player-issued commands. Each is applied synchronously and runs to
/// completion before the next read.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum PlayerCommand {
    // ── Clock control ─────────────────────────────
    SetSpeed { multiplier: f64 },

    // ── Units ─────────────────────────────────────
    SetBuyMode { mode: BuyMode },
    /// Buy `amount` units, or as many as the current buy mode resolves to.
    BuyUnits {
        unit_id: UnitId,
        #[serde(default)]
        amount:  Option<u64>,
    },
    BuyManager { unit_id: UnitId },
    RunUnit { unit_id: UnitId },

    // ── Upgrades ──────────────────────────────────
    BuyUpgrade { upgrade_id: UpgradeId },
}
