//! Session event log.
//!
//! Every applied mutation, and every update that produced money, is
//! recorded as a SimEvent. The host drains them from the session and may
//! persist them; the simulation never reads them back.

use crate::{
    types::{GameTime, SessionId, UnitId, UpgradeId},
    unit::BuyMode,
};
use serde::{Deserialize, Serialize};

/// Variants are appended, never removed or reordered.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SimEvent {
    // ── Session events ─────────────────────────────
    SessionStarted {
        session_id: SessionId,
        game_time:  GameTime,
    },
    SessionLoaded {
        session_id: SessionId,
        game_time:  GameTime,
    },
    SpeedChanged {
        game_time:  GameTime,
        multiplier: f64,
    },
    BuyModeChanged {
        mode: BuyMode,
    },

    // ── Production events ──────────────────────────
    ProductionCollected {
        game_time: GameTime,
        amount:    f64,
        cycles:    u64,
    },
    SpeedTierUnlocked {
        game_time:      GameTime,
        unit_id:        UnitId,
        tier:           u32,
        cycle_duration: f64,
    },

    // ── Purchase events ────────────────────────────
    UnitsPurchased {
        game_time: GameTime,
        unit_id:   UnitId,
        amount:    u64,
        cost:      f64,
        owned:     u64,
    },
    ManagerHired {
        game_time: GameTime,
        unit_id:   UnitId,
        cost:      f64,
    },
    UnitStarted {
        game_time: GameTime,
        unit_id:   UnitId,
    },
    UpgradePurchased {
        game_time:  GameTime,
        upgrade_id: UpgradeId,
        cost:       f64,
    },
    PurchaseDeclined {
        game_time: GameTime,
        item:      String,
        cost:      f64,
    },
}

impl SimEvent {
    /// Stable name for the event_type column in event_log.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::SessionStarted { .. }      => "session_started",
            Self::SessionLoaded { .. }       => "session_loaded",
            Self::SpeedChanged { .. }        => "speed_changed",
            Self::BuyModeChanged { .. }      => "buy_mode_changed",
            Self::ProductionCollected { .. } => "production_collected",
            Self::SpeedTierUnlocked { .. }   => "speed_tier_unlocked",
            Self::UnitsPurchased { .. }      => "units_purchased",
            Self::ManagerHired { .. }        => "manager_hired",
            Self::UnitStarted { .. }         => "unit_started",
            Self::UpgradePurchased { .. }    => "upgrade_purchased",
            Self::PurchaseDeclined { .. }    => "purchase_declined",
        }
    }
}

/// The event log entry as persisted to SQLite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventLogEntry {
    pub id:         Option<i64>,
    pub session_id: SessionId,
    pub game_time:  GameTime,
    pub event_type: String,
    pub payload:    String, // JSON-serialized SimEvent
}
