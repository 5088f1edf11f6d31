//! Save snapshot: full game state to/from JSON.
//!
//! A save captures everything needed to resume a session without storing
//! any per-cycle history. Unit and upgrade records are positional and
//! align with the order of the config tables.
//! Revenue multipliers are deliberately absent: they are rebuilt from the
//! upgrade `owned` flags on load.

use crate::{
    error::SimResult,
    types::{GameTime, RealTime},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameSave {
    pub time:      TimeSave,
    pub money:     MoneySave,
    pub factories: Vec<UnitSave>,
    pub upgrades:  Vec<UpgradeSave>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TimeSave {
    pub time:        GameTime,
    pub last_update: RealTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MoneySave {
    /// Game time the balance was last touched.
    pub time:  GameTime,
    pub money: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UnitSave {
    pub owned:       u64,
    pub last_tick:   GameTime,
    pub has_manager: bool,
    pub running:     bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UpgradeSave {
    pub owned: bool,
}

impl GameSave {
    pub fn to_json(&self) -> SimResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> SimResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
