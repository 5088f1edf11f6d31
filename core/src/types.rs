//! Shared primitive types used across the entire simulation.

/// Simulated seconds since the game started. Scaled by the clock speed.
pub type GameTime = f64;

/// Wall-clock seconds since the Unix epoch.
pub type RealTime = f64;

/// Stable identifier of a production unit type, e.g. "ice_cream".
pub type UnitId = String;

/// Stable identifier of an upgrade, e.g. "all_boost_1".
pub type UpgradeId = String;

/// The canonical session identifier.
pub type SessionId = String;
