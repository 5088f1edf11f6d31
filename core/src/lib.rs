//! Simulation core of an incremental economy game.
//!
//! Production units generate money on timed cycles, purchases follow a
//! compounding cost curve, speed tiers unlock with ownership, and upgrades
//! multiply revenue. Elapsed time is turned into whole production cycles
//! in constant time, so arbitrarily long offline gaps resume from a save
//! without replaying history.

pub mod clock;
pub mod command;
pub mod config;
pub mod error;
pub mod event;
pub mod ledger;
pub mod notification;
pub mod registry;
pub mod save;
pub mod session;
pub mod store;
pub mod types;
pub mod unit;
pub mod upgrades;
pub mod views;
