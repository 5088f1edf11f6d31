//! The game session: one explicit context object per save game.
//!
//! UPDATE ORDER (fixed, every host tick):
//!   1. Notification queue prunes expired entries.
//!   2. Clock advances to the real-time sample.
//!   3. Unit registry accrues every unit and makes one ledger deposit.
//!
//! RULES:
//!   - There are no globals. Everything a component needs is passed in.
//!   - Player commands run to completion before the next read.
//!   - Loading never replays production. Catch-up happens on the next
//!     `update()`, through the normal accrual path.

use crate::{
    clock::GameClock,
    command::PlayerCommand,
    config::GameConfig,
    error::SimResult,
    event::{EventLogEntry, SimEvent},
    ledger::Ledger,
    notification::NotificationQueue,
    registry::{ProductionReport, Purchase, UnitRegistry},
    save::{GameSave, MoneySave, TimeSave},
    store::SaveStore,
    types::{GameTime, RealTime, SessionId},
    unit::BuyMode,
    upgrades::UpgradeCatalog,
};

pub struct GameSession {
    pub session_id:    SessionId,
    pub clock:         GameClock,
    pub ledger:        Ledger,
    pub units:         UnitRegistry,
    pub upgrades:      UpgradeCatalog,
    pub notifications: NotificationQueue,
    buy_mode:          BuyMode,
    events:            Vec<(GameTime, SimEvent)>,
}

impl GameSession {
    /// Start a fresh game at real time `now`.
    pub fn new(config: &GameConfig, now: RealTime) -> SimResult<Self> {
        Self::with_session_id(uuid::Uuid::new_v4().to_string(), config, now)
    }

    pub fn with_session_id(session_id: SessionId, config: &GameConfig, now: RealTime) -> SimResult<Self> {
        config.validate()?;
        let clock = GameClock::new(now);
        let mut session = Self {
            ledger: Ledger::new(config.starting_balance, clock.time),
            units: UnitRegistry::new(&config.units, clock.time),
            upgrades: UpgradeCatalog::new(&config.upgrades),
            notifications: NotificationQueue::new(now),
            buy_mode: BuyMode::default(),
            events: Vec::new(),
            clock,
            session_id,
        };
        session.record(SimEvent::SessionStarted {
            session_id: session.session_id.clone(),
            game_time:  session.clock.time,
        });
        log::info!("session {}: started", session.session_id);
        Ok(session)
    }

    /// Build a fresh session and restore `save` into it.
    pub fn from_save(session_id: SessionId, config: &GameConfig, save: &GameSave) -> SimResult<Self> {
        let mut session = Self::with_session_id(session_id, config, save.time.last_update)?;
        session.events.clear();
        session.load_save(save)?;
        Ok(session)
    }

    pub fn now(&self) -> GameTime {
        self.clock.time
    }

    pub fn balance(&self) -> f64 {
        self.ledger.balance()
    }

    pub fn buy_mode(&self) -> BuyMode {
        self.buy_mode
    }

    /// One host tick: advance the clock to `now` and collect production.
    pub fn update(&mut self, now: RealTime) -> SimResult<ProductionReport> {
        self.notifications.prune(now);
        self.clock.advance(now);
        let report = self.units.update_production(self.clock.time, &mut self.ledger)?;
        if report.gained > 0.0 {
            self.record(SimEvent::ProductionCollected {
                game_time: report.game_time,
                amount:    report.gained,
                cycles:    report.total_cycles(),
            });
        }
        Ok(report)
    }

    pub fn apply(&mut self, command: PlayerCommand) -> SimResult<()> {
        match command {
            PlayerCommand::SetSpeed { multiplier } => self.set_speed(multiplier),
            PlayerCommand::SetBuyMode { mode } => {
                self.set_buy_mode(mode);
                Ok(())
            }
            PlayerCommand::BuyUnits { unit_id, amount: Some(amount) } => {
                self.buy_units(&unit_id, amount).map(|_| ())
            }
            PlayerCommand::BuyUnits { unit_id, amount: None } => {
                self.buy_units_with_mode(&unit_id).map(|_| ())
            }
            PlayerCommand::BuyManager { unit_id } => self.buy_manager(&unit_id).map(|_| ()),
            PlayerCommand::RunUnit { unit_id } => self.run_unit(&unit_id).map(|_| ()),
            PlayerCommand::BuyUpgrade { upgrade_id } => self.buy_upgrade(&upgrade_id).map(|_| ()),
        }
    }

    pub fn set_speed(&mut self, multiplier: f64) -> SimResult<()> {
        self.clock.set_speed(multiplier)?;
        log::info!("t={:.1} clock: speed set to x{multiplier}", self.clock.time);
        self.record(SimEvent::SpeedChanged {
            game_time: self.clock.time,
            multiplier,
        });
        Ok(())
    }

    pub fn set_buy_mode(&mut self, mode: BuyMode) {
        self.buy_mode = mode;
        self.record(SimEvent::BuyModeChanged { mode });
    }

    pub fn buy_units(&mut self, unit_id: &str, amount: u64) -> SimResult<Purchase> {
        let now = self.clock.time;
        let bought = self.units.buy_units(
            unit_id,
            amount,
            &mut self.ledger,
            now,
            &mut self.notifications,
        )?;
        match bought.purchase {
            Purchase::Completed { cost } => {
                let unit = self.units.get(unit_id)?;
                let owned = unit.owned;
                let cycle_duration = unit.cycle_duration();
                self.record(SimEvent::UnitsPurchased {
                    game_time: now,
                    unit_id: unit_id.to_string(),
                    amount,
                    cost,
                    owned,
                });
                if let Some(tier) = bought.tier_unlocked {
                    self.record(SimEvent::SpeedTierUnlocked {
                        game_time: now,
                        unit_id: unit_id.to_string(),
                        tier,
                        cycle_duration,
                    });
                }
            }
            Purchase::Declined { cost } => self.record_declined(unit_id, cost),
        }
        Ok(bought.purchase)
    }

    /// Buy as many units as the current buy mode resolves to.
    pub fn buy_units_with_mode(&mut self, unit_id: &str) -> SimResult<Purchase> {
        let amount = self
            .units
            .get(unit_id)?
            .amount_for_mode(self.buy_mode, self.ledger.balance());
        self.buy_units(unit_id, amount)
    }

    pub fn buy_manager(&mut self, unit_id: &str) -> SimResult<Purchase> {
        let now = self.clock.time;
        let purchase = self.units.buy_manager(unit_id, &mut self.ledger, now)?;
        match purchase {
            Purchase::Completed { cost } => self.record(SimEvent::ManagerHired {
                game_time: now,
                unit_id: unit_id.to_string(),
                cost,
            }),
            Purchase::Declined { cost } => self.record_declined(&format!("manager:{unit_id}"), cost),
        }
        Ok(purchase)
    }

    /// Start a manual cycle. Returns false if the unit was already running.
    pub fn run_unit(&mut self, unit_id: &str) -> SimResult<bool> {
        let now = self.clock.time;
        let started = self.units.run_unit(unit_id, now)?;
        if started {
            self.record(SimEvent::UnitStarted {
                game_time: now,
                unit_id: unit_id.to_string(),
            });
        }
        Ok(started)
    }

    pub fn buy_upgrade(&mut self, upgrade_id: &str) -> SimResult<Purchase> {
        let now = self.clock.time;
        let purchase = self
            .upgrades
            .buy(upgrade_id, &mut self.ledger, &mut self.units, now)?;
        match purchase {
            Purchase::Completed { cost } => self.record(SimEvent::UpgradePurchased {
                game_time: now,
                upgrade_id: upgrade_id.to_string(),
                cost,
            }),
            Purchase::Declined { cost } => self.record_declined(&format!("upgrade:{upgrade_id}"), cost),
        }
        Ok(purchase)
    }

    // ── Save / load ────────────────────────────────────────────

    pub fn generate_save(&self) -> GameSave {
        GameSave {
            time: TimeSave {
                time:        self.clock.time,
                last_update: self.clock.last_update,
            },
            money: MoneySave {
                time:  self.ledger.last_touched(),
                money: self.ledger.balance(),
            },
            factories: self.units.to_save(),
            upgrades: self.upgrades.to_save(),
        }
    }

    /// Restore `save`, replacing all unit and upgrade state. Order matters:
    /// the clock first, so restored unit and ledger times are compared
    /// against the restored game time; units before upgrades, so the
    /// multipliers are rebuilt on freshly reset units.
    pub fn load_save(&mut self, save: &GameSave) -> SimResult<()> {
        self.clock.restore(save.time.time, save.time.last_update);
        self.ledger.set_balance(save.money.money, save.money.time);
        self.units.load_save(&save.factories, self.clock.time);
        self.upgrades.load_save(&save.upgrades, &mut self.units)?;
        log::info!(
            "t={:.1} session {}: loaded save, balance={:.2}",
            self.clock.time,
            self.session_id,
            self.ledger.balance()
        );
        self.record(SimEvent::SessionLoaded {
            session_id: self.session_id.clone(),
            game_time:  self.clock.time,
        });
        Ok(())
    }

    /// Anchor the clock to a real wall-clock sample before saving a session
    /// that was driven by synthetic time, so the next load catches up from
    /// that instant.
    pub fn rebase_real_time(&mut self, now: RealTime) {
        self.clock.rebase(now);
        log::debug!("t={:.1} clock: real-time anchor moved to {now:.3}", self.clock.time);
    }

    pub fn save_to(&self, store: &SaveStore, slot: &str) -> SimResult<i64> {
        let id = store.save_game(slot, &self.session_id, &self.generate_save())?;
        log::debug!("t={:.1} session {}: saved to slot '{slot}'", self.clock.time, self.session_id);
        Ok(id)
    }

    /// Resume the latest save in `slot`, if there is one.
    pub fn load_from(config: &GameConfig, store: &SaveStore, slot: &str) -> SimResult<Option<Self>> {
        match store.latest_save(slot)? {
            Some(stored) => Ok(Some(Self::from_save(stored.session_id, config, &stored.save)?)),
            None => Ok(None),
        }
    }

    // ── Events ─────────────────────────────────────────────────

    /// Take every event recorded since the last drain.
    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        self.events.drain(..).map(|(_, e)| e).collect()
    }

    /// Append every pending event to the store's event log. Only events
    /// that were written leave the pending list; on error the rest stay
    /// queued for the next flush.
    pub fn flush_events(&mut self, store: &SaveStore) -> SimResult<usize> {
        let mut written = 0;
        let result = self.append_pending(store, &mut written);
        self.events.drain(..written);
        result.map(|()| written)
    }

    fn append_pending(&self, store: &SaveStore, written: &mut usize) -> SimResult<()> {
        for (game_time, event) in &self.events {
            let entry = EventLogEntry {
                id:         None,
                session_id: self.session_id.clone(),
                game_time:  *game_time,
                event_type: event.type_name().to_string(),
                payload:    serde_json::to_string(event)?,
            };
            store.append_event(&entry)?;
            *written += 1;
        }
        Ok(())
    }

    /// Number of recorded events not yet drained or flushed.
    pub fn pending_events(&self) -> usize {
        self.events.len()
    }

    fn record(&mut self, event: SimEvent) {
        self.events.push((self.clock.time, event));
    }

    fn record_declined(&mut self, item: &str, cost: f64) {
        self.record(SimEvent::PurchaseDeclined {
            game_time: self.clock.time,
            item: item.to_string(),
            cost,
        });
    }
}
