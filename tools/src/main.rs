//! idle-runner: headless runner for the idle economy simulation.
//!
//! Usage:
//!   idle-runner --data-dir ./data --db saves.db --slot main --seconds 3600 --autoplay
//!   idle-runner --data-dir ./data --ipc-mode

use anyhow::Result;
use idle_core::{
    clock::wall_clock_now,
    command::PlayerCommand,
    config::GameConfig,
    session::GameSession,
    store::SaveStore,
    types::RealTime,
    views::{available_managers, available_upgrades, game_view},
};
use std::env;
use std::io::{self, BufRead, Write};

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    GetState,
    Advance { seconds: f64 },
    Command { command: PlayerCommand },
    Save,
    Quit,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seconds = parse_arg(&args, "--seconds", 600.0f64);
    let step = parse_arg(&args, "--step", 1.0f64);
    let speed = parse_arg(&args, "--speed", 1.0f64);
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let autoplay = args.iter().any(|a| a == "--autoplay");
    let db = str_arg(&args, "--db").unwrap_or(":memory:");
    let slot = str_arg(&args, "--slot").unwrap_or("main");
    let data_dir = str_arg(&args, "--data-dir").unwrap_or("./data");

    if !ipc_mode {
        println!("Idle economy: idle-runner");
        println!("  data_dir:  {data_dir}");
        println!("  db:        {db}");
        println!("  slot:      {slot}");
        println!("  seconds:   {seconds}");
        println!("  speed:     x{speed}");
        println!();
    }

    let config = GameConfig::load(data_dir)?;
    let store = SaveStore::open(db)?;
    store.migrate()?;

    let started_at = wall_clock_now();
    let mut session = match GameSession::load_from(&config, &store, slot)? {
        Some(session) => {
            log::info!("resuming session {} from slot '{slot}'", session.session_id);
            session
        }
        None => GameSession::new(&config, started_at)?,
    };
    store.insert_session(&session.session_id, env!("CARGO_PKG_VERSION"), started_at)?;

    // Catch up whatever passed since the save before the new speed applies.
    let report = session.update(started_at)?;
    if report.gained > 0.0 {
        log::info!("offline catch-up collected ${:.2}", report.gained);
    }
    session.set_speed(speed)?;

    if ipc_mode {
        run_ipc_loop(&mut session, &store, slot)?;
    } else {
        simulate(&mut session, started_at, seconds, step, autoplay)?;
        // The simulated seconds were not real ones; resume from now, not from `started_at + seconds`.
        session.rebase_real_time(wall_clock_now());
        session.save_to(&store, slot)?;
        session.flush_events(&store)?;
        print_summary(&session, &store)?;
    }

    Ok(())
}

/// Step a synthetic real-time clock forward from `start`.
fn simulate(
    session: &mut GameSession,
    start: RealTime,
    seconds: f64,
    step: f64,
    autoplay: bool,
) -> Result<()> {
    let step = step.max(0.001);
    let mut elapsed = 0.0;
    while elapsed < seconds {
        elapsed = (elapsed + step).min(seconds);
        if autoplay {
            autoplay_turn(session)?;
        }
        session.update(start + elapsed)?;
    }
    Ok(())
}

/// Greedy player: upgrades, then managers, then the cheapest affordable
/// unit, then run every idle manual unit.
fn autoplay_turn(session: &mut GameSession) -> Result<()> {
    let offers = available_upgrades(&session.upgrades, &session.units, session.balance());
    for offer in offers.into_iter().filter(|o| o.can_afford) {
        session.buy_upgrade(&offer.upgrade_id)?;
    }

    let managers = available_managers(&session.units, session.balance());
    for offer in managers.into_iter().filter(|m| m.can_afford) {
        let owned = session.units.get(&offer.unit_id)?.owned;
        if owned > 0 {
            session.buy_manager(&offer.unit_id)?;
        }
    }

    let cheapest = session
        .units
        .units()
        .iter()
        .map(|u| (u.config.id.clone(), u.cost_of(1)))
        .filter(|(_, cost)| *cost <= session.balance())
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(id, _)| id);
    if let Some(unit_id) = cheapest {
        session.buy_units(&unit_id, 1)?;
    }

    let idle: Vec<String> = session
        .units
        .units()
        .iter()
        .filter(|u| u.owned > 0 && !u.running && !u.has_manager)
        .map(|u| u.config.id.clone())
        .collect();
    for unit_id in idle {
        session.run_unit(&unit_id)?;
    }
    Ok(())
}

fn run_ipc_loop(session: &mut GameSession, store: &SaveStore, slot: &str) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();
    // IPC time is driven by `advance`, not the wall clock.
    let mut now = session.clock.last_update;

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }

        let cmd: IpcCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                let err_json = serde_json::json!({ "error": e.to_string() });
                writeln!(stdout, "{}", err_json)?;
                stdout.flush()?;
                continue;
            }
        };

        match cmd {
            IpcCommand::Quit => break,
            IpcCommand::GetState => {}
            IpcCommand::Advance { seconds } => {
                now += seconds.max(0.0);
                session.update(now)?;
            }
            IpcCommand::Command { command } => {
                if let Err(e) = session.apply(command) {
                    let err_json = serde_json::json!({ "error": e.to_string() });
                    writeln!(stdout, "{}", err_json)?;
                    stdout.flush()?;
                    continue;
                }
            }
            IpcCommand::Save => {
                session.rebase_real_time(wall_clock_now());
                now = session.clock.last_update;
                session.save_to(store, slot)?;
            }
        }
        session.flush_events(store)?;
        writeln!(stdout, "{}", serde_json::to_string(&game_view(session))?)?;
        stdout.flush()?;
    }
    Ok(())
}

fn print_summary(session: &GameSession, store: &SaveStore) -> Result<()> {
    let events = store.events_for_session(&session.session_id)?;

    println!("=== RUN SUMMARY ===");
    println!("  session:    {}", session.session_id);
    println!("  game time:  {:.1}s", session.now());
    println!("  balance:    ${:.2}", session.balance());
    println!("  events:     {}", events.len());
    println!();
    println!("=== UNITS ===");
    for unit in session.units.units() {
        println!(
            "  {:<18} owned: {:>4} | tier: {} | manager: {:<5} | ${:.2}/s",
            unit.config.name,
            unit.owned,
            unit.speed_tier(),
            unit.has_manager,
            unit.revenue_per_second()
        );
    }
    let owned: Vec<_> = session
        .upgrades
        .upgrades()
        .iter()
        .filter(|u| u.owned())
        .map(|u| u.config.name.as_str())
        .collect();
    println!();
    println!("=== UPGRADES ===");
    if owned.is_empty() {
        println!("  (none owned)");
    } else {
        for name in owned {
            println!("  {name}");
        }
    }
    Ok(())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}

fn str_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}
