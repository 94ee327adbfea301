use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use wayfarer::combat::CombatOutcome;
use wayfarer::core::constants::MAX_TICKS_PER_ADVANCE;
use wayfarer::core::{setup_new_game, EngineConfig, GameStore, Gameloop, TickEvent};
use wayfarer::save::FileAdapter;
use wayfarer::world::LocationType;
use wayfarer::{build_info, ContentRegistry, GameState};

/// Options for the `simulate` command.
#[derive(Debug)]
struct SimulateArgs {
    ticks: u64,
    seed: String,
    content: Option<PathBuf>,
    config: Option<PathBuf>,
    save_dir: Option<PathBuf>,
}

impl Default for SimulateArgs {
    fn default() -> Self {
        Self {
            ticks: 3600,
            seed: "wayfarer".to_string(),
            content: None,
            config: None,
            save_dir: None,
        }
    }
}

#[derive(Debug, Default)]
struct RunStats {
    combats_won: u32,
    combats_lost: u32,
    claims: u32,
    festivals_ended: u32,
}

fn print_help() {
    println!("Wayfarer - idle strategy simulation\n");
    println!("Usage: wayfarer <command> [options]\n");
    println!("Commands:");
    println!("  simulate   Run the gameloop headless and print a summary");
    println!("  --version  Show version information");
    println!("  --help     Show this help message\n");
    println!("Simulate options:");
    println!("  -t, --ticks <N>        Ticks to simulate (default 3600)");
    println!("  -s, --seed <SEED>      Game id for a new game (default \"wayfarer\")");
    println!("  -c, --content <PATH>   Content pack JSON (default: bundled)");
    println!("      --config <PATH>    Engine config JSON");
    println!("      --save <DIR>       Persist to DIR and resume from it");
}

fn parse_simulate_args(args: &[String]) -> Result<SimulateArgs, String> {
    let mut parsed = SimulateArgs::default();
    let mut iter = args.iter();
    while let Some(flag) = iter.next() {
        let mut value = || {
            iter.next()
                .cloned()
                .ok_or_else(|| format!("{flag} needs a value"))
        };
        match flag.as_str() {
            "-t" | "--ticks" => {
                let raw = value()?;
                parsed.ticks = raw
                    .parse()
                    .map_err(|_| format!("invalid tick count: {raw}"))?;
            }
            "-s" | "--seed" => parsed.seed = value()?,
            "-c" | "--content" => parsed.content = Some(PathBuf::from(value()?)),
            "--config" => parsed.config = Some(PathBuf::from(value()?)),
            "--save" => parsed.save_dir = Some(PathBuf::from(value()?)),
            other => return Err(format!("unknown option: {other}")),
        }
    }
    Ok(parsed)
}

fn simulate(args: &SimulateArgs) -> wayfarer::Result<()> {
    let content = match &args.content {
        Some(path) => ContentRegistry::from_file(path)?,
        None => ContentRegistry::bundled()?,
    };
    tracing::info!("loaded {} content entries", content.len());

    let config = match &args.config {
        Some(path) => EngineConfig::from_file(path)?,
        None => EngineConfig::default(),
    };

    let mut store = match &args.save_dir {
        Some(dir) => GameStore::new(Box::new(FileAdapter::at(dir)?)),
        None => GameStore::in_memory(),
    };
    if store.load(&content)? && store.get().meta.is_setup {
        tracing::info!(
            "resuming game {} at tick {}",
            store.get().meta.game_id,
            store.get().now()
        );
    } else {
        store.replace(setup_new_game(&content, &config.world, &args.seed)?);
        tracing::info!("started new game {}", args.seed);
    }

    let mut gameloop = Gameloop::new(config.gameloop.clone());
    // One elapsed second per tick so the batch sizes are exact
    gameloop.options.tick_multiplier = 1.0;

    let mut stats = RunStats::default();
    let mut remaining = args.ticks;
    while remaining > 0 {
        let batch = remaining.min(MAX_TICKS_PER_ADVANCE);
        let Some(result) = gameloop.advance(&mut store, &content, batch as f64)? else {
            tracing::warn!("gameloop refused to advance, stopping early");
            break;
        };
        for event in &result.events {
            match event {
                TickEvent::CombatEnded {
                    outcome: CombatOutcome::Victory,
                    ..
                } => stats.combats_won += 1,
                TickEvent::CombatEnded {
                    outcome: CombatOutcome::Defeat,
                    ..
                } => stats.combats_lost += 1,
                TickEvent::Claimed { .. } => stats.claims += 1,
                TickEvent::FestivalEnded(_) => stats.festivals_ended += 1,
                _ => {}
            }
        }
        remaining = remaining.saturating_sub(result.ticks);
    }

    if args.save_dir.is_some() {
        store.save()?;
    }
    let notifications = store.update(|state| state.drain_notifications());
    print_summary(store.get(), &stats);
    for notification in notifications.iter().rev().take(10).rev() {
        println!("  [{:?}] {}", notification.kind, notification.message);
    }
    Ok(())
}

fn print_summary(state: &GameState, stats: &RunStats) {
    println!("Game {} at tick {}", state.meta.game_id, state.now());
    println!("Status: {}", state.hero.status_message);
    println!();
    println!("Party:");
    for hero in &state.hero.heroes {
        println!(
            "  {:<10} {:<8} level {:>3}  hp {:>7.1}/{:<7.1}",
            hero.name,
            hero.job_id,
            hero.level,
            hero.hp,
            hero.max_hp()
        );
    }
    println!();
    println!("Currency:");
    for (currency, amount) in state.currency.iter() {
        println!("  {:<13} {:>12.1}", currency.name(), amount);
    }
    println!();
    println!("Claimed locations:");
    for node_type in LocationType::all() {
        println!(
            "  {:<8} {:>3}/{:<3}",
            node_type.name(),
            state.world.claimed_count(node_type),
            state.world.node_count(node_type)
        );
    }
    println!();
    println!(
        "Combats won {}, lost {}; claims {}; festivals ended {}",
        stats.combats_won, stats.combats_lost, stats.claims, stats.festivals_ended
    );
    println!(
        "Inventory: {} items, {} skills; riftglow {}",
        state.inventory.items.len(),
        state.inventory.skills.len(),
        state.riftglow.amount
    );
    if state.meta.has_won {
        println!("The world has been conquered.");
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("wayfarer=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    let Some(command) = args.get(1) else {
        print_help();
        return ExitCode::SUCCESS;
    };

    match command.as_str() {
        "simulate" => {
            let parsed = match parse_simulate_args(&args[2..]) {
                Ok(parsed) => parsed,
                Err(message) => {
                    eprintln!("{message}");
                    eprintln!("Run 'wayfarer --help' for usage.");
                    return ExitCode::FAILURE;
                }
            };
            match simulate(&parsed) {
                Ok(()) => ExitCode::SUCCESS,
                Err(e) => {
                    tracing::error!("simulation failed: {e}");
                    ExitCode::FAILURE
                }
            }
        }
        "--version" | "-v" => {
            println!("{}", build_info::version_line());
            ExitCode::SUCCESS
        }
        "--help" | "-h" => {
            print_help();
            ExitCode::SUCCESS
        }
        other => {
            eprintln!("Unknown command: {other}");
            eprintln!("Run 'wayfarer --help' for usage.");
            ExitCode::FAILURE
        }
    }
}
