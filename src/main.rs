use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use std::path::PathBuf;

use ticket_check::simulation::{
    AutoPlayer, CheckOutcome, GameSession, LevelDatabase, SessionConfig, ValidatorConfig,
};

#[derive(Parser)]
#[command(name = "ticket_check")]
#[command(about = "Headless cinema ticket-checking shift")]
struct Cli {
    /// Level database JSON file (built-in campaign when omitted)
    #[arg(long)]
    levels: Option<PathBuf>,

    /// Index of the level to play
    #[arg(long, default_value = "0")]
    level: usize,

    /// Seed for ticket queues and the scripted player
    #[arg(long)]
    seed: Option<u64>,

    /// Real seconds per tick
    #[arg(long, default_value = "0.05")]
    delta: f32,

    /// Give up after this many ticks
    #[arg(long, default_value = "100000")]
    max_ticks: u32,

    /// Probability that the scripted player decides wrongly
    #[arg(long, default_value = "0.1")]
    mistake_rate: f64,

    /// Real seconds the scripted player looks at a ticket
    #[arg(long, default_value = "0.3")]
    reaction_time: f32,

    /// Income lost for admitting an invalid ticket
    #[arg(long, default_value = "10")]
    penalty_invalid: i32,

    /// Income lost for admitting a ticket too early
    #[arg(long, default_value = "5")]
    penalty_early: i32,

    /// Print the level database as JSON and exit
    #[arg(long)]
    dump_levels: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("warn,ticket_check=info"),
    )
    .init();

    let cli = Cli::parse();

    let levels = match &cli.levels {
        Some(path) => LevelDatabase::load(path)?,
        None => LevelDatabase::builtin(),
    };

    if cli.dump_levels {
        println!("{}", levels.to_json_pretty()?);
        return Ok(());
    }

    let level = levels
        .level(cli.level)
        .with_context(|| format!("Level {} not found ({} levels)", cli.level, levels.len()))?;
    for warning in level.validate() {
        warn!("{}", warning);
    }

    run_headless(levels, &cli);
    Ok(())
}

/// Play one level with the scripted player
fn run_headless(levels: LevelDatabase, cli: &Cli) {
    let config = SessionConfig {
        level_index: cli.level,
        seed: cli.seed,
        validator: ValidatorConfig {
            penalty_invalid: cli.penalty_invalid,
            penalty_early: cli.penalty_early,
            ..ValidatorConfig::default()
        },
        ..SessionConfig::default()
    };

    let mut session = GameSession::new(levels, config);
    let mut player = match cli.seed {
        Some(seed) => AutoPlayer::new_with_seed(cli.reaction_time, cli.mistake_rate, seed),
        None => AutoPlayer::new(cli.reaction_time, cli.mistake_rate),
    };

    let delta = if cli.delta > 0.0 { cli.delta } else { 0.05 };
    // Log a status line once per real second of play
    let ticks_per_second = (1.0 / delta).ceil().max(1.0) as u32;

    session.start();
    info!("Initial state: {}", session.summary());

    let mut tick = 0;
    while tick < cli.max_ticks && !session.is_finished() {
        tick += 1;
        if let Some(decision) = player.update(&session, delta) {
            session.submit(decision);
        }
        session.tick(delta);

        if tick % ticks_per_second == 0 {
            info!("--- After tick {} ({:.1}s) --- {}", tick, tick as f32 * delta, session.summary());
        }
    }

    if !session.is_finished() {
        warn!("Stopped after {} ticks before the level finished", tick);
    }

    let stats = session.controller().stats();
    info!("=== SHIFT COMPLETE ===");
    info!("Level: {}", session.level().map(|l| l.name.as_str()).unwrap_or("<missing>"));
    info!("Final clock: {}", session.clock().current_game_time());
    info!("Final income: {}", session.economy().income());
    for outcome in CheckOutcome::ALL {
        info!("{:?}: {}", outcome, stats.count(outcome));
    }
    info!("Tickets missed: {}", stats.tickets_missed);
    info!("Shows on time: {}", stats.shows_on_time);
    info!("Accuracy: {:.1}%", stats.accuracy());
    match session.completion() {
        Some(done) => {
            info!("Stars: {}", done.stars);
            info!("Coins awarded: {}", done.coins_awarded);
        }
        None => info!("Stars: {}", session.economy().star_rating()),
    }
}
