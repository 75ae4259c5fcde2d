//! Dominion - headless simulation runner
//!
//! Generates a world, places the player, and lets the AI nations play out a
//! number of in-game minutes. With `--autoplay` the player expands whenever it
//! can afford to and sues for peace when outnumbered.

use std::path::PathBuf;

use clap::Parser;
use dominion::core::error::Result;
use dominion::core::types::Owner;
use dominion::game::{Command, TruceDuration};
use dominion::{Game, GameConfig};

#[derive(Parser, Debug)]
#[command(name = "dominion")]
#[command(about = "Run a headless Dominion game and report the outcome")]
struct Args {
    /// Random seed for the world and every roll after it
    #[arg(long, default_value_t = 12345)]
    seed: u64,

    /// In-game minutes to simulate
    #[arg(long, default_value_t = 10)]
    minutes: u64,

    /// Override the number of AI nations
    #[arg(long)]
    nations: Option<usize>,

    /// TOML config file (defaults apply for missing keys)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the final snapshot as JSON here
    #[arg(long)]
    output: Option<PathBuf>,

    /// Let a simple policy play the human side
    #[arg(long)]
    autoplay: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("dominion=info")),
        )
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };
    config.world.seed = args.seed;
    if let Some(n) = args.nations {
        config.nations.ai_count = n;
    }

    let mut game = Game::seeded(config, args.seed)?;
    if let Err(e) = game.start(None) {
        tracing::error!("could not start: {}", e);
        return Ok(());
    }

    let until = args.minutes * 60_000;
    let step = game.config().schedule.turn_ms;
    while game.now() < until {
        game.advance(step.min(until - game.now()));
        if args.autoplay {
            autoplay(&mut game);
        }
    }

    let problems = game.invariant_violations();
    if !problems.is_empty() {
        for p in &problems {
            tracing::error!("{}", p);
        }
    }

    let snapshot = game.snapshot();
    println!("{}", snapshot.summary());
    println!("\nRecent events:");
    for line in &snapshot.recent_events {
        println!("  {}", line);
    }

    if let Some(path) = &args.output {
        std::fs::write(path, snapshot.to_json())?;
        tracing::info!(path = %path.display(), "snapshot written");
    }

    Ok(())
}

/// One decision per turn for the human side
fn autoplay(game: &mut Game) {
    let enemies: Vec<Owner> = game.world().player.relations.wars.clone();
    let player_military = game.world().player.military;

    for enemy in enemies {
        let Some(id) = enemy.nation() else { continue };
        let stronger = game.world().military(enemy).map_or(false, |m| m > player_military);
        if stronger && game.truces().pending_between(Owner::Player, enemy).is_none() {
            if let Err(e) = game.apply(Command::ProposeTruce {
                target: id,
                duration: TruceDuration::Turns(10),
                terms: None,
            }) {
                tracing::debug!("autoplay truce skipped: {}", e);
            }
            return;
        }
    }

    let stats = game.expansion_stats();
    if game.world().player.money >= stats.next_expansion_cost * 2 {
        if let Some(t) = game.world().map.expandable_for(Owner::Player).first().copied() {
            if let Err(e) = game.apply(Command::Expand(t)) {
                tracing::debug!("autoplay expansion skipped: {}", e);
            }
        }
    }
}
