mod config;
mod coords;
mod game;
mod pellet;
mod simulation;
mod snake;
mod term;

use anyhow::Result;
use clap::Parser;
use log::info;

use config::GameConfig;
use game::{RoundEnd, SnakeGame};

/// Two-player snake in the terminal. Logs go to stderr when RUST_LOG is set.
#[derive(Parser)]
#[command(name = "duel-snake")]
#[command(version)]
struct Cli {
    /// Board columns, walls included
    #[arg(long, default_value_t = GameConfig::default().width)]
    width: i32,

    /// Board rows, walls included
    #[arg(long, default_value_t = GameConfig::default().height)]
    height: i32,

    /// Terminal characters per board cell
    #[arg(long, default_value_t = GameConfig::default().scale)]
    scale: u16,

    /// Pellets kept on the board
    #[arg(long, default_value_t = GameConfig::default().target_food_count)]
    food: usize,

    /// Milliseconds between ticks
    #[arg(long, default_value_t = GameConfig::default().tick_interval_ms)]
    tick_ms: u64,
}

impl From<Cli> for GameConfig {
    fn from(cli: Cli) -> Self {
        GameConfig {
            width: cli.width,
            height: cli.height,
            scale: cli.scale,
            target_food_count: cli.food,
            tick_interval_ms: cli.tick_ms,
        }
    }
}

fn main() -> Result<()> {
    pretty_env_logger::init();

    let config = GameConfig::from(Cli::parse());
    info!("starting with {:?}", config);

    let mut game = SnakeGame::new(config)?;
    game.initialize()?;

    let outcome = run(&mut game);
    game.restore()?;
    outcome
}

fn run(game: &mut SnakeGame) -> Result<()> {
    if game.show_intro()? == RoundEnd::Quit {
        return Ok(());
    }

    // Every round gets a fresh simulation; CTRL+C ends the session
    while game.play()? == RoundEnd::Finished {}

    Ok(())
}
