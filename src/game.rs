use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::style::Color;
use log::info;

use crate::config::GameConfig;
use crate::coords::Coords;
use crate::simulation::{Renderer, SimState, Simulation, Termination};
use crate::snake::{Direction::*, KeyBindings, Snake};
use crate::term::TermManager;

const DEAD_SNAKE_CHAR: char = 'X';
const ORANGE: Color = Color::Rgb { r: 255, g: 165, b: 0 };

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RoundEnd {
    Finished,
    Quit,
}

pub struct SnakeGame {
    config: GameConfig,
    term: TermManager,
}

impl SnakeGame {
    pub fn new(config: GameConfig) -> Result<Self> {
        config.validate()?;
        let term = TermManager::new(&config)?;
        Ok(SnakeGame { config, term })
    }

    pub fn initialize(&mut self) -> Result<()> {
        self.term.setup()
    }

    pub fn restore(&mut self) -> Result<()> {
        self.term.restore()
    }

    pub fn show_intro(&mut self) -> Result<RoundEnd> {
        let lines = &[
            "Player 1 (orange): arrow keys",
            "Player 2 (blue): WASD",
            "CTRL+C to quit",
            "",
            "Press any key to begin"
        ];

        self.term.present()?;
        self.term.show_message(lines)?;

        if is_ctrl_c(&self.term.read_key_blocking()?) {
            return Ok(RoundEnd::Quit);
        }

        self.term.hide_message()?;
        Ok(RoundEnd::Finished)
    }

    /// Plays one round on a fresh simulation.
    ///
    /// Ticks fire every `tick_interval_ms`; keys are forwarded in between. Once the
    /// round is over neither ticks nor keys reach the simulation again.
    pub fn play(&mut self) -> Result<RoundEnd> {
        // Drop the last frame of the previous round before the board shows again
        Renderer::clear(&mut self.term);
        self.term.hide_message()?;

        let mut sim = Simulation::new(&self.config, starting_roster(&self.config));
        let interval = self.config.tick_interval();
        let mut next_tick = Instant::now() + interval;
        info!("round started on a {}x{} board", self.config.width, self.config.height);

        let reason = loop {
            let timeout = next_tick.saturating_duration_since(Instant::now());

            for key_ev in self.term.read_key_events(timeout)? {
                if is_ctrl_c(&key_ev) {
                    return Ok(RoundEnd::Quit);
                }
                sim.handle_key(key_ev.code);
            }

            if Instant::now() < next_tick { continue; }
            next_tick += interval;

            match sim.tick(&mut self.term) {
                SimState::Running => self.term.present()?,
                SimState::Terminated(reason) => break reason,
            }
        };

        self.game_over(&sim, reason)?;

        // Keys mashed during the final frames should not skip the game over screen
        self.term.read_key_events(Duration::from_millis(0))?;

        // Quit if the user CTRL+C's after the game
        if is_ctrl_c(&self.term.read_key_blocking()?) {
            return Ok(RoundEnd::Quit);
        }

        Ok(RoundEnd::Finished)
    }

    ///////////////////////////////////////////////////////////////////////////

    fn game_over(&mut self, sim: &Simulation, reason: Termination) -> Result<()> {
        let culprit = match reason {
            Termination::WallCollision { snake }
            | Termination::SelfCollision { snake }
            | Termination::SnakeCollision { snake, .. } => snake,
        };

        if let Some(snake) = sim.snakes().get(culprit) {
            self.term.mark_cells(snake.body().iter().copied(), DEAD_SNAKE_CHAR)?;
        }

        let headline = format!("{}!", reason);
        let lengths = sim.snakes().iter()
            .map(|snake| snake.len().to_string())
            .collect::<Vec<_>>()
            .join(" / ");
        self.term.show_message(&[
            "Game over!",
            headline.as_str(),
            &*format!("Lasted {} ticks, lengths {}", sim.ticks(), lengths),
            "",
            "Press any key to play again,",
            "or CTRL+C to quit."
        ])
    }
}

/// Player 1 on the arrows from the top left, player 2 on WASD from lower right.
pub fn starting_roster(config: &GameConfig) -> Vec<Snake> {
    let second = Coords::new((config.width - 2).min(18), (config.height - 2).min(18));

    vec![
        Snake::new(Coords::new(2, 2), Right, KeyBindings::arrows(), ORANGE),
        Snake::new(second, Left, KeyBindings::wasd(), Color::Blue),
    ]
}

fn is_ctrl_c(ev: &KeyEvent) -> bool {
    ev.code == KeyCode::Char('c') && ev.modifiers.contains(KeyModifiers::CONTROL)
}
