use std::fmt;

use crossterm::event::KeyCode;
use crossterm::style::Color;
use log::{debug, info, trace, warn};
use rand::{rngs::ThreadRng, seq::SliceRandom, Rng};

use crate::config::GameConfig;
use crate::coords::Coords;
use crate::pellet::Pellet;
use crate::snake::Snake;

pub const FOOD_COLOR: Color = Color::Green;

/// Random draws per pellet before falling back to scanning the free cells.
pub const MAX_PLACEMENT_ATTEMPTS: usize = 1_000;

/// Drawing surface the simulation paints each running tick on.
pub trait Renderer {
    fn clear(&mut self);
    fn draw_point(&mut self, pos: Coords, color: Color);
}

/// Why a round ended. Snakes are identified by their index in the roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    WallCollision { snake: usize },
    SelfCollision { snake: usize },
    /// `snake`'s head ran into `other`'s body.
    SnakeCollision { snake: usize, other: usize },
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Termination::WallCollision { snake } => write!(f, "Player {} hit the wall", snake + 1),
            Termination::SelfCollision { snake } => write!(f, "Player {} bit itself", snake + 1),
            Termination::SnakeCollision { snake, other } => {
                write!(f, "Player {} crashed into player {}", snake + 1, other + 1)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimState {
    Running,
    Terminated(Termination),
}

pub struct Simulation<R = ThreadRng> {
    width: i32,
    height: i32,
    target_food_count: usize,
    snakes: Vec<Snake>,
    food: Vec<Pellet>,
    state: SimState,
    ticks: u64,
    rng: R,
}

impl Simulation<ThreadRng> {
    pub fn new(config: &GameConfig, snakes: Vec<Snake>) -> Self {
        Simulation::with_rng(config, snakes, rand::thread_rng())
    }
}

impl<R: Rng> Simulation<R> {
    pub fn with_rng(config: &GameConfig, snakes: Vec<Snake>, rng: R) -> Self {
        Simulation {
            width: config.width,
            height: config.height,
            target_food_count: config.target_food_count,
            snakes,
            food: vec![],
            state: SimState::Running,
            ticks: 0,
            rng,
        }
    }

    pub fn snakes(&self) -> &[Snake] {
        &self.snakes
    }

    #[cfg(test)]
    pub fn food(&self) -> &[Pellet] {
        &self.food
    }

    pub fn is_running(&self) -> bool {
        self.state == SimState::Running
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Forwards a key to every snake. Keys arriving after the round ended are dropped.
    pub fn handle_key(&mut self, key: KeyCode) {
        if !self.is_running() {
            return;
        }

        for snake in &mut self.snakes {
            snake.handle_key(key);
        }
    }

    /// Runs one step of the round.
    ///
    /// Collisions are checked against the positions left by the previous tick,
    /// before anything moves. A crash caused by this tick's movement is therefore
    /// drawn once and only ends the round on the following tick.
    pub fn tick<D: Renderer + ?Sized>(&mut self, renderer: &mut D) -> SimState {
        if let SimState::Terminated(_) = self.state {
            return self.state;
        }

        if let Some(reason) = self.check_termination() {
            info!("round over after {} ticks: {}", self.ticks, reason);
            self.state = SimState::Terminated(reason);
            return self.state;
        }

        self.ticks += 1;
        trace!("tick {}", self.ticks);

        renderer.clear();
        for pellet in &self.food {
            renderer.draw_point(pellet.coords(), FOOD_COLOR);
        }

        self.move_snakes(renderer);
        self.replenish_food();

        self.state
    }

    /// Walls and self bites first, then every pair of snakes in roster order.
    /// A pair is checked both ways so a crash is caught whichever snake drives
    /// into the other.
    fn check_termination(&self) -> Option<Termination> {
        for (i, snake) in self.snakes.iter().enumerate() {
            if snake.has_self_collision() {
                return Some(Termination::SelfCollision { snake: i });
            }
            if snake.is_out_of_bounds(self.width, self.height) {
                return Some(Termination::WallCollision { snake: i });
            }
        }

        for i in 0..self.snakes.len() {
            for j in i + 1..self.snakes.len() {
                let (a, b) = (&self.snakes[i], &self.snakes[j]);
                if b.contains(a.head()) {
                    return Some(Termination::SnakeCollision { snake: i, other: j });
                }
                if a.contains(b.head()) {
                    return Some(Termination::SnakeCollision { snake: j, other: i });
                }
            }
        }

        None
    }

    fn move_snakes<D: Renderer + ?Sized>(&mut self, renderer: &mut D) {
        for (i, snake) in self.snakes.iter_mut().enumerate() {
            snake.advance();
            snake.trim_tail();

            for pos in snake.body() {
                renderer.draw_point(*pos, snake.color());
            }

            if let Some(eaten) = snake.consumed_food(&self.food) {
                debug!("snake {} ate the pellet at {}", i, eaten.coords());
                self.food.retain(|pellet| *pellet != eaten);
                snake.grow();
            }

            snake.end_tick();
        }
    }

    /// Tops the food back up to the target count.
    pub fn replenish_food(&mut self) {
        while self.food.len() < self.target_food_count {
            match self.place_pellet() {
                Some(pellet) => {
                    debug!("new pellet at {}", pellet.coords());
                    self.food.push(pellet);
                }
                None => {
                    warn!(
                        "no free cell left for food, holding at {} of {} pellets",
                        self.food.len(),
                        self.target_food_count
                    );
                    break;
                }
            }
        }
    }

    fn place_pellet(&mut self) -> Option<Pellet> {
        for _ in 0..MAX_PLACEMENT_ATTEMPTS {
            let candidate = Pellet::random(&mut self.rng, self.width, self.height);
            if self.is_free(candidate.coords()) {
                return Some(candidate);
            }
        }

        // Crowded board, pick straight from what is left.
        let free: Vec<Coords> = (1..self.height)
            .flat_map(|y| (1..self.width).map(move |x| Coords::new(x, y)))
            .filter(|pos| self.is_free(*pos))
            .collect();

        free.choose(&mut self.rng).copied().map(Pellet::new)
    }

    fn is_free(&self, pos: Coords) -> bool {
        !self.snakes.iter().any(|snake| snake.contains(pos))
            && !self.food.iter().any(|pellet| pellet.coords() == pos)
    }
}
