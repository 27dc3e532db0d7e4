use std::collections::{HashMap, VecDeque};

use crossterm::event::KeyCode;
use crossterm::style::Color;

use crate::coords::Coords;
use crate::pellet::Pellet;
use Direction::*;

/// Tail segments kept per pellet eaten.
pub const GROWTH_PER_PELLET: u32 = 2;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right
}

impl Direction {
    pub fn opposite(&self) -> Direction {
        match self {
            Up => Down,
            Down => Up,
            Left => Right,
            Right => Left,
        }
    }
}

/// Which key turns a snake which way.
#[derive(Debug, Clone, Default)]
pub struct KeyBindings {
    map: HashMap<KeyCode, Direction>,
}

impl KeyBindings {
    pub fn new<I: IntoIterator<Item = (KeyCode, Direction)>>(bindings: I) -> Self {
        KeyBindings { map: bindings.into_iter().collect() }
    }

    pub fn arrows() -> Self {
        KeyBindings::new(vec![
            (KeyCode::Left, Left),
            (KeyCode::Right, Right),
            (KeyCode::Up, Up),
            (KeyCode::Down, Down),
        ])
    }

    pub fn wasd() -> Self {
        KeyBindings::new(vec![
            (KeyCode::Char('a'), Left),
            (KeyCode::Char('d'), Right),
            (KeyCode::Char('w'), Up),
            (KeyCode::Char('s'), Down),
        ])
    }

    pub fn direction_for(&self, key: KeyCode) -> Option<Direction> {
        self.map.get(&key).copied()
    }
}

#[derive(Debug, Clone)]
pub struct Snake {
    body: VecDeque<Coords>, // head first
    direction: Direction,
    growth: u32,
    turned_this_tick: bool,
    bindings: KeyBindings,
    color: Color,
}

impl Snake {
    pub fn new(start: Coords, direction: Direction, bindings: KeyBindings, color: Color) -> Self {
        let mut body = VecDeque::new();
        body.push_back(start);
        Snake { body, direction, growth: 0, turned_this_tick: false, bindings, color }
    }

    pub fn body(&self) -> &VecDeque<Coords> {
        &self.body
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn head(&self) -> Coords {
        self.body[0]
    }

    #[cfg(test)]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    #[cfg(test)]
    pub fn growth(&self) -> u32 {
        self.growth
    }

    pub fn color(&self) -> Color {
        self.color
    }

    #[cfg(test)]
    pub fn bindings(&self) -> &KeyBindings {
        &self.bindings
    }

    pub fn contains(&self, pos: Coords) -> bool {
        self.body.contains(&pos)
    }

    pub fn handle_key(&mut self, key: KeyCode) {
        if let Some(dir) = self.bindings.direction_for(key) {
            self.request_direction(dir);
        }
    }

    /// Only the first acceptable turn of a tick sticks, and never a U-turn:
    /// two quick presses would otherwise fold the head back into the neck.
    pub fn request_direction(&mut self, new_direction: Direction) -> bool {
        if self.turned_this_tick || new_direction == self.direction.opposite() {
            return false;
        }

        self.direction = new_direction;
        self.turned_this_tick = true;
        true
    }

    pub fn advance(&mut self) {
        let new_head = self.head().step(self.direction);
        self.body.push_front(new_head);
    }

    /// Must follow every `advance`. Keeps the tail while growth credit lasts.
    pub fn trim_tail(&mut self) {
        if self.growth == 0 {
            self.body.pop_back();
        } else {
            self.growth -= 1;
        }
    }

    pub fn grow(&mut self) {
        self.growth += GROWTH_PER_PELLET;
    }

    pub fn has_self_collision(&self) -> bool {
        let head = self.head();
        self.body.iter().skip(1).any(|part| *part == head)
    }

    pub fn is_out_of_bounds(&self, width: i32, height: i32) -> bool {
        self.head().is_out_of_bounds(width, height)
    }

    pub fn consumed_food(&self, food: &[Pellet]) -> Option<Pellet> {
        let head = self.head();
        food.iter().find(|pellet| pellet.coords() == head).copied()
    }

    pub fn end_tick(&mut self) {
        self.turned_this_tick = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snake_at(x: i32, y: i32, direction: Direction) -> Snake {
        Snake::new(Coords::new(x, y), direction, KeyBindings::arrows(), Color::Yellow)
    }

    fn step(snake: &mut Snake) {
        snake.advance();
        snake.trim_tail();
        snake.end_tick();
    }

    #[test]
    fn opposite_directions() {
        assert_eq!(Up.opposite(), Down);
        assert_eq!(Down.opposite(), Up);
        assert_eq!(Left.opposite(), Right);
        assert_eq!(Right.opposite(), Left);
    }

    #[test]
    fn reversal_is_refused() {
        let mut snake = snake_at(5, 5, Right);
        assert!(!snake.request_direction(Left));
        assert_eq!(snake.direction(), Right);

        assert!(snake.request_direction(Up));
        assert_eq!(snake.direction(), Up);
    }

    #[test]
    fn one_turn_per_tick() {
        let mut snake = snake_at(5, 5, Right);
        assert!(snake.request_direction(Up));
        assert!(!snake.request_direction(Left));
        assert_eq!(snake.direction(), Up);

        snake.end_tick();
        assert!(snake.request_direction(Left));
        assert_eq!(snake.direction(), Left);
    }

    #[test]
    fn refused_reversal_does_not_take_the_lock() {
        let mut snake = snake_at(5, 5, Right);
        assert!(!snake.request_direction(Left));
        assert!(snake.request_direction(Down));
    }

    #[test]
    fn keys_follow_bindings() {
        let mut snake = Snake::new(Coords::new(5, 5), Right, KeyBindings::wasd(), Color::Blue);
        snake.handle_key(KeyCode::Up); // not bound for this snake
        assert_eq!(snake.direction(), Right);

        snake.handle_key(KeyCode::Char('w'));
        assert_eq!(snake.direction(), Up);
    }

    #[test]
    fn advance_then_trim() {
        let mut snake = snake_at(5, 5, Right);
        snake.advance();
        assert_eq!(snake.head(), Coords::new(6, 5));
        assert_eq!(snake.body().iter().copied().collect::<Vec<_>>(), vec![Coords::new(6, 5), Coords::new(5, 5)]);

        snake.trim_tail();
        assert_eq!(snake.body().iter().copied().collect::<Vec<_>>(), vec![Coords::new(6, 5)]);
    }

    #[test]
    fn growth_adds_two_segments() {
        let mut plain = snake_at(5, 5, Right);
        let mut fed = snake_at(5, 5, Right);
        fed.grow();
        assert_eq!(fed.growth(), 2);

        for _ in 0..2 {
            step(&mut plain);
            step(&mut fed);
        }
        assert_eq!(fed.len(), plain.len() + 2);
        assert_eq!(fed.growth(), 0);

        // back to constant length
        step(&mut plain);
        step(&mut fed);
        assert_eq!(fed.len(), 3);
        assert_eq!(plain.len(), 1);
    }

    #[test]
    fn eats_pellet_under_head() {
        let mut snake = snake_at(5, 5, Right);
        step(&mut snake);
        let food = vec![Pellet::new(Coords::new(1, 1)), Pellet::new(Coords::new(6, 5))];
        assert_eq!(snake.consumed_food(&food), Some(Pellet::new(Coords::new(6, 5))));
        assert_eq!(snake.consumed_food(&food[..1]), None);
    }

    #[test]
    fn detects_running_into_itself() {
        let mut snake = snake_at(5, 5, Right);
        snake.grow();
        snake.grow();
        step(&mut snake); // (6,5)
        snake.request_direction(Down);
        step(&mut snake); // (6,6)
        snake.request_direction(Left);
        step(&mut snake); // (5,6)
        assert!(!snake.has_self_collision());
        snake.request_direction(Up);
        step(&mut snake); // (5,5) is still part of the body
        assert!(snake.has_self_collision());
    }

    #[test]
    fn wall_check_uses_head() {
        let mut snake = snake_at(1, 3, Left);
        assert!(!snake.is_out_of_bounds(10, 10));
        step(&mut snake);
        assert!(snake.is_out_of_bounds(10, 10));
    }
}
