use std::fmt;

use rand::Rng;

use crate::snake::Direction;

/// A cell on the board. Column `x` grows to the right, row `y` grows downwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Coords {
    pub x: i32,
    pub y: i32,
}

impl Coords {
    pub fn new(x: i32, y: i32) -> Self {
        Coords { x, y }
    }

    /// Uniformly picks an interior cell: `x` in `[1, width)`, `y` in `[1, height)`.
    pub fn random_interior<R: Rng + ?Sized>(rng: &mut R, width: i32, height: i32) -> Self {
        Coords {
            x: rng.gen_range(1..width),
            y: rng.gen_range(1..height),
        }
    }

    /// Cells on the edge count as out of bounds, only the interior is playable.
    pub fn is_out_of_bounds(&self, width: i32, height: i32) -> bool {
        self.x <= 0 || self.x >= width || self.y <= 0 || self.y >= height
    }

    pub fn step(&self, direction: Direction) -> Self {
        match direction {
            Direction::Left => Coords::new(self.x - 1, self.y),
            Direction::Right => Coords::new(self.x + 1, self.y),
            Direction::Up => Coords::new(self.x, self.y - 1),
            Direction::Down => Coords::new(self.x, self.y + 1),
        }
    }
}

impl fmt::Display for Coords {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn edges_are_out_of_bounds() {
        let (w, h) = (30, 20);
        for y in 0..=h {
            assert!(Coords::new(0, y).is_out_of_bounds(w, h));
            assert!(Coords::new(w, y).is_out_of_bounds(w, h));
        }
        for x in 0..=w {
            assert!(Coords::new(x, 0).is_out_of_bounds(w, h));
            assert!(Coords::new(x, h).is_out_of_bounds(w, h));
        }
        assert!(Coords::new(-1, 5).is_out_of_bounds(w, h));
        assert!(Coords::new(5, h + 3).is_out_of_bounds(w, h));
    }

    #[test]
    fn interior_is_in_bounds() {
        let (w, h) = (30, 20);
        for x in 1..w {
            for y in 1..h {
                assert!(!Coords::new(x, y).is_out_of_bounds(w, h), "({}, {})", x, y);
            }
        }
    }

    #[test]
    fn random_interior_stays_inside() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            let c = Coords::random_interior(&mut rng, 5, 4);
            assert!(!c.is_out_of_bounds(5, 4), "{}", c);
        }
    }

    #[test]
    fn step_offsets_by_one() {
        let c = Coords::new(5, 5);
        assert_eq!(c.step(Direction::Left), Coords::new(4, 5));
        assert_eq!(c.step(Direction::Right), Coords::new(6, 5));
        assert_eq!(c.step(Direction::Up), Coords::new(5, 4));
        assert_eq!(c.step(Direction::Down), Coords::new(5, 6));
    }
}
