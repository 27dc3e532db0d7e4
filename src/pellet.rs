use rand::Rng;

use crate::coords::Coords;

/// A food item sitting on one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pellet {
    coords: Coords,
}

impl Pellet {
    pub fn new(coords: Coords) -> Self {
        Pellet { coords }
    }

    pub fn random<R: Rng + ?Sized>(rng: &mut R, width: i32, height: i32) -> Self {
        Pellet::new(Coords::random_interior(rng, width, height))
    }

    pub fn coords(&self) -> Coords {
        self.coords
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn equality_follows_coords() {
        assert_eq!(Pellet::new(Coords::new(3, 4)), Pellet::new(Coords::new(3, 4)));
        assert_ne!(Pellet::new(Coords::new(3, 4)), Pellet::new(Coords::new(4, 3)));
    }

    #[test]
    fn random_pellet_is_on_the_board() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..100 {
            let p = Pellet::random(&mut rng, 10, 10);
            assert!(!p.coords().is_out_of_bounds(10, 10));
        }
    }
}
