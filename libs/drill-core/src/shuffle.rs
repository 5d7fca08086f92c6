//! Session-scoped randomness.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// RNG owned by one session; seeded runs replay identically.
#[derive(Debug, Clone)]
pub struct SessionRng {
    rng: ChaCha8Rng,
}

impl SessionRng {
    /// Seeded when `seed` is given, otherwise drawn from entropy.
    pub fn new(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::seeded(seed),
            None => Self {
                rng: ChaCha8Rng::from_entropy(),
            },
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(&mut self.rng);
    }

    /// Remove and return a random element.
    pub fn take_one<T>(&mut self, items: &mut Vec<T>) -> Option<T> {
        if items.is_empty() {
            return None;
        }
        let index = self.rng.gen_range(0..items.len());
        Some(items.swap_remove(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_order() {
        let mut a: Vec<u32> = (0..20).collect();
        let mut b = a.clone();
        SessionRng::seeded(7).shuffle(&mut a);
        SessionRng::seeded(7).shuffle(&mut b);
        assert_eq!(a, b);
    }

    #[test]
    fn take_one_drains() {
        let mut rng = SessionRng::seeded(1);
        let mut items = vec![1, 2, 3];
        let mut taken = Vec::new();
        while let Some(item) = rng.take_one(&mut items) {
            taken.push(item);
        }
        taken.sort();
        assert_eq!(taken, vec![1, 2, 3]);
    }
}
