// Per-history random number streams.
//
// PCG-LCG generator (the same recurrence OpenMC uses) with O(log n)
// skip-ahead. Every history gets its own stream by jumping the master seed
// forward by `history * STREAM_STRIDE` draws, so concurrent workers never
// share or interleave random state and a history replays identically no
// matter which thread runs it.

use rand::{RngCore, SeedableRng};

/// LCG multiplier
const PRN_MULT: u64 = 6364136223846793005;
/// LCG additive constant
const PRN_ADD: u64 = 1442695040888963407;
/// Number of draws reserved for each history.
pub const STREAM_STRIDE: u64 = 152917;

/// Jump an LCG seed `n` steps ahead without generating the draws.
pub fn future_seed(mut n: u64, seed: u64) -> u64 {
    let mut g = PRN_MULT;
    let mut c = PRN_ADD;
    let mut g_new: u64 = 1;
    let mut c_new: u64 = 0;

    while n > 0 {
        if n & 1 == 1 {
            g_new = g_new.wrapping_mul(g);
            c_new = c_new.wrapping_mul(g).wrapping_add(c);
        }
        c = g.wrapping_add(1).wrapping_mul(c);
        g = g.wrapping_mul(g);
        n >>= 1;
    }

    g_new.wrapping_mul(seed).wrapping_add(c_new)
}

/// Small, copyable PCG-LCG generator.
///
/// Reference: Melissa E. O'Neill, "PCG: A Family of Simple Fast Space-Efficient
/// Statistically Good Algorithms for Random Number Generation"
#[derive(Clone, Copy, Debug)]
pub struct FastRng {
    seed: u64,
}

impl FastRng {
    #[inline]
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Independent stream for one particle history.
    #[inline]
    pub fn for_history(master_seed: u64, history: u64) -> Self {
        Self::new(future_seed(history.wrapping_mul(STREAM_STRIDE), master_seed))
    }

    /// Generate a random f64 in [0, 1)
    #[inline(always)]
    pub fn random(&mut self) -> f64 {
        (self.next_word() as f64) * 5.421010862427522e-20
    }

    /// Skip `n` draws ahead.
    #[inline]
    pub fn advance(&mut self, n: u64) {
        self.seed = future_seed(n, self.seed);
    }

    #[inline]
    pub fn reseed(&mut self, seed: u64) {
        self.seed = seed;
    }

    #[inline(always)]
    fn next_word(&mut self) -> u64 {
        self.seed = PRN_MULT.wrapping_mul(self.seed).wrapping_add(PRN_ADD);

        // RXS-M-XS output permutation
        let word = ((self.seed >> ((self.seed >> 59) + 5)) ^ self.seed)
            .wrapping_mul(12605985483714917081);
        (word >> 43) ^ word
    }
}

impl SeedableRng for FastRng {
    type Seed = [u8; 8];

    fn from_seed(seed: Self::Seed) -> Self {
        Self {
            seed: u64::from_le_bytes(seed),
        }
    }
}

impl RngCore for FastRng {
    #[inline(always)]
    fn next_u32(&mut self) -> u32 {
        self.next_u64() as u32
    }

    #[inline(always)]
    fn next_u64(&mut self) -> u64 {
        self.next_word()
    }

    #[inline]
    fn fill_bytes(&mut self, dest: &mut [u8]) {
        let mut left = dest;
        while left.len() >= 8 {
            let bytes = self.next_u64().to_le_bytes();
            left[..8].copy_from_slice(&bytes);
            left = &mut left[8..];
        }
        if !left.is_empty() {
            let bytes = self.next_u64().to_le_bytes();
            left.copy_from_slice(&bytes[..left.len()]);
        }
    }

    #[inline]
    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_fast_rng_deterministic() {
        let mut rng1 = FastRng::new(12345);
        let mut rng2 = FastRng::new(12345);

        for _ in 0..100 {
            assert_eq!(rng1.random(), rng2.random());
        }
    }

    #[test]
    fn test_fast_rng_range() {
        let mut rng = FastRng::new(42);

        for _ in 0..10000 {
            let val = rng.random();
            assert!((0.0..1.0).contains(&val), "Value {} out of range [0, 1)", val);
        }
    }

    #[test]
    fn test_fast_rng_as_rand_rng() {
        let mut rng = FastRng::new(12345);

        let x: f64 = rng.gen();
        assert!((0.0..1.0).contains(&x));
        let _: u32 = rng.gen();
        let _: bool = rng.gen();
    }

    #[test]
    fn test_advance_matches_sequential_draws() {
        let mut stepped = FastRng::new(7);
        for _ in 0..1000 {
            stepped.random();
        }

        let mut jumped = FastRng::new(7);
        jumped.advance(1000);

        assert_eq!(stepped.random(), jumped.random());
    }

    #[test]
    fn test_history_streams_are_offset_by_stride() {
        let mut first = FastRng::for_history(1, 0);
        first.advance(STREAM_STRIDE);
        let mut second = FastRng::for_history(1, 1);
        assert_eq!(first.random(), second.random());

        let mut a = FastRng::for_history(1, 3);
        let mut b = FastRng::for_history(1, 4);
        assert_ne!(a.random(), b.random());
    }

    #[test]
    fn test_fast_rng_reseed() {
        let mut rng = FastRng::new(12345);
        let first_val = rng.random();

        for _ in 0..100 {
            rng.random();
        }

        rng.reseed(12345);
        assert_eq!(rng.random(), first_val);
    }
}
