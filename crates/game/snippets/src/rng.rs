//! Randomness for snippet selection.
//!
//! Seeded selection must give the same snippet for the same seed on every
//! platform and every release, so it runs on [`SnippetRng`], a small PCG
//! stream owned by this crate. The process-wide generator from `rand` is only
//! used to draw fresh seeds ([`ThreadSeeds`]).

/// Source of seeds for random snippet selection.
pub trait SeedSource {
    /// Draw the next seed.
    fn next_seed(&mut self) -> u32;
}

/// Seeds drawn from the thread-local process RNG.
#[derive(Clone, Copy, Debug, Default)]
pub struct ThreadSeeds;

impl SeedSource for ThreadSeeds {
    fn next_seed(&mut self) -> u32 {
        rand::random()
    }
}

/// PCG random number stream (PCG-XSH-RR, 64-bit state, 32-bit output).
///
/// The seed is avalanched before it enters the state, so neighbouring or
/// small seeds (0, 1, 2, ...) start from unrelated states and the first
/// draws are already well distributed.
#[derive(Clone, Copy, Debug)]
pub struct SnippetRng {
    state: u64,
}

impl SnippetRng {
    /// PCG multiplier constant.
    const MULTIPLIER: u64 = 6364136223846793005;

    /// PCG increment constant.
    const INCREMENT: u64 = 1442695040888963407;

    /// Creates a stream from a seed.
    pub fn from_seed(seed: u64) -> Self {
        let mut rng = Self { state: 0 };
        rng.step();
        rng.state = rng.state.wrapping_add(Self::avalanche(seed));
        rng.step();
        rng
    }

    /// SplitMix64 finalizer.
    #[inline]
    fn avalanche(seed: u64) -> u64 {
        let mut hash = seed.wrapping_add(0x9e3779b97f4a7c15);
        hash ^= hash >> 30;
        hash = hash.wrapping_mul(0xbf58476d1ce4e5b9);
        hash ^= hash >> 27;
        hash = hash.wrapping_mul(0x94d049bb133111eb);
        hash ^ (hash >> 31)
    }

    /// Advance the state by one LCG step:
    /// `state' = (state * multiplier + increment) mod 2^64`
    #[inline]
    fn step(&mut self) {
        self.state = self
            .state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT);
    }

    /// XSH-RR output permutation (xorshift high, random rotate).
    #[inline]
    fn output(state: u64) -> u32 {
        let xorshifted = (((state >> 18) ^ state) >> 27) as u32;
        let rot = (state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }

    pub fn next_u32(&mut self) -> u32 {
        self.step();
        Self::output(self.state)
    }

    pub fn next_u64(&mut self) -> u64 {
        let high = u64::from(self.next_u32());
        let low = u64::from(self.next_u32());
        (high << 32) | low
    }

    /// Uniform index in `0..len`.
    ///
    /// Draws that fall in the short final bucket are rejected so every index
    /// is equally likely.
    ///
    /// # Panics
    ///
    /// Panics if `len` is zero.
    pub fn uniform_index(&mut self, len: usize) -> usize {
        assert!(len > 0, "uniform_index called with an empty range");
        let bound = len as u64;
        let threshold = bound.wrapping_neg() % bound;
        loop {
            let draw = self.next_u64();
            if draw >= threshold {
                return (draw % bound) as usize;
            }
        }
    }
}

impl SeedSource for SnippetRng {
    fn next_seed(&mut self) -> u32 {
        self.next_u32()
    }
}
