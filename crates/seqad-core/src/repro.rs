// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

const GOLDEN_GAMMA: u64 = 0x9e3779b97f4a7c15;

/// SplitMix64 generator with a stable, platform-independent stream.
#[derive(Clone, Copy, Debug)]
pub struct StableRng {
    state: u64,
}

impl StableRng {
    pub fn new(seed: u64) -> Self {
        Self {
            state: seed.wrapping_add(GOLDEN_GAMMA),
        }
    }

    pub fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(GOLDEN_GAMMA);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d049bb133111eb);
        z ^ (z >> 31)
    }

    /// Uniform draw from `[0, 1)` using the top 53 bits.
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// `len` uniform draws from `[0, 1)`.
    pub fn uniform_vec(&mut self, len: usize) -> Vec<f64> {
        (0..len).map(|_| self.next_f64()).collect()
    }
}

/// Derives a child seed from a base seed and a path of indices.
pub fn derive_seed(base: u64, path: &[u64]) -> u64 {
    path.iter().fold(base, |acc, &part| {
        let mut rng = StableRng::new(acc ^ part.wrapping_mul(GOLDEN_GAMMA));
        rng.next_u64()
    })
}
