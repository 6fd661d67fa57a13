//! Seeded 2D noise oracle.
//!
//! Every execution context builds its own oracle from the seed string; the
//! same seed always reproduces the same samples.

use noise::{NoiseFn, OpenSimplex};

/// Deterministic 2D noise in `[-1, 1]`.
pub struct NoiseOracle {
    seed: String,
    simplex: OpenSimplex,
}

impl NoiseOracle {
    pub fn new(seed: &str) -> Self {
        Self {
            seed: seed.to_string(),
            simplex: OpenSimplex::new(seed_hash(seed)),
        }
    }

    pub fn seed(&self) -> &str {
        &self.seed
    }

    /// Raw sample at `(x, z)`.
    pub fn noise2d(&self, x: f32, z: f32) -> f32 {
        (self.simplex.get([x as f64, z as f64]) as f32).clamp(-1.0, 1.0)
    }

    /// Sample at `(x / scale + offset, z / scale + offset)`.
    pub fn sample(&self, x: f32, z: f32, scale: f32, offset: f32) -> f32 {
        self.noise2d(x / scale + offset, z / scale + offset)
    }
}

impl std::fmt::Debug for NoiseOracle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NoiseOracle").field("seed", &self.seed).finish()
    }
}

/// FNV-1a hash of the seed string, used to seed noise and RNG.
pub fn seed_hash(seed: &str) -> u32 {
    let mut h: u32 = 0x811c9dc5;
    for byte in seed.bytes() {
        h ^= byte as u32;
        h = h.wrapping_mul(0x01000193);
    }
    h
}
