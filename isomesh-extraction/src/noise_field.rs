//! Seeded simplex noise field
//!
//! A seed string is hashed into a reproducible pseudo-random generator, and
//! the generator picks the permutation seed of a 3D simplex noise function.
//! Re-creating a field from the same seed string always gives bit-identical
//! samples, so repeated rebuilds of a surface never flicker.

use isomesh_core::ScalarField;
use noise::{NoiseFn, Simplex};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Seed used when the caller does not pick one
pub const DEFAULT_SEED: &str = "seed";

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Stable 64-bit FNV-1a hash of the seed bytes
fn hash_seed(seed: &str) -> u64 {
    seed.bytes().fold(FNV_OFFSET_BASIS, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(FNV_PRIME)
    })
}

/// 3D simplex noise with values in roughly [-1, 1]
#[derive(Debug, Clone)]
pub struct NoiseField {
    seed: u32,
    simplex: Simplex,
}

impl NoiseField {
    /// Build the field for a seed string
    pub fn new(seed: &str) -> Self {
        let mut rng = StdRng::seed_from_u64(hash_seed(seed));
        Self::from_seed(rng.gen())
    }

    /// Build the field directly from a numeric permutation seed
    pub fn from_seed(seed: u32) -> Self {
        Self {
            seed,
            simplex: Simplex::new(seed),
        }
    }

    /// The permutation seed of the underlying noise function
    pub fn seed(&self) -> u32 {
        self.seed
    }
}

impl Default for NoiseField {
    fn default() -> Self {
        Self::new(DEFAULT_SEED)
    }
}

impl ScalarField for NoiseField {
    fn sample(&self, x: f64, y: f64, z: f64) -> f64 {
        self.simplex.get([x, y, z])
    }
}
