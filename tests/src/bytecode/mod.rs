mod catalog;
mod detection;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Deterministic pseudo-random bytecode of up to `max_len` bytes.
pub(crate) fn random_bytecode(seed: u64, max_len: usize) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    let len = rng.random_range(0..=max_len);
    (0..len).map(|_| rng.random::<u8>()).collect()
}
