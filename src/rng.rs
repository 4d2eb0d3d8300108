//! Single source of randomness for a game session.

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

pub type GameRng = ChaCha8Rng;

pub fn seeded(seed: u64) -> GameRng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Fresh seed from the OS, returned so the caller can log and replay it.
pub fn entropy_seed() -> u64 {
    rand::thread_rng().next_u64()
}
