//! Noise generators.
//!
//! Both generators follow the same pattern: a default constructor using the
//! thread-local RNG, and a `with_rng` constructor for deterministic output
//! in tests or for running on threads without a `ThreadRng`.

mod pink;
mod white;

pub use pink::PinkNoise;
pub use white::WhiteNoise;
