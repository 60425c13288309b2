//! Amplitude, transient, and pitch analysis.
//!
//! Per-sample trackers ([`EnvelopeFollower`], [`PowerFollower`]) smooth a
//! raw sample stream into an amplitude or energy signal. Block processors
//! ([`BlockEnergy`], [`AttackDetector`]) work on whole buffers at a time.
//! At the top sits the pitch pipeline: [`Snac`] estimates the period of a
//! windowed frame by normalized autocorrelation, and [`PeriodDetector`]
//! runs it over a sliding window of the live input, rate-limiting the
//! estimate so single noisy frames cannot yank the pitch around.

mod attack;
mod energy;
mod envelope;
mod period;
mod power;
mod snac;

pub use attack::AttackDetector;
pub use energy::BlockEnergy;
pub use envelope::EnvelopeFollower;
pub use period::PeriodDetector;
pub use power::PowerFollower;
pub use snac::{Snac, SNAC_FRAME_SIZE};
