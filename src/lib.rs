//! Overtone - real-time-safe DSP building blocks for audio synthesis and
//! analysis.
//!
//! Everything here is designed to run on an audio thread with a hard
//! deadline: no allocation, no locking, and no surprises after setup.
//! Buffers are sized at construction (optionally out of a fixed-budget
//! [`arena::Arena`]), lookup tables are built once, and the per-sample
//! paths are plain arithmetic.
//!
//! The crate splits into two halves:
//!
//! - **Synthesis**: the bandlimited [`oscillators`] family (wavetable,
//!   polyBLEP, and minBLEP variants), [`noise`] generators, and the
//!   spiking [`neuron`] oscillator, all producing samples through the
//!   [`Signal`] trait.
//! - **Analysis**: envelope, power, and block-energy trackers, an attack
//!   detector, and the SNAC pitch pipeline, under [`analysis`].
//!
//! # Examples
//!
//! ```
//! use overtone::{Signal, oscillators::{Oscillator, Saw}};
//!
//! let mut osc = Saw::new(440.0, 48_000.0);
//! let mut block = [0.0f32; 64];
//! osc.process(&mut block);
//! osc.set_frequency(880.0);
//! ```
//!
//! Threading: a single instance is meant to be owned and ticked by one
//! thread. Parameter setters are cheap, but the crate provides no internal
//! synchronization; sharing an instance across threads is the caller's
//! problem to arrange.

pub mod analysis;
pub mod arena;
pub mod error;
pub mod filters;
pub mod math;
pub mod neuron;
pub mod noise;
pub mod oscillators;
pub mod ring;
mod signal;
pub mod tables;

pub use error::{Error, Result};
pub use signal::Signal;
