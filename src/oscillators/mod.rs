//! Bandlimited oscillators.
//!
//! Three anti-aliasing strategies live here, all behind the same
//! [`Oscillator`] trait:
//!
//! - **Wavetable**: [`WavetableOscillator`] reads a precomputed multi-octave
//!   [`crate::tables::WavetableBank`], picking less harmonically rich tables
//!   as frequency rises.
//! - **polyBLEP**: [`Saw`], [`Pulse`], and [`Tri`] generate naive waveforms
//!   and patch each discontinuity with a closed-form polynomial within one
//!   sample of the edge.
//! - **minBLEP**: [`MbSaw`], [`MbPulse`], and [`MbTriangle`] spread a
//!   precomputed causal bandlimited step over the next
//!   [`crate::tables`]-defined correction window, which also gives them
//!   hard-sync inputs and outputs.
//!
//! [`Phasor`] is the shared naive ramp, exposed for sync chaining and as a
//! modulation source.

mod mb_pulse;
mod mb_saw;
mod mb_triangle;
mod phasor;
mod pulse;
mod saw;
mod traits;
mod tri;
mod wavetable;

pub use mb_pulse::MbPulse;
pub use mb_saw::MbSaw;
pub use mb_triangle::MbTriangle;
pub use phasor::Phasor;
pub use pulse::Pulse;
pub use saw::Saw;
pub use traits::Oscillator;
pub use tri::Tri;
pub use wavetable::WavetableOscillator;

use crate::tables::{minblep_table, MINBLEP_LENGTH};

/// Two-sample polynomial correction for a unit discontinuity at phase 0.
///
/// `t` is the current phase in [0, 1), `dt` the per-sample phase increment.
/// Returns the correction to add to a naive waveform in the sample before
/// and after the edge; zero elsewhere.
#[inline]
pub(crate) fn poly_blep(t: f32, dt: f32) -> f32 {
    if dt <= 0.0 {
        return 0.0;
    }
    if t < dt {
        let x = t / dt;
        x + x - x * x - 1.0
    } else if t > 1.0 - dt {
        let x = (t - 1.0) / dt;
        x * x + x + x + 1.0
    } else {
        0.0
    }
}

/// Length of the future-correction ring used by the minBLEP oscillators.
/// Must exceed the minBLEP window so injections never lap the read head.
pub(crate) const FILLEN: usize = 256;

/// Future-correction ring shared by the minBLEP oscillators.
///
/// Each discontinuity adds a scaled copy of the step residual into the
/// upcoming samples at a fractional offset; the oscillator's tick drains one
/// correction sample per output sample.
pub(crate) struct BlepBuffer {
    f: [f32; FILLEN],
    read: usize,
}

impl BlepBuffer {
    pub(crate) fn new() -> Self {
        Self {
            f: [0.0; FILLEN],
            read: 0,
        }
    }

    /// Schedules the residual of a step of size `amp` that occurred
    /// `elapsed` samples before the current output sample (0 < elapsed <= 1).
    pub(crate) fn add_step(&mut self, elapsed: f32, amp: f32) {
        let table = minblep_table();
        for i in 0..MINBLEP_LENGTH {
            let t = elapsed + i as f32;
            if t >= MINBLEP_LENGTH as f32 {
                break;
            }
            let idx = (self.read + i) % FILLEN;
            self.f[idx] += amp * table.residual(t);
        }
    }

    /// Takes the correction for the current sample and advances.
    #[inline]
    pub(crate) fn next(&mut self) -> f32 {
        let v = self.f[self.read];
        self.f[self.read] = 0.0;
        self.read = (self.read + 1) % FILLEN;
        v
    }

    pub(crate) fn reset(&mut self) {
        self.f = [0.0; FILLEN];
        self.read = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poly_blep_is_zero_away_from_edges() {
        assert_eq!(poly_blep(0.5, 0.01), 0.0);
        assert_eq!(poly_blep(0.2, 0.01), 0.0);
    }

    #[test]
    fn test_poly_blep_continuity_at_edges() {
        let dt = 0.01;
        // Approaching the wrap from below and leaving it from above, the
        // correction endpoints meet the naive step: -1 just after the edge,
        // +1 just before it.
        assert!((poly_blep(0.0, dt) + 1.0).abs() < 1e-6);
        assert!((poly_blep(0.999_999, dt) - 1.0).abs() < 1e-3);
        // And it fades to zero at the window boundary.
        assert!(poly_blep(dt * 0.999, dt).abs() < 2e-3);
        assert!(poly_blep(1.0 - dt * 0.999, dt).abs() < 2e-3);
    }

    #[test]
    fn test_blep_buffer_drains_to_zero() {
        let mut buf = BlepBuffer::new();
        buf.add_step(0.5, -2.0);
        let mut total = 0.0;
        for _ in 0..FILLEN {
            total += buf.next();
        }
        // Injected residual is finite and fully drained.
        assert!(total.is_finite());
        for _ in 0..FILLEN {
            assert_eq!(buf.next(), 0.0);
        }
    }

    #[test]
    fn test_blep_buffer_first_sample_cancels_step() {
        let mut buf = BlepBuffer::new();
        // A -2 step that just happened: the immediate correction should
        // nearly cancel it (residual starts near -1).
        buf.add_step(0.01, -2.0);
        let first = buf.next();
        assert!(first > 1.8, "first correction {first}");
    }
}
