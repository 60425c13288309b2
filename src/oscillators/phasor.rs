//! Naive phase ramp.

use super::Oscillator;
use crate::Signal;

/// A bare phase accumulator ramping from 0.0 to 1.0.
///
/// This is the driving signal behind every phase-based oscillator, exposed
/// on its own for modulation duty and for chaining hard-synced oscillators:
/// [`Phasor::wrapped`] reports whether the last generated sample crossed the
/// cycle boundary. The output is deliberately not bandlimited.
///
/// # Examples
///
/// ```
/// use overtone::{Signal, oscillators::{Oscillator, Phasor}};
///
/// let mut phasor = Phasor::new(1.0, 4.0); // 1 Hz at 4 Hz sample rate
/// assert_eq!(phasor.next_sample(), 0.0);
/// assert_eq!(phasor.next_sample(), 0.25);
/// ```
pub struct Phasor {
    /// Current phase in [0.0, 1.0).
    phase: f32,
    /// Phase increment per sample (frequency / sample_rate).
    inc: f32,
    freq: f32,
    sample_rate: f32,
    /// Whether the sample most recently produced crossed the cycle start.
    did_wrap: bool,
    /// Wrap detected while advancing toward the next sample.
    pending_wrap: bool,
}

impl Phasor {
    /// Creates a phasor at `frequency` Hz.
    pub fn new(frequency: f32, sample_rate: f32) -> Self {
        let mut p = Self {
            phase: 0.0,
            inc: 0.0,
            freq: f32::NAN,
            sample_rate,
            did_wrap: false,
            pending_wrap: false,
        };
        p.set_frequency(frequency);
        p
    }

    /// True if the sample most recently produced wrapped the phase.
    pub fn wrapped(&self) -> bool {
        self.did_wrap
    }

    /// Current phase in [0.0, 1.0).
    pub fn phase(&self) -> f32 {
        self.phase
    }
}

impl Signal for Phasor {
    fn next_sample(&mut self) -> f32 {
        let out = self.phase;
        // The wrap detected while advancing lands on the *next* sample, so
        // latch it one call before reporting it.
        self.did_wrap = self.pending_wrap;
        self.phase += self.inc;
        self.pending_wrap = self.phase >= 1.0;
        if self.pending_wrap {
            self.phase -= 1.0;
        }
        out
    }
}

impl Oscillator for Phasor {
    fn set_frequency(&mut self, frequency: f32) {
        let frequency = frequency.clamp(0.0, self.sample_rate * 0.49);
        if frequency == self.freq {
            return;
        }
        self.freq = frequency;
        self.inc = frequency / self.sample_rate;
    }

    fn frequency(&self) -> f32 {
        self.freq
    }

    fn reset(&mut self) {
        self.phase = 0.0;
        self.did_wrap = false;
        self.pending_wrap = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ramp_and_wrap() {
        let mut p = Phasor::new(1.0, 4.0);
        assert_eq!(p.next_sample(), 0.0);
        assert_eq!(p.next_sample(), 0.25);
        assert_eq!(p.next_sample(), 0.5);
        assert_eq!(p.next_sample(), 0.75);
        assert!(!p.wrapped());
        assert_eq!(p.next_sample(), 0.0);
        assert!(p.wrapped());
    }

    #[test]
    fn test_wrap_flag_counts_whole_cycles() {
        // 750 Hz at 48 kHz is exactly 64 samples per cycle.
        let mut p = Phasor::new(750.0, 48_000.0);
        let mut wraps = 0;
        for _ in 0..64 * 10 + 1 {
            p.next_sample();
            if p.wrapped() {
                wraps += 1;
            }
        }
        assert_eq!(wraps, 10);
    }

    #[test]
    fn test_negative_frequency_freezes() {
        let mut p = Phasor::new(-100.0, 48_000.0);
        assert_eq!(p.frequency(), 0.0);
        let a = p.next_sample();
        let b = p.next_sample();
        assert_eq!(a, b);
    }

    #[test]
    fn test_above_nyquist_is_clamped() {
        let p = Phasor::new(40_000.0, 48_000.0);
        assert!(p.frequency() < 24_000.0);
    }

    #[test]
    fn test_phase_stays_in_range() {
        let mut p = Phasor::new(997.0, 48_000.0);
        for _ in 0..100_000 {
            let s = p.next_sample();
            assert!((0.0..1.0).contains(&s));
        }
    }

    #[test]
    fn test_reset() {
        let mut p = Phasor::new(440.0, 48_000.0);
        for _ in 0..7 {
            p.next_sample();
        }
        p.reset();
        assert_eq!(p.next_sample(), 0.0);
    }
}
