//! Pulse wave oscillator with polyBLEP anti-aliasing.

use super::{poly_blep, Oscillator};
use crate::Signal;

/// A pulse wave oscillator with variable width and polyBLEP anti-aliasing.
///
/// The naive waveform is +1.0 while the phase is below the pulse width and
/// -1.0 after; both edges (the wrap and the width crossing) get the
/// polynomial correction.
///
/// # Examples
///
/// ```
/// use overtone::{Signal, oscillators::{Oscillator, Pulse}};
///
/// let mut osc = Pulse::new(440.0, 48_000.0);
/// osc.set_width(0.25);
/// let sample = osc.next_sample();
/// assert!(sample.abs() <= 1.05);
/// ```
pub struct Pulse {
    /// Current phase of the oscillator (0.0 to 1.0).
    phase: f32,
    /// Phase increment per sample (frequency / sample_rate).
    inc: f32,
    freq: f32,
    sample_rate: f32,
    /// Duty cycle in (0.0, 1.0); 0.5 is a square wave.
    width: f32,
}

impl Pulse {
    /// Creates a new pulse oscillator with a 50% duty cycle.
    ///
    /// # Arguments
    ///
    /// * `frequency` - Frequency in Hz
    /// * `sample_rate` - Sample rate in Hz (e.g., 48000.0)
    pub fn new(frequency: f32, sample_rate: f32) -> Self {
        let mut osc = Self {
            phase: 0.0,
            inc: 0.0,
            freq: f32::NAN,
            sample_rate,
            width: 0.5,
        };
        osc.set_frequency(frequency);
        osc
    }

    /// Sets the duty cycle, clamped to [0.01, 0.99] so both edges survive.
    pub fn set_width(&mut self, width: f32) {
        self.width = width.clamp(0.01, 0.99);
    }

    /// Current duty cycle.
    pub fn width(&self) -> f32 {
        self.width
    }
}

impl Signal for Pulse {
    fn next_sample(&mut self) -> f32 {
        let naive = if self.phase < self.width { 1.0 } else { -1.0 };
        let mut out = naive;
        // Rising edge at the wrap, falling edge at the width crossing.
        out += poly_blep(self.phase, self.inc);
        out -= poly_blep((self.phase - self.width).rem_euclid(1.0), self.inc);

        self.phase += self.inc;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        }

        out
    }
}

impl Oscillator for Pulse {
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
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_oscillator_creation() {
        let osc = Pulse::new(440.0, 48_000.0);
        assert_eq!(osc.frequency(), 440.0);
        assert_eq!(osc.width(), 0.5);
    }

    #[test]
    fn test_width_is_clamped() {
        let mut osc = Pulse::new(440.0, 48_000.0);
        osc.set_width(1.5);
        assert_eq!(osc.width(), 0.99);
        osc.set_width(-1.0);
        assert_eq!(osc.width(), 0.01);
    }

    #[test]
    fn test_duty_cycle_shapes_the_mean() {
        // Mean of a +-1 pulse is 2 * width - 1.
        let sr = 48_000.0;
        for width in [0.25, 0.5, 0.75] {
            let mut osc = Pulse::new(480.0, sr);
            osc.set_width(width);
            let mut sum = 0.0;
            let n = 4_800; // whole number of cycles
            for _ in 0..n {
                sum += osc.next_sample();
            }
            let mean = sum / n as f32;
            let expect = 2.0 * width - 1.0;
            assert!((mean - expect).abs() < 0.02, "width {width}: mean {mean}");
        }
    }

    #[test]
    fn test_sample_range_with_overshoot_tolerance() {
        for freq in [55.0, 440.0, 3_520.0, 12_000.0] {
            let mut osc = Pulse::new(freq, 48_000.0);
            osc.set_width(0.3);
            for _ in 0..10_000 {
                let s = osc.next_sample();
                assert!(s.abs() <= 1.05, "{freq} Hz produced {s}");
            }
        }
    }

    #[test]
    fn test_zero_frequency_holds_output() {
        let mut osc = Pulse::new(0.0, 48_000.0);
        let a = osc.next_sample();
        let b = osc.next_sample();
        assert_eq!(a, b);
    }

    #[test]
    fn test_reset() {
        let mut osc = Pulse::new(440.0, 48_000.0);
        for _ in 0..23 {
            osc.next_sample();
        }
        osc.reset();
        assert_eq!(osc.phase, 0.0);
    }
}
