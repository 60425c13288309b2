//! Triangle wave oscillator with polyBLEP anti-aliasing.

use super::{poly_blep, Oscillator};
use crate::Signal;

/// Integrator leak keeping DC drift out of the triangle without audibly
/// tilting the waveform.
const LEAK: f32 = 0.999_5;

/// A triangle oscillator with adjustable skew and polyBLEP anti-aliasing.
///
/// The triangle is produced by leaky-integrating a polyBLEP-corrected
/// square: integration turns the square's bandlimited edges into
/// bandlimited corners, so the triangle inherits the anti-aliasing.
/// Skew moves the apex, morphing the shape from ramp-like through
/// symmetric triangle to saw-like.
///
/// # Examples
///
/// ```
/// use overtone::{Signal, oscillators::{Oscillator, Tri}};
///
/// let mut osc = Tri::new(440.0, 48_000.0);
/// osc.set_skew(0.3);
/// let sample = osc.next_sample();
/// assert!(sample.abs() <= 1.05);
/// ```
pub struct Tri {
    /// Current phase of the oscillator (0.0 to 1.0).
    phase: f32,
    /// Phase increment per sample (frequency / sample_rate).
    inc: f32,
    freq: f32,
    sample_rate: f32,
    /// Apex position in (0.0, 1.0), derived from skew.
    width: f32,
    /// Integrator state; also the previous output sample.
    last_out: f32,
}

impl Tri {
    /// Creates a new symmetric triangle oscillator.
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
            // Phase 0 is the trough of the integrated square, so starting
            // the integrator there avoids a slowly decaying DC offset.
            last_out: -1.0,
        };
        osc.set_frequency(frequency);
        osc
    }

    /// Sets the skew in [-1.0, 1.0]; 0.0 is a symmetric triangle, positive
    /// values push the apex later in the cycle.
    pub fn set_skew(&mut self, skew: f32) {
        let skew = skew.clamp(-1.0, 1.0);
        self.width = 0.5 + 0.49 * skew;
    }

    /// Current skew in [-1.0, 1.0].
    pub fn skew(&self) -> f32 {
        (self.width - 0.5) / 0.49
    }
}

impl Signal for Tri {
    fn next_sample(&mut self) -> f32 {
        // polyBLEP square with duty cycle `width`...
        let naive = if self.phase < self.width { 1.0 } else { -1.0 };
        let mut square = naive;
        square += poly_blep(self.phase, self.inc);
        square -= poly_blep((self.phase - self.width).rem_euclid(1.0), self.inc);

        // ...integrated with its DC removed, scaled so the peaks hit +-1.
        let dc = 2.0 * self.width - 1.0;
        let gain = self.inc / (self.width * (1.0 - self.width));
        self.last_out = LEAK * self.last_out + gain * (square - dc);

        self.phase += self.inc;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        }

        self.last_out
    }
}

impl Oscillator for Tri {
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
        self.last_out = -1.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_oscillator_creation() {
        let osc = Tri::new(440.0, 48_000.0);
        assert_eq!(osc.frequency(), 440.0);
        assert_eq!(osc.skew(), 0.0);
    }

    #[test]
    fn test_amplitude_settles_near_unit() {
        let mut osc = Tri::new(480.0, 48_000.0);
        // Let the integrator settle for a few cycles.
        for _ in 0..1_000 {
            osc.next_sample();
        }
        let mut max = f32::MIN;
        let mut min = f32::MAX;
        for _ in 0..1_000 {
            let s = osc.next_sample();
            max = max.max(s);
            min = min.min(s);
        }
        assert!(max > 0.8 && max < 1.1, "peak {max}");
        assert!(min < -0.8 && min > -1.1, "trough {min}");
    }

    #[test]
    fn test_mean_is_near_zero_even_when_skewed() {
        for skew in [-0.5, 0.0, 0.5] {
            let mut osc = Tri::new(480.0, 48_000.0);
            osc.set_skew(skew);
            for _ in 0..2_000 {
                osc.next_sample();
            }
            let mut sum = 0.0;
            let n = 4_800;
            for _ in 0..n {
                sum += osc.next_sample();
            }
            let mean = sum / n as f32;
            assert!(mean.abs() < 0.05, "skew {skew}: mean {mean}");
        }
    }

    #[test]
    fn test_skew_moves_the_apex() {
        // With positive skew the rise occupies more of the cycle, so the
        // sample where the maximum occurs moves later.
        let apex_index = |skew: f32| {
            let mut osc = Tri::new(480.0, 48_000.0);
            osc.set_skew(skew);
            for _ in 0..1_000 {
                osc.next_sample();
            }
            let mut best = (0, f32::MIN);
            for i in 0..100 {
                let s = osc.next_sample();
                if s > best.1 {
                    best = (i, s);
                }
            }
            best.0
        };
        assert!(apex_index(0.8) > apex_index(-0.8));
    }

    #[test]
    fn test_sample_range_with_overshoot_tolerance() {
        for freq in [55.0, 440.0, 3_520.0] {
            let mut osc = Tri::new(freq, 48_000.0);
            for _ in 0..10_000 {
                let s = osc.next_sample();
                assert!(s.abs() <= 1.05, "{freq} Hz produced {s}");
            }
        }
    }

    #[test]
    fn test_reset() {
        let mut osc = Tri::new(440.0, 48_000.0);
        for _ in 0..100 {
            osc.next_sample();
        }
        osc.reset();
        assert_eq!(osc.last_out, -1.0);
        assert_eq!(osc.phase, 0.0);
    }

    #[test]
    fn test_startup_stays_in_range() {
        // The integrator starts at the trough, so there is no decaying DC
        // transient: the very first cycles already sit inside the range.
        let mut osc = Tri::new(480.0, 48_000.0);
        for i in 0..2_000 {
            let s = osc.next_sample();
            assert!(s.abs() <= 1.05, "sample {i} was {s}");
        }
    }
}
