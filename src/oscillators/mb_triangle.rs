//! Triangle wave oscillator with minBLEP anti-aliasing.

use super::{BlepBuffer, Oscillator};
use crate::Signal;

/// Integrator leak keeping DC drift out of the triangle without audibly
/// tilting the waveform.
const LEAK: f32 = 0.999_5;

/// A skewable triangle oscillator built on causal bandlimited steps.
///
/// Internally this runs the same corrected square as
/// [`MbPulse`](super::MbPulse) and leaky-integrates it, which turns the
/// bandlimited edges into bandlimited corners. Skew moves the apex by
/// changing the underlying duty cycle, morphing the shape between
/// ramp-like and saw-like extremes. Hard sync works on the square core:
/// [`MbTriangle::sync_out`] fires on wraps, [`MbTriangle::sync_in`]
/// slaves the phase; the integrator carries across the reset so sync is
/// click-free.
///
/// # Examples
///
/// ```
/// use overtone::{Signal, oscillators::{MbTriangle, Oscillator}};
///
/// let mut osc = MbTriangle::new(440.0, 48_000.0);
/// osc.set_skew(-0.3);
/// let sample = osc.next_sample();
/// assert!(sample.abs() <= 1.1);
/// ```
pub struct MbTriangle {
    /// Current phase of the oscillator (0.0 to 1.0).
    phase: f32,
    /// Phase increment per sample (frequency / sample_rate).
    inc: f32,
    freq: f32,
    sample_rate: f32,
    /// Apex position in (0.0, 1.0), derived from skew.
    width: f32,
    blep: BlepBuffer,
    /// Integrator state; also the previous output sample.
    last_out: f32,
    /// Fractional wrap position of the last sample, 0.0 when no wrap.
    sync: f32,
    /// Wrap detected while advancing toward the next sample.
    pending_sync: f32,
}

impl MbTriangle {
    /// Creates a new symmetric minBLEP triangle oscillator.
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
            blep: BlepBuffer::new(),
            // Phase 0 is the trough of the integrated square, so starting
            // the integrator there avoids a slowly decaying DC offset.
            last_out: -1.0,
            sync: 0.0,
            pending_sync: 0.0,
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

    fn naive_square(&self) -> f32 {
        if self.phase < self.width { 1.0 } else { -1.0 }
    }

    /// Edge signal for sync chaining: the fractional position (in samples,
    /// 0.0 to 1.0) of the phase wrap behind the last generated sample, or
    /// 0.0 if it did not wrap.
    pub fn sync_out(&self) -> f32 {
        self.sync
    }

    /// Hard-syncs the oscillator: resets the phase of the square core as
    /// if a wrap had happened `offset` samples before the next output
    /// sample. The integrator keeps its state, so the triangle bends
    /// rather than jumps.
    pub fn sync_in(&mut self, offset: f32) {
        let offset = offset.clamp(0.0, 1.0);
        let old = self.naive_square();
        self.phase = offset * self.inc;
        let new = self.naive_square();
        if new != old {
            self.blep.add_step(offset, new - old);
        }
    }

    fn advance(&mut self) {
        let target = self.phase + self.inc;
        if self.inc <= 0.0 {
            return;
        }
        if self.phase < self.width && target >= self.width {
            self.blep.add_step((target - self.width) / self.inc, -2.0);
        }
        if target >= 1.0 {
            let wrapped = target - 1.0;
            let e = wrapped / self.inc;
            self.blep.add_step(e, 2.0);
            self.pending_sync = e.max(f32::EPSILON);
            if wrapped >= self.width {
                self.blep.add_step((wrapped - self.width) / self.inc, -2.0);
            }
            self.phase = wrapped;
        } else {
            self.phase = target;
        }
    }
}

impl Signal for MbTriangle {
    fn next_sample(&mut self) -> f32 {
        let square = self.naive_square() + self.blep.next();

        // Integrate with the square's DC removed, scaled so the peaks of
        // the resulting triangle hit +-1.
        let dc = 2.0 * self.width - 1.0;
        let gain = self.inc / (self.width * (1.0 - self.width));
        self.last_out = LEAK * self.last_out + gain * (square - dc);

        // The wrap found while advancing sits behind the *next* sample, so
        // latch it one call before reporting it through sync_out.
        self.sync = self.pending_sync;
        self.pending_sync = 0.0;
        self.advance();
        self.last_out
    }
}

impl Oscillator for MbTriangle {
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
        self.sync = 0.0;
        self.pending_sync = 0.0;
        self.blep.reset();
    }
}
