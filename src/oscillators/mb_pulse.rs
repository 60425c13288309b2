//! Pulse wave oscillator with minBLEP anti-aliasing.

use super::{BlepBuffer, Oscillator};
use crate::Signal;

/// A variable-width pulse oscillator using causal bandlimited steps.
///
/// The naive waveform is +1.0 below the pulse width and -1.0 after. Both
/// transitions are discontinuities, so both schedule a scaled step
/// residual at their exact fractional positions: +2.0 at the wrap, -2.0 at
/// the width crossing. Hard sync mirrors [`MbSaw`](super::MbSaw):
/// [`MbPulse::sync_out`] fires on wraps and [`MbPulse::sync_in`] slaves
/// the phase to a leader.
///
/// # Examples
///
/// ```
/// use overtone::{Signal, oscillators::{MbPulse, Oscillator}};
///
/// let mut osc = MbPulse::new(440.0, 48_000.0);
/// osc.set_width(0.25);
/// let sample = osc.next_sample();
/// assert!(sample.abs() <= 1.1);
/// ```
pub struct MbPulse {
    /// Current phase of the oscillator (0.0 to 1.0).
    phase: f32,
    /// Phase increment per sample (frequency / sample_rate).
    inc: f32,
    freq: f32,
    sample_rate: f32,
    /// Duty cycle in (0.0, 1.0); 0.5 is a square wave.
    width: f32,
    blep: BlepBuffer,
    /// Fractional wrap position of the last sample, 0.0 when no wrap.
    sync: f32,
    /// Wrap detected while advancing toward the next sample.
    pending_sync: f32,
}

impl MbPulse {
    /// Creates a new minBLEP pulse oscillator with a 50% duty cycle.
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
            sync: 0.0,
            pending_sync: 0.0,
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

    fn naive(&self) -> f32 {
        if self.phase < self.width { 1.0 } else { -1.0 }
    }

    /// Edge signal for sync chaining: the fractional position (in samples,
    /// 0.0 to 1.0) of the phase wrap behind the last generated sample, or
    /// 0.0 if it did not wrap.
    pub fn sync_out(&self) -> f32 {
        self.sync
    }

    /// Hard-syncs the oscillator: resets the phase as if a wrap had
    /// happened `offset` samples before the next output sample, injecting
    /// the bandlimited correction for the resulting jump.
    pub fn sync_in(&mut self, offset: f32) {
        let offset = offset.clamp(0.0, 1.0);
        let old = self.naive();
        self.phase = offset * self.inc;
        let new = self.naive();
        if new != old {
            self.blep.add_step(offset, new - old);
        }
    }

    /// Schedules corrections for every edge crossed while the unwrapped
    /// phase moved from `self.phase` to `target` during one sample step.
    fn advance(&mut self) {
        let target = self.phase + self.inc;
        if self.inc <= 0.0 {
            return;
        }
        // Falling edge at the width crossing.
        if self.phase < self.width && target >= self.width {
            self.blep.add_step((target - self.width) / self.inc, -2.0);
        }
        if target >= 1.0 {
            let wrapped = target - 1.0;
            let e = wrapped / self.inc;
            // Rising edge at the wrap.
            self.blep.add_step(e, 2.0);
            self.pending_sync = e.max(f32::EPSILON);
            // At extreme settings the same step can also clear the width
            // again after wrapping.
            if wrapped >= self.width {
                self.blep.add_step((wrapped - self.width) / self.inc, -2.0);
            }
            self.phase = wrapped;
        } else {
            self.phase = target;
        }
    }
}

impl Signal for MbPulse {
    fn next_sample(&mut self) -> f32 {
        let out = self.naive() + self.blep.next();
        // The wrap found while advancing sits behind the *next* sample, so
        // latch it one call before reporting it through sync_out.
        self.sync = self.pending_sync;
        self.pending_sync = 0.0;
        self.advance();
        out
    }
}

impl Oscillator for MbPulse {
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
        self.sync = 0.0;
        self.pending_sync = 0.0;
        self.blep.reset();
    }
}
