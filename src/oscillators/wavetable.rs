//! Wavetable oscillator reading multi-octave bandlimited tables.

use std::sync::Arc;

use super::Oscillator;
use crate::filters::Butterworth;
use crate::math::lerp;
use crate::tables::WavetableBank;
use crate::Signal;

/// An oscillator reading a shared [`WavetableBank`].
///
/// The bank holds one bandlimited table per octave; the oscillator picks
/// the pair bracketing the current frequency and crossfades between them,
/// so sweeping the pitch never steps audibly from one table to the next.
/// Any number of oscillators can read the same bank, which keeps the
/// per-voice cost at two cubic-interpolated lookups.
///
/// An optional Butterworth lowpass can be enabled to mop up the residual
/// spectral images the crossfade lets through near the top of each octave.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use overtone::{Signal, oscillators::WavetableOscillator, tables::WavetableBank};
///
/// let bank = Arc::new(WavetableBank::saw(2048, 48_000.0, 12_000.0).unwrap());
/// let mut osc = WavetableOscillator::new(bank, 440.0, 48_000.0);
/// let sample = osc.next_sample();
/// assert!(sample.abs() <= 1.1);
/// ```
pub struct WavetableOscillator {
    bank: Arc<WavetableBank>,
    /// Current phase of the oscillator (0.0 to 1.0).
    phase: f32,
    /// Phase increment per sample (frequency / sample_rate).
    inc: f32,
    freq: f32,
    sample_rate: f32,
    /// Octave table pair and crossfade position for the current frequency.
    oct: usize,
    fade: f32,
    filter: Option<Butterworth>,
}

impl WavetableOscillator {
    /// Creates an oscillator reading `bank`.
    ///
    /// # Arguments
    ///
    /// * `bank` - Shared bank of octave tables
    /// * `frequency` - Frequency in Hz
    /// * `sample_rate` - Sample rate in Hz (e.g., 48000.0)
    pub fn new(bank: Arc<WavetableBank>, frequency: f32, sample_rate: f32) -> Self {
        let mut osc = Self {
            bank,
            phase: 0.0,
            inc: 0.0,
            freq: f32::NAN,
            sample_rate,
            oct: 0,
            fade: 0.0,
            filter: None,
        };
        osc.set_frequency(frequency);
        osc
    }

    /// Enables a post lowpass of the given (even) order, cutting just
    /// below Nyquist. Returns the error from the filter constructor if the
    /// order is unusable; the oscillator is unchanged in that case.
    pub fn set_anti_aliasing(&mut self, order: usize) -> crate::Result<()> {
        let cutoff = self.sample_rate * 0.45;
        self.filter = Some(Butterworth::lowpass(order, cutoff, self.sample_rate)?);
        Ok(())
    }

    /// Removes the post lowpass.
    pub fn clear_anti_aliasing(&mut self) {
        self.filter = None;
    }

    /// The bank this oscillator reads from.
    pub fn bank(&self) -> &Arc<WavetableBank> {
        &self.bank
    }
}

impl Signal for WavetableOscillator {
    fn next_sample(&mut self) -> f32 {
        let a = self.bank.lookup_cubic(self.oct, self.phase);
        let raw = if self.fade > 0.0 {
            let b = self.bank.lookup_cubic(self.oct + 1, self.phase);
            lerp(a, b, self.fade)
        } else {
            a
        };

        self.phase += self.inc;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        }

        match &mut self.filter {
            Some(f) => f.tick(raw),
            None => raw,
        }
    }
}

impl Oscillator for WavetableOscillator {
    fn set_frequency(&mut self, frequency: f32) {
        let frequency = frequency.clamp(0.0, self.sample_rate * 0.49);
        if frequency == self.freq {
            return;
        }
        self.freq = frequency;
        self.inc = frequency / self.sample_rate;
        let (oct, fade) = self.bank.select(frequency);
        self.oct = oct;
        self.fade = fade;
    }

    fn frequency(&self) -> f32 {
        self.freq
    }

    fn reset(&mut self) {
        self.phase = 0.0;
        if let Some(f) = &mut self.filter {
            f.reset();
        }
    }
}
