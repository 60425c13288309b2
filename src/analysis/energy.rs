//! Windowed block energy tracker.

use std::f32::consts::TAU;

use crate::error::{Error, Result};
use crate::ring::RingBuffer;

/// Default analysis window length in samples.
const DEF_WINDOW_SIZE: usize = 1024;

/// Default hop between analyses in samples.
const DEF_HOP_SIZE: usize = 256;

/// A Hann-windowed energy meter updated once per hop.
///
/// Samples stream in one at a time; every `hop_size` samples the meter
/// recomputes the windowed mean square of the most recent `window_size`
/// samples. Between hops [`BlockEnergy::energy`] returns the last computed
/// value, so the reading is block-rate, not sample-rate.
///
/// Window and hop are reconfigurable at control time within the capacity
/// fixed at construction; requests beyond it are rejected.
///
/// # Examples
///
/// ```
/// use overtone::analysis::BlockEnergy;
///
/// let mut meter = BlockEnergy::new(2048).unwrap();
/// for _ in 0..4096 {
///     meter.tick(0.5);
/// }
/// assert!(meter.energy() > 0.0);
/// ```
pub struct BlockEnergy {
    input: RingBuffer,
    /// Hann coefficients; only the first `window_size` entries are live.
    window: Box<[f32]>,
    /// Precomputed sum of the live window coefficients.
    window_sum: f32,
    window_size: usize,
    hop_size: usize,
    /// Samples seen since the last analysis.
    hop_counter: usize,
    energy: f32,
}

impl BlockEnergy {
    /// Creates a meter able to hold analysis windows up to `capacity`
    /// samples, starting with the default window and hop.
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity < DEF_WINDOW_SIZE {
            return Err(Error::CapacityExceeded {
                what: "block energy window",
                requested: DEF_WINDOW_SIZE,
                available: capacity,
            });
        }
        let mut meter = Self {
            input: RingBuffer::new(capacity),
            window: vec![0.0; capacity].into_boxed_slice(),
            window_sum: 0.0,
            window_size: 0,
            hop_size: DEF_HOP_SIZE,
            hop_counter: 0,
            energy: 0.0,
        };
        // Capacity was checked above, so this cannot fail.
        let _ = meter.set_window_size(DEF_WINDOW_SIZE);
        Ok(meter)
    }

    /// Feeds one sample; recomputes the energy at hop boundaries.
    pub fn tick(&mut self, x: f32) {
        self.input.push(x);
        self.hop_counter += 1;
        if self.hop_counter >= self.hop_size {
            self.hop_counter = 0;
            self.analyze();
        }
    }

    /// Feeds a whole block.
    pub fn process(&mut self, block: &[f32]) {
        for &x in block {
            self.tick(x);
        }
    }

    /// Most recent windowed mean-square energy.
    pub fn energy(&self) -> f32 {
        self.energy
    }

    /// Sets the analysis window length. Fails if it exceeds the capacity or
    /// is too short to window; the previous geometry stays active on
    /// failure.
    pub fn set_window_size(&mut self, size: usize) -> Result<()> {
        // A Hann window shorter than 2 samples is all zeros, which would
        // make the normalization divide by zero.
        if size < 2 {
            return Err(Error::InvalidArgument(
                "energy window needs at least 2 samples",
            ));
        }
        if size > self.input.capacity() {
            return Err(Error::CapacityExceeded {
                what: "block energy window",
                requested: size,
                available: self.input.capacity(),
            });
        }
        self.window_size = size;
        self.window_sum = 0.0;
        for (i, w) in self.window.iter_mut().take(size).enumerate() {
            *w = 0.5 - 0.5 * (TAU * i as f32 / size as f32).cos();
            self.window_sum += *w;
        }
        Ok(())
    }

    /// Sets the hop between analyses. Fails if it exceeds the capacity or
    /// is zero; the previous geometry stays active on failure.
    pub fn set_hop_size(&mut self, size: usize) -> Result<()> {
        if size == 0 || size > self.input.capacity() {
            return Err(Error::CapacityExceeded {
                what: "block energy hop",
                requested: size,
                available: self.input.capacity(),
            });
        }
        self.hop_size = size;
        Ok(())
    }

    /// Current window length.
    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Current hop length.
    pub fn hop_size(&self) -> usize {
        self.hop_size
    }

    /// Clears the input history and the reading.
    pub fn reset(&mut self) {
        self.input.reset();
        self.hop_counter = 0;
        self.energy = 0.0;
    }

    fn analyze(&mut self) {
        let n = self.window_size;
        let mut sum = 0.0;
        for i in 0..n {
            // recent(0) is the newest sample, which sits at the window end.
            let x = self.input.recent(n - 1 - i);
            sum += self.window[i] * x * x;
        }
        self.energy = sum / self.window_sum;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silence_reads_zero() {
        let mut meter = BlockEnergy::new(2048).unwrap();
        for _ in 0..4096 {
            meter.tick(0.0);
        }
        assert_eq!(meter.energy(), 0.0);
    }

    #[test]
    fn test_constant_signal_reads_its_power() {
        let mut meter = BlockEnergy::new(2048).unwrap();
        for _ in 0..4096 {
            meter.tick(0.5);
        }
        assert!((meter.energy() - 0.25).abs() < 1e-3, "got {}", meter.energy());
    }

    #[test]
    fn test_updates_only_at_hop_boundaries() {
        let mut meter = BlockEnergy::new(2048).unwrap();
        for _ in 0..2048 {
            meter.tick(0.5);
        }
        let settled = meter.energy();
        // Mid-hop samples do not change the reading.
        for _ in 0..meter.hop_size() - 1 {
            meter.tick(0.0);
            assert_eq!(meter.energy(), settled);
        }
        meter.tick(0.0);
        assert!(meter.energy() < settled);
    }

    #[test]
    fn test_geometry_rejection_keeps_old_values() {
        let mut meter = BlockEnergy::new(2048).unwrap();
        assert!(meter.set_window_size(4096).is_err());
        assert_eq!(meter.window_size(), 1024);
        assert!(meter.set_hop_size(0).is_err());
        assert_eq!(meter.hop_size(), 256);
        assert!(meter.set_window_size(512).is_ok());
        assert!(meter.set_hop_size(128).is_ok());
    }

    #[test]
    fn test_too_small_capacity_is_rejected() {
        assert!(BlockEnergy::new(512).is_err());
    }

    #[test]
    fn test_degenerate_window_is_rejected_and_reading_stays_finite() {
        let mut meter = BlockEnergy::new(2048).unwrap();
        assert!(meter.set_window_size(0).is_err());
        assert!(meter.set_window_size(1).is_err());
        assert_eq!(meter.window_size(), 1024);
        for _ in 0..4096 {
            meter.tick(0.5);
        }
        assert!(meter.energy().is_finite());
        assert!((meter.energy() - 0.25).abs() < 1e-3);
    }

    #[test]
    fn test_sine_energy_matches_half_amplitude_squared() {
        let mut meter = BlockEnergy::new(2048).unwrap();
        for i in 0..8192 {
            meter.tick((TAU * 220.0 * i as f32 / 48_000.0).sin());
        }
        // Mean square of a unit sine is 0.5.
        assert!((meter.energy() - 0.5).abs() < 0.02, "got {}", meter.energy());
    }
}
