//! Block-based transient detector.

use crate::error::{Error, Result};

/// Default analysis block length in samples.
const DEF_BLOCK_SIZE: usize = 1024;

/// Default onset threshold in dB of RMS gain over the tracked level.
const DEF_THRESHOLD: f32 = 6.0;

/// Default attack smoothing time in milliseconds.
const DEF_ATTACK_MS: f32 = 10.0;

/// Default release smoothing time in milliseconds.
const DEF_RELEASE_MS: f32 = 10.0;

/// Floor below which a block counts as silence and can never trigger.
const SILENCE_FLOOR: f32 = 1e-6;

/// An RMS-jump onset detector working one block at a time.
///
/// Each call to [`AttackDetector::detect`] compares the block's RMS
/// against a smoothed level carried over from previous blocks. When the
/// block is louder than the tracked level by more than the threshold (in
/// dB), the detector fires and returns the sample index of the steepest
/// rise inside the block; the tracked level then snaps to the new RMS.
/// Otherwise the level relaxes toward the block RMS using the attack or
/// release coefficient, and no onset is reported.
///
/// # Examples
///
/// ```
/// use overtone::analysis::AttackDetector;
///
/// let mut det = AttackDetector::new(48_000.0);
/// assert_eq!(det.detect(&[0.0; 1024]), None);
/// assert!(det.detect(&[0.8; 1024]).is_some());
/// ```
pub struct AttackDetector {
    sample_rate: f32,
    block_size: usize,
    /// Onset threshold in dB above the tracked level.
    threshold_db: f32,
    attack_ms: f32,
    release_ms: f32,
    /// Per-block smoothing coefficients derived from the times above.
    atk_coeff: f32,
    rel_coeff: f32,
    /// Smoothed RMS level carried between blocks.
    prev_amp: f32,
    /// Last sample of the previous block, for cross-block slope.
    prev_sample: f32,
}

impl AttackDetector {
    /// Creates a detector with the default block size, threshold, and
    /// attack/release times.
    pub fn new(sample_rate: f32) -> Self {
        let mut det = Self {
            sample_rate,
            block_size: DEF_BLOCK_SIZE,
            threshold_db: DEF_THRESHOLD,
            attack_ms: DEF_ATTACK_MS,
            release_ms: DEF_RELEASE_MS,
            atk_coeff: 0.0,
            rel_coeff: 0.0,
            prev_amp: 0.0,
            prev_sample: 0.0,
        };
        det.recompute_coeffs();
        det
    }

    /// Analyzes one block. Returns the index of the attack within the
    /// block, or `None` when no onset fired.
    pub fn detect(&mut self, block: &[f32]) -> Option<usize> {
        if block.is_empty() {
            return None;
        }

        let energy: f32 = block.iter().map(|&x| x * x).sum();
        let rms = (energy / block.len() as f32).sqrt();

        let fired = rms > SILENCE_FLOOR
            && 20.0 * (rms / self.prev_amp.max(SILENCE_FLOOR)).log10() > self.threshold_db;

        if fired {
            self.prev_amp = rms;
            let idx = self.steepest_rise(block);
            self.prev_sample = block[block.len() - 1];
            return Some(idx);
        }

        // No onset: relax the tracked level toward the block RMS, fast on
        // the way up, slow on the way down.
        let coeff = if rms > self.prev_amp {
            self.atk_coeff
        } else {
            self.rel_coeff
        };
        self.prev_amp = coeff * self.prev_amp + (1.0 - coeff) * rms;
        self.prev_sample = block[block.len() - 1];
        None
    }

    /// Sets the onset threshold in dB.
    pub fn set_threshold(&mut self, db: f32) {
        self.threshold_db = db;
    }

    /// Sets the attack time in milliseconds. Nonpositive times are
    /// rejected and the previous time kept.
    pub fn set_attack(&mut self, ms: f32) -> Result<()> {
        if ms <= 0.0 {
            return Err(Error::InvalidArgument("attack time must be positive"));
        }
        self.attack_ms = ms;
        self.recompute_coeffs();
        Ok(())
    }

    /// Sets the release time in milliseconds. Nonpositive times are
    /// rejected and the previous time kept.
    pub fn set_release(&mut self, ms: f32) -> Result<()> {
        if ms <= 0.0 {
            return Err(Error::InvalidArgument("release time must be positive"));
        }
        self.release_ms = ms;
        self.recompute_coeffs();
        Ok(())
    }

    /// Sets the nominal block size used to derive the per-block smoothing
    /// coefficients. Zero is rejected and the previous size kept.
    pub fn set_block_size(&mut self, size: usize) -> Result<()> {
        if size == 0 {
            return Err(Error::InvalidArgument("block size must be nonzero"));
        }
        self.block_size = size;
        self.recompute_coeffs();
        Ok(())
    }

    /// Retunes the detector to a new sample rate.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.recompute_coeffs();
    }

    /// Clears the tracked level.
    pub fn reset(&mut self) {
        self.prev_amp = 0.0;
        self.prev_sample = 0.0;
    }

    /// Per-sample coefficient `exp(-1 / (ms * 0.001 * sampleRate))` raised
    /// to the block length, since the level updates once per block.
    fn recompute_coeffs(&mut self) {
        let per_sample = |ms: f32| (-1.0 / (ms * 0.001 * self.sample_rate)).exp();
        self.atk_coeff = per_sample(self.attack_ms).powi(self.block_size as i32);
        self.rel_coeff = per_sample(self.release_ms).powi(self.block_size as i32);
    }

    fn steepest_rise(&self, block: &[f32]) -> usize {
        let mut best = 0;
        let mut best_slope = f32::MIN;
        let mut prev = self.prev_sample;
        for (i, &x) in block.iter().enumerate() {
            let slope = x.abs() - prev.abs();
            if slope > best_slope {
                best_slope = slope;
                best = i;
            }
            prev = x;
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silence_then_jump_reports_attack() {
        let mut det = AttackDetector::new(48_000.0);
        assert_eq!(det.detect(&[0.0; 1024]), None);
        let mut loud = [0.8; 1024];
        loud[0] = 0.0; // the rise happens at index 1
        let idx = det.detect(&loud);
        assert_eq!(idx, Some(1));
    }

    #[test]
    fn test_consecutive_silence_reports_nothing() {
        let mut det = AttackDetector::new(48_000.0);
        assert_eq!(det.detect(&[0.0; 1024]), None);
        assert_eq!(det.detect(&[0.0; 1024]), None);
    }

    #[test]
    fn test_steady_signal_fires_only_once() {
        let mut det = AttackDetector::new(48_000.0);
        det.detect(&[0.0; 1024]);
        assert!(det.detect(&[0.8; 1024]).is_some());
        // The tracked level snapped to the new RMS, so a sustained tone
        // does not keep retriggering.
        assert_eq!(det.detect(&[0.8; 1024]), None);
        assert_eq!(det.detect(&[0.8; 1024]), None);
    }

    #[test]
    fn test_small_level_changes_stay_below_threshold() {
        let mut det = AttackDetector::new(48_000.0);
        det.detect(&[0.5; 1024]);
        det.detect(&[0.5; 1024]);
        // +1.5 dB step, under the 6 dB default threshold.
        assert_eq!(det.detect(&[0.6; 1024]), None);
    }

    #[test]
    fn test_threshold_is_adjustable() {
        let mut det = AttackDetector::new(48_000.0);
        det.set_threshold(1.0);
        det.detect(&[0.5; 1024]);
        det.detect(&[0.5; 1024]);
        // The same +1.5 dB step now fires.
        assert!(det.detect(&[0.6; 1024]).is_some());
    }

    #[test]
    fn test_bad_times_are_rejected() {
        let mut det = AttackDetector::new(48_000.0);
        assert!(det.set_attack(0.0).is_err());
        assert!(det.set_release(-5.0).is_err());
        assert!(det.set_block_size(0).is_err());
        assert!(det.set_attack(20.0).is_ok());
        assert!(det.set_release(50.0).is_ok());
        assert!(det.set_block_size(512).is_ok());
    }

    #[test]
    fn test_empty_block_is_a_noop() {
        let mut det = AttackDetector::new(48_000.0);
        assert_eq!(det.detect(&[]), None);
    }
}
