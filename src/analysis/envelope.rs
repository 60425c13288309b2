//! Attack/decay envelope follower.

use crate::error::{Error, Result};

/// A peak-style envelope follower with instantaneous attack.
///
/// When the rectified input exceeds the attack threshold the output jumps
/// straight to it; otherwise the output decays geometrically. This makes
/// the follower fast on onsets and smooth on tails, which is what the
/// attack detector and dynamics processing want from it.
///
/// # Examples
///
/// ```
/// use overtone::analysis::EnvelopeFollower;
///
/// let mut env = EnvelopeFollower::new(0.01, 0.999).unwrap();
/// env.tick(0.8); // attack: jumps to the peak
/// let after = env.tick(0.0); // decay begins
/// assert!(after < 0.8 && after > 0.79);
/// ```
pub struct EnvelopeFollower {
    value: f32,
    attack_thresh: f32,
    decay_coeff: f32,
}

impl EnvelopeFollower {
    /// Creates a follower.
    ///
    /// # Arguments
    ///
    /// * `attack_thresh` - Rectified level above which the output jumps to
    ///   the input (must be >= 0)
    /// * `decay_coeff` - Per-sample decay multiplier in (0, 1)
    pub fn new(attack_thresh: f32, decay_coeff: f32) -> Result<Self> {
        let mut env = Self {
            value: 0.0,
            attack_thresh: 0.0,
            decay_coeff: 0.5,
        };
        env.set_attack_thresh(attack_thresh)?;
        env.set_decay_coeff(decay_coeff)?;
        Ok(env)
    }

    /// Processes one sample and returns the envelope value.
    #[inline]
    pub fn tick(&mut self, x: f32) -> f32 {
        let level = x.abs();
        if level > self.attack_thresh && level > self.value {
            self.value = level;
        } else {
            self.value *= self.decay_coeff;
        }
        self.value
    }

    /// Current envelope value without consuming input.
    pub fn value(&self) -> f32 {
        self.value
    }

    /// Sets the attack threshold. Negative values are rejected and the
    /// previous threshold kept.
    pub fn set_attack_thresh(&mut self, thresh: f32) -> Result<()> {
        if !(0.0..=1.0).contains(&thresh) {
            return Err(Error::OutOfRange {
                param: "attack threshold",
                min: 0.0,
                max: 1.0,
                value: thresh,
            });
        }
        self.attack_thresh = thresh;
        Ok(())
    }

    /// Sets the per-sample decay coefficient. Values outside (0, 1) are
    /// rejected and the previous coefficient kept.
    pub fn set_decay_coeff(&mut self, coeff: f32) -> Result<()> {
        if coeff <= 0.0 || coeff >= 1.0 {
            return Err(Error::OutOfRange {
                param: "decay coefficient",
                min: 0.0,
                max: 1.0,
                value: coeff,
            });
        }
        self.decay_coeff = coeff;
        Ok(())
    }

    /// Clears the envelope back to silence.
    pub fn reset(&mut self) {
        self.value = 0.0;
    }
}
