//! One-pole power follower.

use crate::error::{Error, Result};

/// An exponentially smoothed energy tracker.
///
/// Each tick folds the squared input into a one-pole average:
/// `curr = factor * curr + (1 - factor) * x^2`. The output is therefore a
/// mean-square estimate; take its square root for an RMS reading.
///
/// # Examples
///
/// ```
/// use overtone::analysis::PowerFollower;
///
/// let mut power = PowerFollower::new(0.9).unwrap();
/// for _ in 0..200 {
///     power.tick(1.0);
/// }
/// assert!((power.sample() - 1.0).abs() < 1e-3);
/// ```
pub struct PowerFollower {
    factor: f32,
    one_minus_factor: f32,
    curr: f32,
}

impl PowerFollower {
    /// Creates a follower with smoothing `factor` in [0, 1).
    pub fn new(factor: f32) -> Result<Self> {
        let mut p = Self {
            factor: 0.0,
            one_minus_factor: 1.0,
            curr: 0.0,
        };
        p.set_factor(factor)?;
        Ok(p)
    }

    /// Folds one sample into the estimate and returns it.
    #[inline]
    pub fn tick(&mut self, x: f32) -> f32 {
        self.curr = self.factor * self.curr + self.one_minus_factor * x * x;
        self.curr
    }

    /// Current estimate without consuming new input.
    pub fn sample(&self) -> f32 {
        self.curr
    }

    /// Sets the smoothing factor in [0, 1). Values outside are rejected and
    /// the previous factor kept.
    pub fn set_factor(&mut self, factor: f32) -> Result<()> {
        if !(0.0..1.0).contains(&factor) {
            return Err(Error::OutOfRange {
                param: "power smoothing factor",
                min: 0.0,
                max: 1.0,
                value: factor,
            });
        }
        self.factor = factor;
        self.one_minus_factor = 1.0 - factor;
        Ok(())
    }

    /// Clears the estimate back to silence.
    pub fn reset(&mut self) {
        self.curr = 0.0;
    }
}
