//! Internal filter primitives.
//!
//! These are the black-box smoothing and alias-suppression filters consumed
//! by the oscillators and detectors: a one-pole lowpass, a first-order
//! pole-zero section (mostly used as a DC blocker), and an even-order
//! Butterworth lowpass built from cascaded biquad sections using the Audio
//! EQ Cookbook coefficient formulas.
//!
//! All of them are plain `tick(x) -> y` processors with no allocation after
//! construction.

use std::f32::consts::PI;

use crate::error::{Error, Result};

/// One-pole lowpass: `y += a * (x - y)`.
#[derive(Debug, Clone)]
pub struct OnePole {
    a: f32,
    y: f32,
    sample_rate: f32,
}

impl OnePole {
    /// Creates a one-pole lowpass with the given cutoff in Hz.
    pub fn lowpass(cutoff: f32, sample_rate: f32) -> Self {
        let mut f = Self {
            a: 1.0,
            y: 0.0,
            sample_rate,
        };
        f.set_cutoff(cutoff);
        f
    }

    /// Retunes the cutoff frequency in Hz.
    pub fn set_cutoff(&mut self, cutoff: f32) {
        let cutoff = cutoff.clamp(0.0, self.sample_rate * 0.49);
        self.a = 1.0 - (-2.0 * PI * cutoff / self.sample_rate).exp();
    }

    /// Processes one sample.
    #[inline]
    pub fn tick(&mut self, x: f32) -> f32 {
        self.y += self.a * (x - self.y);
        self.y
    }

    /// Clears the filter state.
    pub fn reset(&mut self) {
        self.y = 0.0;
    }
}

/// First-order pole-zero section: `y[n] = b0*x[n] + b1*x[n-1] - a1*y[n-1]`.
#[derive(Debug, Clone)]
pub struct PoleZero {
    b0: f32,
    b1: f32,
    a1: f32,
    x1: f32,
    y1: f32,
}

impl PoleZero {
    /// Creates a DC-blocking pole-zero section.
    ///
    /// `pole` controls how close the pole sits to the unit circle; values
    /// near 1.0 give a lower blocking corner. Typical values are 0.99-0.999.
    pub fn block_dc(pole: f32) -> Self {
        let pole = pole.clamp(0.0, 0.999_9);
        Self {
            b0: 1.0,
            b1: -1.0,
            a1: -pole,
            x1: 0.0,
            y1: 0.0,
        }
    }

    /// Processes one sample.
    #[inline]
    pub fn tick(&mut self, x: f32) -> f32 {
        let y = self.b0 * x + self.b1 * self.x1 - self.a1 * self.y1;
        self.x1 = x;
        self.y1 = y;
        y
    }

    /// Clears the filter state.
    pub fn reset(&mut self) {
        self.x1 = 0.0;
        self.y1 = 0.0;
    }
}

/// One biquad section in direct form I.
#[derive(Debug, Clone, Default)]
struct Biquad {
    b0: f32,
    b1: f32,
    b2: f32,
    a1: f32,
    a2: f32,
    x1: f32,
    x2: f32,
    y1: f32,
    y2: f32,
}

impl Biquad {
    /// Audio EQ Cookbook lowpass coefficients.
    fn set_lowpass(&mut self, cutoff: f32, q: f32, sample_rate: f32) {
        let omega = 2.0 * PI * cutoff / sample_rate;
        let sin_omega = omega.sin();
        let cos_omega = omega.cos();
        let alpha = sin_omega / (2.0 * q);

        let b0 = (1.0 - cos_omega) / 2.0;
        let b1 = 1.0 - cos_omega;
        let b2 = (1.0 - cos_omega) / 2.0;
        let a0 = 1.0 + alpha;
        let a1 = -2.0 * cos_omega;
        let a2 = 1.0 - alpha;

        self.b0 = b0 / a0;
        self.b1 = b1 / a0;
        self.b2 = b2 / a0;
        self.a1 = a1 / a0;
        self.a2 = a2 / a0;
    }

    #[inline]
    fn tick(&mut self, x: f32) -> f32 {
        let y = self.b0 * x + self.b1 * self.x1 + self.b2 * self.x2
            - self.a1 * self.y1
            - self.a2 * self.y2;
        self.x2 = self.x1;
        self.x1 = x;
        self.y2 = self.y1;
        self.y1 = y;
        y
    }

    fn reset(&mut self) {
        self.x1 = 0.0;
        self.x2 = 0.0;
        self.y1 = 0.0;
        self.y2 = 0.0;
    }
}

/// Maximally flat lowpass of even order, as cascaded biquads.
///
/// Each section takes its Q from the Butterworth pole positions:
/// `Q_k = 1 / (2 cos(pi (2k + 1) / (2 N)))`.
///
/// # Examples
///
/// ```
/// use overtone::filters::Butterworth;
///
/// let mut lp = Butterworth::lowpass(4, 2_000.0, 48_000.0).unwrap();
/// let quiet = lp.tick(1.0);
/// assert!(quiet.abs() <= 1.0);
/// ```
#[derive(Debug, Clone)]
pub struct Butterworth {
    sections: Vec<Biquad>,
    order: usize,
    cutoff: f32,
    sample_rate: f32,
}

impl Butterworth {
    /// Creates an `order`-pole Butterworth lowpass. The order must be even
    /// and nonzero (each pair of poles becomes one biquad).
    pub fn lowpass(order: usize, cutoff: f32, sample_rate: f32) -> Result<Self> {
        if order == 0 || order % 2 != 0 {
            return Err(Error::InvalidArgument("Butterworth order must be even and nonzero"));
        }
        let mut f = Self {
            sections: vec![Biquad::default(); order / 2],
            order,
            cutoff: 0.0,
            sample_rate,
        };
        f.set_cutoff(cutoff);
        Ok(f)
    }

    /// Retunes the cutoff frequency in Hz. Clamped below Nyquist.
    pub fn set_cutoff(&mut self, cutoff: f32) {
        let cutoff = cutoff.clamp(1.0, self.sample_rate * 0.49);
        if cutoff == self.cutoff {
            return;
        }
        self.cutoff = cutoff;
        let n = self.order as f32;
        for (k, section) in self.sections.iter_mut().enumerate() {
            let q = 1.0 / (2.0 * (PI * (2.0 * k as f32 + 1.0) / (2.0 * n)).cos());
            section.set_lowpass(cutoff, q, self.sample_rate);
        }
    }

    /// Processes one sample through every section.
    #[inline]
    pub fn tick(&mut self, x: f32) -> f32 {
        let mut y = x;
        for section in &mut self.sections {
            y = section.tick(y);
        }
        y
    }

    /// Clears all section state.
    pub fn reset(&mut self) {
        for section in &mut self.sections {
            section.reset();
        }
    }
}
