//! Pink noise generator implementation.

use crate::Signal;
use rand::Rng;

/// A pink noise generator.
///
/// Pink noise (1/f noise) has equal power per octave, so it carries more
/// energy at low frequencies than white noise. This implementation filters
/// white noise through Paul Kellet's economy three-pole approximation,
/// which tracks the ideal -3 dB/octave slope to within fractions of a dB
/// across the audio band.
pub struct PinkNoise<R: Rng = rand::rngs::ThreadRng> {
    /// Random number generator
    rng: R,
    /// First pole state (slowest).
    b0: f32,
    /// Second pole state.
    b1: f32,
    /// Third pole state (fastest).
    b2: f32,
}

impl PinkNoise<rand::rngs::ThreadRng> {
    /// Creates a new pink noise generator with the default ThreadRng.
    ///
    /// # Examples
    ///
    /// ```
    /// use overtone::{Signal, noise::PinkNoise};
    ///
    /// let mut noise = PinkNoise::new();
    /// let sample = noise.next_sample();
    /// assert!(sample.abs() <= 1.5);
    /// ```
    pub fn new() -> Self {
        Self::with_rng(rand::thread_rng())
    }
}

impl Default for PinkNoise<rand::rngs::ThreadRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> PinkNoise<R> {
    /// Creates a new pink noise generator with a custom RNG.
    ///
    /// # Arguments
    ///
    /// * `rng` - Random number generator to use
    ///
    /// # Examples
    ///
    /// ```
    /// use overtone::{Signal, noise::PinkNoise};
    /// use rand::SeedableRng;
    ///
    /// let rng = rand::rngs::StdRng::seed_from_u64(42);
    /// let mut noise = PinkNoise::with_rng(rng);
    /// let sample = noise.next_sample();
    /// ```
    pub fn with_rng(rng: R) -> Self {
        Self {
            rng,
            b0: 0.0,
            b1: 0.0,
            b2: 0.0,
        }
    }
}

impl<R: Rng> Signal for PinkNoise<R> {
    fn next_sample(&mut self) -> f32 {
        let white: f32 = self.rng.gen_range(-1.0..=1.0);

        // Kellet's economy coefficients, tuned for 44.1 kHz but serviceable
        // at any common audio rate.
        self.b0 = 0.997_65 * self.b0 + white * 0.099_046;
        self.b1 = 0.963 * self.b1 + white * 0.296_516_4;
        self.b2 = 0.57 * self.b2 + white * 1.052_691_3;

        // Sum of the poles plus a direct white tap, scaled back to roughly
        // unit peak amplitude.
        (self.b0 + self.b1 + self.b2 + white * 0.1848) * 0.05
    }
}
