//! White noise generator implementation.

use crate::Signal;
use rand::Rng;

/// A white noise generator.
///
/// White noise has equal power across all frequencies. Each sample is
/// a random value uniformly distributed between -1.0 and 1.0.
pub struct WhiteNoise<R: Rng = rand::rngs::ThreadRng> {
    /// Random number generator
    rng: R,
}

impl WhiteNoise<rand::rngs::ThreadRng> {
    /// Creates a new white noise generator with the default ThreadRng.
    ///
    /// # Examples
    ///
    /// ```
    /// use overtone::{Signal, noise::WhiteNoise};
    ///
    /// let mut noise = WhiteNoise::new();
    /// let sample = noise.next_sample();
    /// assert!(sample.abs() <= 1.0);
    /// ```
    pub fn new() -> Self {
        Self {
            rng: rand::thread_rng(),
        }
    }
}

impl Default for WhiteNoise<rand::rngs::ThreadRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> WhiteNoise<R> {
    /// Creates a new white noise generator with a custom RNG.
    ///
    /// # Arguments
    ///
    /// * `rng` - Random number generator to use
    ///
    /// # Examples
    ///
    /// ```
    /// use overtone::{Signal, noise::WhiteNoise};
    /// use rand::SeedableRng;
    ///
    /// let rng = rand::rngs::StdRng::seed_from_u64(42);
    /// let mut noise = WhiteNoise::with_rng(rng);
    /// let sample = noise.next_sample();
    /// ```
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> Signal for WhiteNoise<R> {
    fn next_sample(&mut self) -> f32 {
        self.rng.gen_range(-1.0..=1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_sample_range() {
        let mut noise = WhiteNoise::new();
        for _ in 0..10_000 {
            let sample = noise.next_sample();
            assert!((-1.0..=1.0).contains(&sample));
        }
    }

    #[test]
    fn test_randomness() {
        let mut noise = WhiteNoise::new();
        let samples: Vec<f32> = (0..100).map(|_| noise.next_sample()).collect();
        let first = samples[0];
        let all_same = samples.iter().all(|&s| s == first);
        assert!(!all_same, "white noise should produce varying samples");
    }

    #[test]
    fn test_seeded_rng_is_deterministic() {
        let mut a = WhiteNoise::with_rng(rand::rngs::StdRng::seed_from_u64(7));
        let mut b = WhiteNoise::with_rng(rand::rngs::StdRng::seed_from_u64(7));
        for _ in 0..100 {
            assert_eq!(a.next_sample(), b.next_sample());
        }
    }

    #[test]
    fn test_mean_is_near_zero() {
        let mut noise = WhiteNoise::with_rng(rand::rngs::StdRng::seed_from_u64(1));
        let n = 100_000;
        let mut sum = 0.0;
        for _ in 0..n {
            sum += noise.next_sample();
        }
        assert!((sum / n as f32).abs() < 0.01);
    }

    #[test]
    fn test_process_buffer() {
        let mut noise = WhiteNoise::new();
        let mut buffer = vec![0.0; 128];
        noise.process(&mut buffer);

        for sample in buffer {
            assert!((-1.0..=1.0).contains(&sample));
        }
    }
}
