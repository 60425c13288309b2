//! Core signal trait.
//!
//! Everything that produces samples on its own — oscillators, noise
//! generators, the neuron model — implements [`Signal`]. Components that
//! consume input (envelope followers, detectors) instead expose explicit
//! `tick`/`detect` methods taking samples or blocks.

/// Common interface for sample-producing generators.
///
/// The per-sample path is `next_sample`; `process` fills a buffer and may be
/// overridden when a generator has a cheaper block form. Both are intended
/// to run on the audio thread: implementations never allocate, block, or
/// lock after construction.
pub trait Signal {
    /// Generates the next sample, nominally in [-1.0, 1.0].
    fn next_sample(&mut self) -> f32;

    /// Fills `buffer` with consecutive samples.
    fn process(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.next_sample();
        }
    }
}
