//! Core trait definitions for oscillators.

/// Common interface for all oscillators.
///
/// This trait defines oscillator-specific functionality: frequency control
/// and state management. The sample-producing path is [`crate::Signal`].
pub trait Oscillator {
    /// Sets the frequency of the oscillator.
    ///
    /// Out-of-range frequencies are clamped: negative values freeze the
    /// phase at 0 Hz, values at or above Nyquist are pinned just below it.
    /// Setting the current frequency again is a cheap no-op.
    ///
    /// # Arguments
    ///
    /// * `frequency` - New frequency in Hz
    fn set_frequency(&mut self, frequency: f32);

    /// Gets the current frequency of the oscillator in Hz.
    fn frequency(&self) -> f32;

    /// Resets the oscillator to its initial state.
    fn reset(&mut self);
}
