//! Fixed-capacity ring buffer for analysis windows.
//!
//! The analysis components (SNAC, period detector, block energy) all keep a
//! sliding window over the most recent input. This type owns that pattern so
//! the wrap-around arithmetic is written (and tested) exactly once. Capacity
//! is fixed at construction; pushing never allocates.

/// A fixed-capacity ring buffer of samples.
///
/// Writes overwrite the oldest sample once the buffer is full. Reads are
/// addressed relative to the most recent write, so `recent(0)` is the last
/// sample pushed and `recent(capacity - 1)` is the oldest retained one.
///
/// # Examples
///
/// ```
/// use overtone::ring::RingBuffer;
///
/// let mut ring = RingBuffer::new(4);
/// for x in [1.0, 2.0, 3.0, 4.0, 5.0] {
///     ring.push(x);
/// }
/// assert_eq!(ring.recent(0), 5.0);
/// assert_eq!(ring.recent(3), 2.0); // 1.0 was overwritten
/// ```
pub struct RingBuffer {
    data: Box<[f32]>,
    /// Next write position.
    write: usize,
    /// Total samples ever pushed, saturating at capacity.
    filled: usize,
}

impl RingBuffer {
    /// Creates a ring buffer holding `capacity` samples, initially zeroed.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "ring buffer capacity must be nonzero");
        Self {
            data: vec![0.0; capacity].into_boxed_slice(),
            write: 0,
            filled: 0,
        }
    }

    /// Number of samples the buffer can hold.
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Number of valid samples currently held (saturates at capacity).
    pub fn len(&self) -> usize {
        self.filled
    }

    /// True until the first push.
    pub fn is_empty(&self) -> bool {
        self.filled == 0
    }

    /// Appends one sample, overwriting the oldest if full.
    #[inline]
    pub fn push(&mut self, sample: f32) {
        self.data[self.write] = sample;
        self.write += 1;
        if self.write == self.data.len() {
            self.write = 0;
        }
        if self.filled < self.data.len() {
            self.filled += 1;
        }
    }

    /// Returns the sample pushed `age` steps ago (`age = 0` is the newest).
    ///
    /// Ages beyond the capacity wrap; callers are expected to stay within it.
    #[inline]
    pub fn recent(&self, age: usize) -> f32 {
        let cap = self.data.len();
        let idx = (self.write + cap - 1 - (age % cap)) % cap;
        self.data[idx]
    }

    /// Copies the most recent `out.len()` samples into `out`, oldest first.
    ///
    /// `out` must not be longer than the capacity.
    pub fn copy_latest(&self, out: &mut [f32]) {
        let n = out.len();
        debug_assert!(n <= self.data.len());
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = self.recent(n - 1 - i);
        }
    }

    /// Clears the buffer back to silence.
    pub fn reset(&mut self) {
        self.data.fill(0.0);
        self.write = 0;
        self.filled = 0;
    }
}
