//! Fixed-budget sample memory arena.
//!
//! Real-time audio code plans its memory up front: every analysis buffer is
//! carved out of a fixed budget during setup, and nothing allocates once the
//! audio thread is running. [`Arena`] enforces that plan. It hands out zeroed
//! sample buffers while debiting a fixed capacity, and rejects requests that
//! would exceed it instead of growing.
//!
//! Ownership does the lifetime bookkeeping: an allocated buffer is an owned
//! value, so releasing it twice is unrepresentable, and dropping the arena
//! (bulk reset) simply invalidates its accounting, never live buffers.

use crate::error::{Error, Result};

/// A sample buffer carved out of an [`Arena`].
///
/// Dereferences to `[f32]`. Return it to the arena with [`Arena::release`]
/// to credit its samples back to the budget, or just drop it if the arena
/// is being torn down wholesale.
#[derive(Debug)]
pub struct ArenaBuf(Box<[f32]>);

impl std::ops::Deref for ArenaBuf {
    type Target = [f32];

    fn deref(&self) -> &[f32] {
        &self.0
    }
}

impl std::ops::DerefMut for ArenaBuf {
    fn deref_mut(&mut self) -> &mut [f32] {
        &mut self.0
    }
}

/// Fixed-capacity allocator for analysis and oscillator scratch buffers.
///
/// # Examples
///
/// ```
/// use overtone::arena::Arena;
///
/// let mut arena = Arena::new(1024);
/// let buf = arena.allocate(512).unwrap();
/// assert_eq!(buf.len(), 512);
/// assert_eq!(arena.available(), 512);
///
/// // The budget is a hard limit.
/// assert!(arena.allocate(513).is_err());
///
/// arena.release(buf);
/// assert_eq!(arena.available(), 1024);
/// ```
pub struct Arena {
    capacity: usize,
    used: usize,
}

impl Arena {
    /// Creates an arena with a budget of `capacity` samples.
    pub fn new(capacity: usize) -> Self {
        Self { capacity, used: 0 }
    }

    /// Total budget in samples.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Samples still available for allocation.
    pub fn available(&self) -> usize {
        self.capacity - self.used
    }

    /// Allocates a zeroed buffer of `len` samples from the budget.
    ///
    /// Fails with [`Error::CapacityExceeded`] if the remaining budget is too
    /// small; the arena is left unchanged in that case.
    pub fn allocate(&mut self, len: usize) -> Result<ArenaBuf> {
        if len > self.available() {
            return Err(Error::CapacityExceeded {
                what: "arena allocation",
                requested: len,
                available: self.available(),
            });
        }
        self.used += len;
        Ok(ArenaBuf(vec![0.0; len].into_boxed_slice()))
    }

    /// Returns a buffer's samples to the budget.
    pub fn release(&mut self, buf: ArenaBuf) {
        self.used = self.used.saturating_sub(buf.len());
    }
}
