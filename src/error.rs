//! Crate-wide error type.
//!
//! Every fallible configuration operation in this crate reports failure
//! through [`Error`] and leaves the previous state untouched. Nothing here is
//! fatal: the hot sample paths never return errors, only setters and
//! constructors do.

/// Errors reported by constructors and parameter setters.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// A parameter was outside its valid domain.
    #[error("{param} must be in {min}..{max}, got {value}")]
    OutOfRange {
        /// Name of the offending parameter.
        param: &'static str,
        /// Lower bound of the valid domain.
        min: f32,
        /// Upper bound of the valid domain.
        max: f32,
        /// The rejected value.
        value: f32,
    },

    /// A request would exceed a fixed-size buffer or memory budget.
    #[error("{what} requires {requested} samples but only {available} are available")]
    CapacityExceeded {
        /// What was being resized or allocated.
        what: &'static str,
        /// Number of samples requested.
        requested: usize,
        /// Number of samples actually available.
        available: usize,
    },

    /// A constructor argument was structurally invalid (empty table, zero
    /// block size, and so on).
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
