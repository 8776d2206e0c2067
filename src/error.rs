//! Error types.
//!
//! Drawing is infallible by contract (out-of-range input is clipped or
//! ignored); the only reportable failure is running out of flood-fill
//! stack.

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FillError {
    /// The span stack bound was exceeded. The canvas is left partially
    /// filled.
    #[error("flood fill span stack exhausted ({capacity} bytes)")]
    StackOverflow { capacity: usize },
}

pub type Result<T> = core::result::Result<T, FillError>;
