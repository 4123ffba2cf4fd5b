//! Error types for mapcolor-core

use thiserror::Error;

/// Errors of the raster, mask and buffer types
#[derive(Error, Debug)]
pub enum Error {
    /// A raster or mask needs at least one row and one column
    #[error("invalid grid size {width}x{height}")]
    InvalidDimension { width: u32, height: u32 },

    /// Two grids that must line up have different sizes
    #[error("grid size mismatch: expected {}x{}, got {}x{}", .expected.0, .expected.1, .actual.0, .actual.1)]
    DimensionMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },

    /// Pixel buffer length does not match the declared dimensions
    #[error("pixel buffer holds {actual} values, {expected} required")]
    BufferLength { expected: usize, actual: usize },

    /// A buffer could not be reserved
    #[error("cannot allocate {what} ({len} elements)")]
    AllocationFailed { what: &'static str, len: usize },
}

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, Error>;
