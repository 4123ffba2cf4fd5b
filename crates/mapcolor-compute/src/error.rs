//! Error types for mapcolor-compute

use thiserror::Error;

/// Errors raised while acquiring or driving a compute backend
#[derive(Debug, Error)]
pub enum ComputeError {
    /// The worker pool could not be created
    #[error("cannot create worker pool: {0}")]
    PoolCreation(#[from] rayon::ThreadPoolBuildError),

    /// The index space does not fit in memory addressing
    #[error("index space {width}x{height} is too large")]
    IndexSpaceOverflow { width: u32, height: u32 },

    /// A work-item of the named unit panicked
    #[error("compute unit '{unit}' failed: {message}")]
    UnitFailed { unit: &'static str, message: String },
}

/// Result type for compute operations
pub type ComputeResult<T> = Result<T, ComputeError>;
