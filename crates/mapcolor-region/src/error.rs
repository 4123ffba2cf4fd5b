//! Error types for mapcolor-region

use thiserror::Error;

/// Errors that can occur during region labeling
#[derive(Debug, Error)]
pub enum RegionError {
    /// Core library error
    #[error("core error: {0}")]
    Core(#[from] mapcolor_core::Error),

    /// Compute backend error
    #[error("compute error: {0}")]
    Compute(#[from] mapcolor_compute::ComputeError),

    /// More raw ids were claimed than the mapping table can tag
    #[error("raw region id space exhausted: {claimed} ids claimed, limit {limit}")]
    IdSpaceExhausted { claimed: u32, limit: u32 },

    /// A pass was run before the pass it depends on
    #[error("labeling pass '{pass}' requires '{requires}' to run first")]
    PassOrder {
        pass: &'static str,
        requires: &'static str,
    },
}

/// Result type for region operations
pub type RegionResult<T> = Result<T, RegionError>;
