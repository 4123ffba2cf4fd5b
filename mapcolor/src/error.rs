//! Error type of the end-to-end pipeline

use thiserror::Error;

/// Errors raised by [`crate::pipeline`] and [`crate::render`].
#[derive(Error, Debug)]
pub enum Error {
    /// Reading or writing the container failed
    #[error(transparent)]
    Io(#[from] mapcolor_io::IoError),

    /// Region labeling failed
    #[error(transparent)]
    Region(#[from] mapcolor_region::RegionError),

    /// Graph construction or coloring failed
    #[error(transparent)]
    Graph(#[from] mapcolor_graph::GraphError),

    /// A compute backend could not be created or a unit failed
    #[error(transparent)]
    Compute(#[from] mapcolor_compute::ComputeError),

    /// An error from the core library
    #[error(transparent)]
    Core(#[from] mapcolor_core::Error),

    /// The render palette is empty
    #[error("render palette must contain at least one color")]
    EmptyPalette,
}

impl Error {
    /// Validation code of a rejected input container, if this error is one.
    pub fn format_code(&self) -> Option<u8> {
        match self {
            Error::Io(e) => e.code(),
            _ => None,
        }
    }
}

/// Result type alias for the pipeline
pub type Result<T> = std::result::Result<T, Error>;
