//! Error types for mapcolor-graph

use thiserror::Error;

/// Errors that can occur while building or coloring a graph
#[derive(Debug, Error)]
pub enum GraphError {
    /// Core library error
    #[error("core error: {0}")]
    Core(#[from] mapcolor_core::Error),

    /// Compute backend error
    #[error("compute error: {0}")]
    Compute(#[from] mapcolor_compute::ComputeError),

    /// Vertex id outside `1..=vertex_count`
    #[error("vertex {id} out of range (graph has {count} vertices)")]
    VertexOutOfRange { id: usize, count: usize },

    /// Invalid parameters
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    /// The attempt cap was reached without an accepted coloring.
    ///
    /// `best` is the fewest colors of any complete attempt, `None` when
    /// every attempt ran out of tokens.
    #[error("coloring did not converge after {attempts} attempts ({})", best_summary(.best))]
    ColoringNotConverged { attempts: u64, best: Option<u32> },
}

fn best_summary(best: &Option<u32>) -> String {
    match best {
        Some(colors) => format!("best: {colors} colors"),
        None => "every attempt ran out of colors".to_string(),
    }
}

/// Result type for graph operations
pub type GraphResult<T> = Result<T, GraphError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_converged_message() {
        let err = GraphError::ColoringNotConverged {
            attempts: 3,
            best: Some(5),
        };
        assert_eq!(
            err.to_string(),
            "coloring did not converge after 3 attempts (best: 5 colors)"
        );
        let err = GraphError::ColoringNotConverged {
            attempts: 3,
            best: None,
        };
        assert!(err.to_string().ends_with("(every attempt ran out of colors)"));
    }
}
