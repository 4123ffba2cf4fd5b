//! mapcolor-graph - Region adjacency graph and map coloring
//!
//! This crate provides:
//!
//! - [`AdjacencyMatrix`] - Bit-packed adjacency with configurable polarity
//! - [`Graph`] - Vertices, degrees and a sortable visiting order
//! - [`build_graph`] - Graph construction from a labeled mask
//! - [`ColoringEngine`] - Greedy bitmask coloring with randomized restarts
//!
//! # Examples
//!
//! ```
//! use mapcolor_graph::{ColoringOptions, Graph, Polarity, color_graph};
//!
//! // A 4-cycle needs two colors
//! let edges = [(1, 2), (2, 3), (3, 4), (4, 1)];
//! let mut graph = Graph::from_edges(4, &edges, Polarity::EdgeIsOne).unwrap();
//! let report = color_graph(&mut graph, &ColoringOptions::default()).unwrap();
//! assert!(report.colors <= 4);
//! assert!(graph.is_properly_colored());
//! ```

pub mod build;
pub mod coloring;
pub mod error;
pub mod graph;
pub mod matrix;

pub use build::{BuildMatrixUnit, GraphOptions, build_graph};
pub use coloring::{
    ColorToken, ColoringEngine, ColoringOptions, ColoringPhase, ColoringReport, color_graph,
};
pub use error::{GraphError, GraphResult};
pub use graph::{Graph, SortKey, Vertex, vertex_of_region};
pub use matrix::{AdjacencyMatrix, Polarity, row_stride};
