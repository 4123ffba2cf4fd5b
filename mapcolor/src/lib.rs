//! mapcolor - Four-color map coloring of raster images
//!
//! An image is split into regions (connected areas of one color, separated
//! by dark border pixels), the regions form an adjacency graph, and the
//! graph is colored greedily with at most four colors.
//!
//! # Overview
//!
//! - [`core`] - raster container, mask store, color helpers
//! - [`io`] - 32-bit BMP reading and writing
//! - [`compute`] - serial and thread pool backends for the parallel passes
//! - [`region`] - region labeling
//! - [`graph`] - adjacency matrix and coloring engine
//! - [`render`] / [`pipeline`] - output rendering and the end-to-end run
//!
//! # Example
//!
//! ```
//! use mapcolor::{PipelineOptions, Raster, SerialBackend, color_map};
//! use mapcolor::core::color::compose_rgb;
//!
//! // Two touching areas of different color
//! let left = compose_rgb(250, 200, 200);
//! let right = compose_rgb(200, 250, 200);
//! let raster = Raster::from_pixels(2, 2, vec![left, right, left, right]).unwrap();
//!
//! let colored = color_map(&SerialBackend::new(), &raster, &PipelineOptions::default()).unwrap();
//! assert_eq!(colored.report.regions, 2);
//! assert_eq!(colored.report.colors, 2);
//! ```

pub mod error;
pub mod pipeline;
pub mod render;

// Re-export domain crates as modules to avoid name conflicts
pub use mapcolor_compute as compute;
pub use mapcolor_core as core;
pub use mapcolor_graph as graph;
pub use mapcolor_io as io;
pub use mapcolor_region as region;

pub use error::{Error, Result};
pub use mapcolor_compute::{ComputeBackend, RayonBackend, SerialBackend};
pub use mapcolor_core::{MaskStore, Raster};
pub use pipeline::{BackendKind, ColoredMap, PipelineOptions, Report, color_map, run};
pub use render::{
    ApplyColorsUnit, DEFAULT_PALETTE, DebugMaskUnit, RenderOptions, debug_color, render,
};
