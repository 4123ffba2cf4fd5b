//! mapcolor-region - Parallel region labeling
//!
//! Splits an image into regions: 4-connected areas of interior pixels with
//! equal color, bounded by dark border pixels or by differently colored
//! areas. Labeling runs as a sequence of data-parallel compute units over a
//! shared atomic mask, and yields dense region ids `2..=N + 1`.
//!
//! # Examples
//!
//! ```
//! use mapcolor_compute::SerialBackend;
//! use mapcolor_core::{Raster, color};
//! use mapcolor_region::{LabelOptions, label_regions};
//!
//! // Two white halves split by a black column
//! let white = color::compose_rgb(255, 255, 255);
//! let black = color::compose_rgb(0, 0, 0);
//! let raster = Raster::from_pixels(3, 1, vec![white, black, white]).unwrap();
//!
//! let labeling = label_regions(&SerialBackend::new(), &raster, &LabelOptions::default()).unwrap();
//! assert_eq!(labeling.region_count, 2);
//! ```

pub mod error;
pub mod label;
pub mod units;

pub use error::{RegionError, RegionResult};
pub use label::{LabelOptions, LabelState, Labeling, label_mask, label_regions};
