//! mapcolor-compute - Data-parallel execution for the mapcolor pipeline
//!
//! Every pass of the labeling and graph stages is expressed as a
//! [`ComputeUnit`] dispatched over an [`IndexSpace`]. A backend decides how
//! the work-items run:
//!
//! - [`SerialBackend`] - one thread, id order, reproducible
//! - [`RayonBackend`] - a rayon thread pool
//!
//! # Examples
//!
//! ```
//! use mapcolor_compute::{ComputeBackend, ComputeUnit, IndexSpace, SerialBackend, WorkItem};
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! struct Count(AtomicUsize);
//!
//! impl ComputeUnit for Count {
//!     fn name(&self) -> &'static str {
//!         "count"
//!     }
//!     fn execute(&self, _item: WorkItem) {
//!         self.0.fetch_add(1, Ordering::Relaxed);
//!     }
//! }
//!
//! let unit = Count(AtomicUsize::new(0));
//! SerialBackend::new().run(&unit, IndexSpace::grid(4, 3).unwrap()).unwrap();
//! assert_eq!(unit.0.load(Ordering::Relaxed), 12);
//! ```

pub mod backend;
pub mod error;
pub mod unit;

pub use backend::{ComputeBackend, RayonBackend, SerialBackend};
pub use error::{ComputeError, ComputeResult};
pub use unit::{ComputeUnit, IndexSpace, WorkItem};
