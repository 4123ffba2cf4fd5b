//! mapcolor-io - Raster container I/O
//!
//! The pipeline consumes and produces 32-bit BMP files. Header and trailing
//! bytes of the source are preserved, so the output is the input with new
//! pixel values.
//!
//! # Examples
//!
//! ```
//! use mapcolor_core::Raster;
//! use mapcolor_io::BmpFile;
//!
//! let raster = Raster::filled(4, 4, 0xffffffff).unwrap();
//! let bytes = BmpFile::from_raster(raster).encode();
//! let bmp = BmpFile::decode(&bytes).unwrap();
//! assert_eq!((bmp.width(), bmp.height()), (4, 4));
//! ```

pub mod bmp;
mod error;

pub use bmp::{BmpFile, read_bmp, read_bmp_file, row_pitch, write_bmp, write_bmp_file};
pub use error::{IoError, IoResult};
