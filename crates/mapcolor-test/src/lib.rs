//! mapcolor-test - Regression test framework for mapcolor
//!
//! Supports three modes, selected by the `REGTEST_MODE` environment
//! variable:
//!
//! - **Generate**: Create golden files for comparison
//! - **Compare**: Compare results with golden files (default)
//! - **Display**: Run tests without comparison
//!
//! # Usage
//!
//! ```ignore
//! use mapcolor_test::{RegParams, ascii_map};
//!
//! let raster = ascii_map(&["AA#B", "AA#B"]).unwrap();
//! let mut rp = RegParams::new("label");
//! rp.compare_values(2.0, region_count as f64, 0.0);
//! assert!(rp.cleanup());
//! ```

mod error;
mod maps;
mod params;

pub use error::{TestError, TestResult};
pub use maps::{
    BORDER_PIXEL, ReferenceLabels, ascii_map, letter_color, reference_labels, same_partition,
};
pub use params::{RegParams, RegTestMode};

use mapcolor_core::Raster;

/// Get the path to the workspace root
fn workspace_root() -> String {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    // mapcolor-test is at crates/mapcolor-test, so go up two directories
    format!("{}/../..", manifest_dir)
}

/// Get the path to the golden files directory
pub fn golden_dir() -> String {
    format!("{}/tests/golden", workspace_root())
}

/// Get the path to the regout (regression output) directory
pub fn regout_dir() -> String {
    format!("{}/tests/regout", workspace_root())
}

/// Path of a file inside the regout directory.
pub fn regout_path(name: &str) -> String {
    format!("{}/{}", regout_dir(), name)
}

/// Write `raster` as a BMP file into the regout directory, returning its path.
pub fn write_test_bmp(name: &str, raster: &Raster) -> TestResult<String> {
    std::fs::create_dir_all(regout_dir())?;
    let path = regout_path(name);
    mapcolor_io::write_bmp_file(&mapcolor_io::BmpFile::from_raster(raster.clone()), &path)
        .map_err(|e| TestError::ImageWrite {
            path: path.clone(),
            message: e.to_string(),
        })?;
    Ok(path)
}

/// Read the pixels of a BMP file.
pub fn load_test_bmp(path: &str) -> TestResult<Raster> {
    mapcolor_io::read_bmp_file(path)
        .map(|bmp| bmp.into_raster())
        .map_err(|e| TestError::ImageLoad {
            path: path.to_string(),
            message: e.to_string(),
        })
}
