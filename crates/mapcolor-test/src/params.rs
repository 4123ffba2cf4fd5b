//! Regression test parameters and checks
//!
//! Every check bumps a running index, so a failure message like
//! `label_reg #4` points at the fourth check of that test. Files written by
//! a check are named `<test>.<index>.<ext>` in the regout directory and are
//! compared against `<test>_golden.<index>.<ext>` in the golden directory.

use crate::error::{TestError, TestResult};
use crate::{golden_dir, regout_dir};
use mapcolor_core::Raster;
use mapcolor_io::BmpFile;
use std::fs;
use std::path::Path;

/// What file checks do with golden files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegTestMode {
    /// Copy outputs over the golden files
    Generate,
    /// Compare outputs with existing golden files
    #[default]
    Compare,
    /// Only write outputs
    Display,
}

impl RegTestMode {
    /// Mode named by `REGTEST_MODE`; anything unknown means compare.
    pub fn from_env() -> Self {
        let value = std::env::var("REGTEST_MODE").unwrap_or_default();
        if value.eq_ignore_ascii_case("generate") {
            Self::Generate
        } else if value.eq_ignore_ascii_case("display") {
            Self::Display
        } else {
            Self::Compare
        }
    }
}

/// State of one regression test.
pub struct RegParams {
    pub test_name: String,
    pub mode: RegTestMode,
    index: usize,
    failures: Vec<String>,
}

impl RegParams {
    /// Start a test; the mode comes from `REGTEST_MODE`.
    pub fn new(test_name: &str) -> Self {
        let mode = RegTestMode::from_env();
        let _ = fs::create_dir_all(golden_dir());
        let _ = fs::create_dir_all(regout_dir());
        eprintln!("\n==== {}_reg ({:?}) ====", test_name, mode);

        Self {
            test_name: test_name.to_string(),
            mode,
            index: 0,
            failures: Vec::new(),
        }
    }

    /// Index of the last check.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Whether golden files are ignored.
    pub fn display(&self) -> bool {
        self.mode == RegTestMode::Display
    }

    /// Count a check and record `detail` if it failed.
    fn record<F: FnOnce() -> String>(&mut self, ok: bool, detail: F) -> bool {
        self.index += 1;
        if !ok {
            let msg = format!("{}_reg #{}: {}", self.test_name, self.index, detail());
            eprintln!("{}", msg);
            self.failures.push(msg);
        }
        ok
    }

    /// `actual` lies within `delta` of `expected`.
    pub fn compare_values(&mut self, expected: f64, actual: f64, delta: f64) -> bool {
        let diff = (expected - actual).abs();
        self.record(diff <= delta, || {
            format!("expected {expected}, got {actual} (diff {diff} > {delta})")
        })
    }

    /// Both rasters have the same size and pixels.
    pub fn compare_raster(&mut self, raster1: &Raster, raster2: &Raster) -> bool {
        if !raster1.sizes_equal(raster2) {
            return self.record(false, || {
                format!(
                    "raster size {}x{} vs {}x{}",
                    raster1.width(),
                    raster1.height(),
                    raster2.width(),
                    raster2.height()
                )
            });
        }
        let width = raster1.width() as usize;
        let mismatch = raster1
            .data()
            .iter()
            .zip(raster2.data())
            .position(|(a, b)| a != b);
        self.record(mismatch.is_none(), || {
            let i = mismatch.unwrap_or_default();
            format!(
                "pixel ({}, {}) differs: {:08x} vs {:08x}",
                i % width,
                i / width,
                raster1.data()[i],
                raster2.data()[i]
            )
        })
    }

    /// Both byte strings are equal.
    pub fn compare_strings(&mut self, data1: &[u8], data2: &[u8]) -> bool {
        self.record(data1 == data2, || {
            let at = data1
                .iter()
                .zip(data2)
                .position(|(a, b)| a != b)
                .unwrap_or(data1.len().min(data2.len()));
            format!(
                "bytes differ at offset {} ({} vs {} bytes)",
                at,
                data1.len(),
                data2.len()
            )
        })
    }

    fn output_path(&self, ext: &str) -> String {
        format!("{}/{}.{:02}.{}", regout_dir(), self.test_name, self.index, ext)
    }

    /// Save `raster` as BMP and check it against its golden file.
    pub fn write_raster_and_check(&mut self, raster: &Raster) -> TestResult<()> {
        self.index += 1;
        let path = self.output_path("bmp");
        fs::write(&path, BmpFile::from_raster(raster.clone()).encode()).map_err(|e| {
            TestError::ImageWrite {
                path: path.clone(),
                message: e.to_string(),
            }
        })?;
        self.check_file(&path, "bmp")
    }

    /// Save `data` with extension `ext` and check it against its golden
    /// file.
    pub fn write_data_and_check(&mut self, data: &[u8], ext: &str) -> TestResult<()> {
        self.index += 1;
        let path = self.output_path(ext);
        fs::write(&path, data)?;
        self.check_file(&path, ext)
    }

    fn check_file(&mut self, path: &str, ext: &str) -> TestResult<()> {
        let golden = format!(
            "{}/{}_golden.{:02}.{}",
            golden_dir(),
            self.test_name,
            self.index,
            ext
        );
        match self.mode {
            RegTestMode::Generate => {
                fs::copy(path, &golden)?;
                eprintln!("wrote golden {}", golden);
            }
            RegTestMode::Compare if Path::new(&golden).exists() => {
                if fs::read(path)? != fs::read(&golden)? {
                    let msg = format!(
                        "{}_reg #{}: {} differs from {}",
                        self.test_name, self.index, path, golden
                    );
                    eprintln!("{}", msg);
                    self.failures.push(msg);
                }
            }
            RegTestMode::Compare => {
                eprintln!("no golden for {}_reg #{}", self.test_name, self.index);
            }
            RegTestMode::Display => {}
        }
        Ok(())
    }

    /// Print the summary; `true` if every check passed.
    pub fn cleanup(self) -> bool {
        let ok = self.failures.is_empty();
        eprintln!(
            "{}: {}_reg ({} checks, {} failed)",
            if ok { "SUCCESS" } else { "FAILURE" },
            self.test_name,
            self.index,
            self.failures.len()
        );
        for failure in &self.failures {
            eprintln!("  {}", failure);
        }
        ok
    }

    /// Whether every check so far passed.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Messages of the failed checks.
    pub fn failures(&self) -> &[String] {
        &self.failures
    }
}
