//! Regression test parameters and operations

use std::fs;
use std::path::{Path, PathBuf};

use tessera_core::PixelRegion;

use crate::synth::{region_text, render_ascii};
use crate::{TestResult, golden_dir, regout_dir};

/// Regression test mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegTestMode {
    /// Write golden files
    Generate,
    /// Compare results and golden files (default)
    #[default]
    Compare,
    /// Compare values and regions, skip golden files and print mismatches
    Display,
}

impl RegTestMode {
    /// Parse mode from the `REGTEST_MODE` environment variable
    pub fn from_env() -> Self {
        match std::env::var("REGTEST_MODE")
            .unwrap_or_default()
            .to_lowercase()
            .as_str()
        {
            "generate" => Self::Generate,
            "display" => Self::Display,
            _ => Self::Compare,
        }
    }
}

/// Regression test parameters
///
/// Tracks the test name, the running comparison index and every failure.
pub struct RegParams {
    /// Name of the test (e.g., "dilate")
    pub test_name: String,
    /// Current test index (incremented before each comparison)
    index: usize,
    /// Test mode
    pub mode: RegTestMode,
    /// Overall success status
    success: bool,
    /// Recorded failures
    failures: Vec<String>,
    /// Where golden files are read and written
    golden_dir: PathBuf,
    /// Where results are written before a golden check
    regout_dir: PathBuf,
}

impl RegParams {
    /// Create new regression test parameters
    ///
    /// # Arguments
    ///
    /// * `test_name` - Name of the test (e.g., "dilate")
    pub fn new(test_name: &str) -> Self {
        let mode = RegTestMode::from_env();

        eprintln!();
        eprintln!("////////////////////////////////////////////////");
        eprintln!("////////////////   {}_reg   ///////////////", test_name);
        eprintln!("////////////////////////////////////////////////");
        eprintln!("Mode: {:?}", mode);

        Self {
            test_name: test_name.to_string(),
            index: 0,
            mode,
            success: true,
            failures: Vec::new(),
            golden_dir: golden_dir(),
            regout_dir: regout_dir(),
        }
    }

    /// Use other golden and output directories
    pub fn with_dirs(mut self, golden: impl Into<PathBuf>, regout: impl Into<PathBuf>) -> Self {
        self.golden_dir = golden.into();
        self.regout_dir = regout.into();
        self
    }

    /// Get the current test index
    pub fn index(&self) -> usize {
        self.index
    }

    /// Check if in display mode
    pub fn display(&self) -> bool {
        self.mode == RegTestMode::Display
    }

    fn fail(&mut self, msg: String) -> bool {
        eprintln!("{}", msg);
        self.failures.push(msg);
        self.success = false;
        false
    }

    /// Compare two floating-point values
    ///
    /// # Arguments
    ///
    /// * `expected` - Expected value
    /// * `actual` - Actual computed value
    /// * `delta` - Maximum allowed difference
    ///
    /// # Returns
    ///
    /// `true` if values match within delta, `false` otherwise.
    pub fn compare_values(&mut self, expected: f64, actual: f64, delta: f64) -> bool {
        self.index += 1;
        let diff = (expected - actual).abs();

        if diff > delta || diff.is_nan() {
            let msg = format!(
                "Failure in {}_reg: value comparison for index {}\n\
                 difference = {} but allowed delta = {}\n\
                 expected = {}, actual = {}",
                self.test_name, self.index, diff, delta, expected, actual
            );
            self.fail(msg)
        } else {
            true
        }
    }

    /// Compare two regions for exact equality of every sample
    pub fn compare_regions(&mut self, a: &PixelRegion, b: &PixelRegion) -> bool {
        self.compare_regions_within(a, b, 0.0)
    }

    /// Compare two regions sample by sample within `delta`
    ///
    /// Rectangles and band counts must match exactly; element types and
    /// storage layouts may differ.
    pub fn compare_regions_within(&mut self, a: &PixelRegion, b: &PixelRegion, delta: f64) -> bool {
        self.index += 1;

        if a.rect() != b.rect() || a.bands() != b.bands() {
            let msg = format!(
                "Failure in {}_reg: region comparison for index {} - shape mismatch\n\
                 {:?} x {} bands vs {:?} x {} bands",
                self.test_name,
                self.index,
                a.rect(),
                a.bands(),
                b.rect(),
                b.bands()
            );
            return self.fail(msg);
        }

        let rect = a.rect();
        for y in rect.y..rect.bottom() {
            for x in rect.x..rect.right() {
                for band in 0..a.bands() {
                    let (va, vb) = (a.get(x, y, band), b.get(x, y, band));
                    let same = match (va, vb) {
                        (Some(p), Some(q)) => (p - q).abs() <= delta,
                        _ => false,
                    };
                    if !same {
                        let msg = format!(
                            "Failure in {}_reg: region comparison for index {} - \
                             sample mismatch at ({}, {}) band {}: {:?} vs {:?}",
                            self.test_name, self.index, x, y, band, va, vb
                        );
                        if self.display() {
                            eprintln!("{}\n--- vs ---\n{}", render_ascii(a), render_ascii(b));
                        }
                        return self.fail(msg);
                    }
                }
            }
        }

        true
    }

    /// Write data to a file and check it against its golden file
    ///
    /// # Arguments
    ///
    /// * `data` - Data to write
    /// * `ext` - File extension (e.g., "txt")
    ///
    /// # Errors
    ///
    /// Returns an error if a file cannot be written or read. A missing or
    /// differing golden file is recorded as a failure instead.
    pub fn write_data_and_check(&mut self, data: &[u8], ext: &str) -> TestResult<()> {
        self.index += 1;

        fs::create_dir_all(&self.regout_dir)?;
        let local_path = self
            .regout_dir
            .join(format!("{}.{:02}.{}", self.test_name, self.index, ext));
        fs::write(&local_path, data)?;
        self.check_file(&local_path, ext)
    }

    /// Write every sample of a region as text and check it against its golden file
    pub fn write_region_and_check(&mut self, region: &PixelRegion) -> TestResult<()> {
        self.write_data_and_check(region_text(region).as_bytes(), "txt")
    }

    /// Check a file against its golden counterpart
    ///
    /// In generate mode, copies the file to golden.
    /// In compare mode, compares with golden file.
    /// In display mode, does nothing.
    fn check_file(&mut self, local_path: &Path, ext: &str) -> TestResult<()> {
        let golden_path = self
            .golden_dir
            .join(format!("{}_golden.{:02}.{}", self.test_name, self.index, ext));

        match self.mode {
            RegTestMode::Generate => {
                fs::create_dir_all(&self.golden_dir)?;
                fs::copy(local_path, &golden_path)?;
                eprintln!("Generated: {}", golden_path.display());
            }
            RegTestMode::Compare => {
                if !golden_path.exists() {
                    let msg = format!(
                        "Failure in {}_reg: golden file not found: {}",
                        self.test_name,
                        golden_path.display()
                    );
                    self.fail(msg);
                    return Ok(());
                }
                if fs::read(local_path)? != fs::read(&golden_path)? {
                    let msg = format!(
                        "Failure in {}_reg: file comparison for index {}\n\
                         {} differs from {}",
                        self.test_name,
                        self.index,
                        local_path.display(),
                        golden_path.display()
                    );
                    self.fail(msg);
                }
            }
            RegTestMode::Display => {}
        }
        Ok(())
    }

    /// Clean up and report results
    ///
    /// # Returns
    ///
    /// `true` if all comparisons passed, `false` if any failed.
    pub fn cleanup(self) -> bool {
        if self.success {
            eprintln!("SUCCESS: {}_reg", self.test_name);
        } else {
            eprintln!("FAILURE: {}_reg", self.test_name);
            for failure in &self.failures {
                eprintln!("  {}", failure);
            }
        }
        eprintln!();

        self.success
    }

    /// Check if all comparisons have passed so far
    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Get list of failures
    pub fn failures(&self) -> &[String] {
        &self.failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synth::{binary_from_rows, constant_region};
    use tessera_core::{ElementType, Rect};

    fn scratch_dirs(name: &str) -> (PathBuf, PathBuf) {
        let root = std::env::temp_dir().join(format!("tessera-test-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&root);
        (root.join("golden"), root.join("regout"))
    }

    #[test]
    fn test_mode_from_env() {
        let mode = RegTestMode::from_env();
        assert!(matches!(
            mode,
            RegTestMode::Compare | RegTestMode::Generate | RegTestMode::Display
        ));
    }

    #[test]
    fn test_generate_then_compare() {
        let (golden, regout) = scratch_dirs("generate");
        let region = constant_region(Rect::sized(3, 2), 1, ElementType::Short, -4.0).unwrap();

        let mut rp = RegParams::new("golden").with_dirs(&golden, &regout);
        rp.mode = RegTestMode::Generate;
        rp.write_region_and_check(&region).unwrap();
        rp.write_data_and_check(b"seven", "dat").unwrap();
        assert!(golden.join("golden_golden.01.txt").exists());
        assert!(golden.join("golden_golden.02.dat").exists());
        assert!(rp.cleanup());

        let mut rp = RegParams::new("golden").with_dirs(&golden, &regout);
        rp.mode = RegTestMode::Compare;
        rp.write_region_and_check(&region).unwrap();
        rp.write_data_and_check(b"eight", "dat").unwrap();
        assert_eq!(rp.index(), 2);
        assert_eq!(rp.failures().len(), 1);
        assert!(rp.failures()[0].contains("file comparison for index 2"));
    }

    #[test]
    fn test_missing_golden_file() {
        let (golden, regout) = scratch_dirs("missing");

        let mut rp = RegParams::new("missing").with_dirs(&golden, &regout);
        rp.mode = RegTestMode::Compare;
        rp.write_data_and_check(b"data", "dat").unwrap();
        assert!(!rp.is_success());
        assert!(rp.failures()[0].contains("golden file not found"));

        let mut rp = RegParams::new("missing").with_dirs(&golden, &regout);
        rp.mode = RegTestMode::Display;
        rp.write_data_and_check(b"data", "dat").unwrap();
        assert!(rp.cleanup());
    }

    #[test]
    fn test_compare_values_within_delta() {
        let mut rp = RegParams::new("test");
        assert!(rp.compare_values(100.0, 100.5, 1.0));
        assert!(rp.is_success());
        assert_eq!(rp.index(), 1);
    }

    #[test]
    fn test_compare_values_failure() {
        let mut rp = RegParams::new("test");
        assert!(!rp.compare_values(100.0, 200.0, 0.0));
        assert!(!rp.compare_values(0.0, f64::NAN, 1.0));
        assert!(!rp.is_success());
        assert_eq!(rp.failures().len(), 2);
    }

    #[test]
    fn test_compare_regions() {
        let mut rp = RegParams::new("test");
        let a = constant_region(Rect::sized(3, 2), 2, ElementType::Byte, 7.0).unwrap();
        let b = constant_region(Rect::sized(3, 2), 2, ElementType::Float, 7.25).unwrap();
        assert!(rp.compare_regions_within(&a, &b, 0.5));
        assert!(!rp.compare_regions(&a, &b));

        let c = binary_from_rows(&["x..", ".x."]).unwrap();
        assert!(!rp.compare_regions(&a, &c));
        assert_eq!(rp.index(), 3);
    }
}
