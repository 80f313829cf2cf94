//! tessera-test - Regression test framework for tessera
//!
//! Tests record numbered comparisons on a [`RegParams`] and assert on
//! [`RegParams::cleanup`] at the end, which prints a summary of every
//! failure instead of stopping at the first one. Results can also be
//! written out and checked against golden files under `tests/golden`.
//!
//! # Usage
//!
//! ```ignore
//! use tessera_test::RegParams;
//!
//! let mut rp = RegParams::new("dilate");
//! rp.compare_values(9.0, count as f64, 0.0);
//! assert!(rp.cleanup());
//! ```
//!
//! # Environment Variables
//!
//! - `REGTEST_MODE`: Set to "generate", "compare" (default) or "display".
//!   Generate mode writes golden files, and display mode skips golden
//!   checks and prints mismatching regions as ASCII art.

mod error;
mod params;
pub mod synth;

pub use error::{TestError, TestResult};
pub use params::{RegParams, RegTestMode};
pub use synth::{
    binary_filled, binary_from_rows, constant_region, gradient_region, region_text, render_ascii,
    rgb_region,
};

use std::path::PathBuf;

/// Get the path to the workspace root
fn workspace_root() -> PathBuf {
    // tessera-test is at crates/tessera-test
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../..")
}

/// Get the path to the golden files directory
pub fn golden_dir() -> PathBuf {
    workspace_root().join("tests/golden")
}

/// Get the path to the regout (regression output) directory
pub fn regout_dir() -> PathBuf {
    workspace_root().join("tests/regout")
}
