//! Shared test utilities for the wind forecast workspace.
//!
//! This crate provides common testing infrastructure including:
//! - Synthetic wind grid generators
//! - A manually driven clock and scripted grid fetchers
//! - Lookup of optional GRIB2 samples with a skip macro
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```
//!
//! ```ignore
//! use test_utils::{create_quad_grid, CountingFetcher, ManualClock};
//! ```

pub mod fixtures;
pub mod generators;
pub mod paths;

pub use fixtures::*;
pub use generators::*;
pub use paths::*;

/// Skip the current test when a sample file is not available.
///
/// Evaluates to the file's `PathBuf` when found. Otherwise prints a skip
/// message and returns from the enclosing test.
///
/// ```ignore
/// #[test]
/// fn test_decode_real_file() {
///     let path = test_utils::require_test_file!("gfs_wind_10m.grib2");
///     let bytes = std::fs::read(path).unwrap();
/// }
/// ```
#[macro_export]
macro_rules! require_test_file {
    ($name:expr) => {{
        match $crate::find_test_file($name) {
            Some(path) => path,
            None => {
                eprintln!(
                    "SKIPPED: Test file '{}' not found. Place it under testdata/ or set TEST_DATA_DIR.",
                    $name
                );
                return;
            }
        }
    }};
}

/// Assert two numbers are within `epsilon` of each other.
///
/// Both sides are widened to `f64` before comparing.
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let left: f64 = $left as f64;
        let right: f64 = $right as f64;
        let epsilon: f64 = $epsilon as f64;
        let diff = (left - right).abs();
        if diff > epsilon {
            panic!(
                "assertion failed: `(left ≈ right)`\n  left: `{:?}`,\n right: `{:?}`,\n  diff: `{:?}` > epsilon `{:?}`",
                left, right, diff, epsilon
            );
        }
    }};
}

/// Assert both components of a wind vector are within `epsilon` of `(u, v)`.
#[macro_export]
macro_rules! assert_wind_approx_eq {
    ($wind:expr, ($u:expr, $v:expr), $epsilon:expr) => {{
        let wind = $wind;
        $crate::assert_approx_eq!(wind.u, $u, $epsilon);
        $crate::assert_approx_eq!(wind.v, $v, $epsilon);
    }};
}
