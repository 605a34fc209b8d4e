//! Test support for x-map crates.
//!
//! - `fixtures`: datasets, CSV text and temporary files
//! - `generators`: PNG tiles, offline tile fetchers and a recording map provider
//!
//! Nothing here opens a network connection.

pub mod fixtures;
pub mod generators;

pub use fixtures::*;
pub use generators::*;

/// Assert that two `(a, b)` pairs (lat/lon or pixel positions) agree
/// component-wise within `tolerance`.
///
/// ```ignore
/// assert_coords_approx_eq!(view.from_pixels(x, y), (40.5, -73.5), 1e-9);
/// ```
#[macro_export]
macro_rules! assert_coords_approx_eq {
    ($actual:expr, $expected:expr, $tolerance:expr) => {{
        let (a0, a1): (f64, f64) = $actual;
        let (e0, e1): (f64, f64) = $expected;
        let tolerance: f64 = $tolerance;
        if (a0 - e0).abs() > tolerance || (a1 - e1).abs() > tolerance {
            panic!(
                "coordinates differ: got ({}, {}), expected ({}, {}), tolerance {}",
                a0, a1, e0, e1, tolerance
            );
        }
    }};
}
