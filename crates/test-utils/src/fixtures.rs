//! Common test fixtures for x-map tests.

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;
use xmap_common::Dataset;

/// Common bounding boxes as `(lat_min, lat_max, lon_min, lon_max)`.
pub mod bbox {
    /// Lower Manhattan to New Jersey, one degree square
    pub const NEW_YORK: (f64, f64, f64, f64) = (40.0, 41.0, -74.0, -73.0);

    /// Greater Zurich area
    pub const ZURICH: (f64, f64, f64, f64) = (47.3, 47.7, 8.3, 8.8);

    /// A few city blocks around Marienplatz, Munich
    pub const MUNICH_CENTER: (f64, f64, f64, f64) = (48.13, 48.145, 11.565, 11.585);
}

/// The two-row dataset used throughout the documentation:
/// `[(40, -73, 1), (41, -74, 2)]`.
pub fn example_rows() -> Vec<[f64; 3]> {
    vec![[40.0, -73.0, 1.0], [41.0, -74.0, 2.0]]
}

pub fn example_dataset() -> Dataset {
    Dataset::from_rows(&example_rows()).unwrap()
}

/// A GPS-like track around Zurich with two value columns
/// (speed and elevation). Row 7 has a missing speed sample.
pub fn track_dataset() -> Dataset {
    let rows: Vec<[f64; 4]> = (0..20)
        .map(|i| {
            let t = i as f64 / 19.0;
            let lat = 47.35 + 0.3 * t;
            let lon = 8.4 + 0.3 * (t * std::f64::consts::PI).sin();
            let speed = if i == 7 { f64::NAN } else { 10.0 + i as f64 };
            let elevation = 400.0 + 15.0 * i as f64;
            [lat, lon, speed, elevation]
        })
        .collect();
    Dataset::from_rows(&rows).unwrap()
}

/// Eleven samples along the equator from 0° to 1° east. Its bounding box
/// is far wider than tall.
pub fn east_west_track_dataset() -> Dataset {
    let rows: Vec<[f64; 3]> = (0..=10)
        .map(|i| [0.0, i as f64 * 0.1, i as f64])
        .collect();
    Dataset::from_rows(&rows).unwrap()
}

/// A single observation, giving a degenerate bounding box.
pub fn single_point_dataset() -> Dataset {
    Dataset::from_rows(&[[48.1374, 11.5755, 3.5]]).unwrap()
}

/// Coordinates only, no value columns.
pub fn coordinates_only_dataset() -> Dataset {
    Dataset::from_rows(&[[47.37, 8.54], [47.40, 8.60], [47.42, 8.50]]).unwrap()
}

/// Delimited text as read by the command line tool.
pub const EXAMPLE_CSV: &str = "\
# sample observations
lat,lon,temperature
40.0,-73.0,1
41.0,-74.0,2
";

/// Write `contents` to a file in a fresh temporary directory.
///
/// The directory is removed when the returned `TempDir` is dropped.
pub fn write_temp_file(name: &str, contents: &str) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    (dir, path)
}
