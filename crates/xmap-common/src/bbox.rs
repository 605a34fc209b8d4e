//! Geographic bounding box types and operations.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum latitude representable in Web Mercator (degrees).
pub const MERCATOR_MAX_LAT: f64 = 85.051_128_779_806_59;

/// Margin (degrees) added on each side of a zero-extent axis.
///
/// A single point, or points sharing a latitude or longitude, would otherwise
/// produce a zero-area request that no zoom level can satisfy.
pub const DEGENERATE_PADDING_DEG: f64 = 0.005;

/// Extents below this are treated as zero.
const DEGENERATE_EPSILON: f64 = 1e-12;

/// A geographic bounding box in degrees (WGS84).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub lat_min: f64,
    pub lat_max: f64,
    pub lon_min: f64,
    pub lon_max: f64,
}

impl BoundingBox {
    /// Create a new bounding box from its extrema.
    pub fn new(lat_min: f64, lat_max: f64, lon_min: f64, lon_max: f64) -> Self {
        Self {
            lat_min,
            lat_max,
            lon_min,
            lon_max,
        }
    }

    /// Minimal box containing every `(lat, lon)` pair, or `None` for no points.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        let mut iter = points.into_iter();
        let (lat, lon) = iter.next()?;
        let mut bbox = Self::new(lat, lat, lon, lon);

        for (lat, lon) in iter {
            bbox.lat_min = bbox.lat_min.min(lat);
            bbox.lat_max = bbox.lat_max.max(lat);
            bbox.lon_min = bbox.lon_min.min(lon);
            bbox.lon_max = bbox.lon_max.max(lon);
        }

        Some(bbox)
    }

    /// Latitude extent in degrees.
    pub fn lat_extent(&self) -> f64 {
        self.lat_max - self.lat_min
    }

    /// Longitude extent in degrees.
    pub fn lon_extent(&self) -> f64 {
        self.lon_max - self.lon_min
    }

    /// True if either axis has zero extent.
    pub fn is_degenerate(&self) -> bool {
        self.lat_extent() <= DEGENERATE_EPSILON || self.lon_extent() <= DEGENERATE_EPSILON
    }

    /// Center of the box as `(lat, lon)`.
    pub fn center(&self) -> (f64, f64) {
        (
            (self.lat_min + self.lat_max) / 2.0,
            (self.lon_min + self.lon_max) / 2.0,
        )
    }

    /// Pad every zero-extent axis by `margin` degrees on each side.
    pub fn pad_degenerate(&self, margin: f64) -> Self {
        let mut bbox = *self;
        if bbox.lat_extent() <= DEGENERATE_EPSILON {
            bbox.lat_min -= margin;
            bbox.lat_max += margin;
        }
        if bbox.lon_extent() <= DEGENERATE_EPSILON {
            bbox.lon_min -= margin;
            bbox.lon_max += margin;
        }
        bbox
    }

    /// Extend the box on every side by `percentage` percent of its extent.
    pub fn extend(&self, percentage: f64) -> Self {
        let lat_pad = self.lat_extent() * percentage / 100.0;
        let lon_pad = self.lon_extent() * percentage / 100.0;

        Self {
            lat_min: self.lat_min - lat_pad,
            lat_max: self.lat_max + lat_pad,
            lon_min: self.lon_min - lon_pad,
            lon_max: self.lon_max + lon_pad,
        }
    }

    /// Clamp to the area Web Mercator tiles can show.
    pub fn clamp_to_mercator(&self) -> Self {
        Self {
            lat_min: self.lat_min.clamp(-MERCATOR_MAX_LAT, MERCATOR_MAX_LAT),
            lat_max: self.lat_max.clamp(-MERCATOR_MAX_LAT, MERCATOR_MAX_LAT),
            lon_min: self.lon_min.clamp(-180.0, 180.0),
            lon_max: self.lon_max.clamp(-180.0, 180.0),
        }
    }

    /// Check if a point is contained within this bbox (edges included).
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        lat >= self.lat_min && lat <= self.lat_max && lon >= self.lon_min && lon <= self.lon_max
    }

    /// Check if another bbox lies entirely within this one.
    pub fn contains_bbox(&self, other: &BoundingBox) -> bool {
        self.contains(other.lat_min, other.lon_min) && self.contains(other.lat_max, other.lon_max)
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "lat [{:.6}, {:.6}] lon [{:.6}, {:.6}]",
            self.lat_min, self.lat_max, self.lon_min, self.lon_max
        )
    }
}
