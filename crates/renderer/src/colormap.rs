//! Colormaps and value scaling for plotted series.

use image::Rgba;
use serde::{Deserialize, Serialize};
use xmap_common::{Color, ColorStop};

/// Decile samples of matplotlib's `plasma`.
const PLASMA: [&str; 11] = [
    "#0d0887", "#41049d", "#6a00a8", "#8f0da4", "#b12a90", "#cc4778", "#e16462", "#f2844b",
    "#fca636", "#fcce25", "#f0f921",
];

/// Decile samples of matplotlib's `viridis`.
const VIRIDIS: [&str; 11] = [
    "#440154", "#482475", "#414487", "#355f8d", "#2a788e", "#21918c", "#22a884", "#44bf70",
    "#7ad151", "#bddf26", "#fde725",
];

/// Decile samples of matplotlib's `inferno`.
const INFERNO: [&str; 11] = [
    "#000004", "#160b39", "#420a68", "#6a176e", "#932667", "#bc3754", "#dd513a", "#f37819",
    "#fca50a", "#f6d746", "#fcffa4",
];

/// Names accepted by [`Colormap::from_name`].
pub const COLORMAP_NAMES: [&str; 4] = ["plasma", "viridis", "inferno", "grayscale"];

/// A piecewise color ramp over normalized positions in [0, 1].
#[derive(Debug, Clone, PartialEq)]
pub struct Colormap {
    stops: Vec<ColorStop>,
}

impl Colormap {
    fn from_samples(samples: &[&str]) -> Self {
        let last = (samples.len() - 1) as f64;
        let stops = samples
            .iter()
            .enumerate()
            .map(|(i, hex)| ColorStop::new(i as f64 / last, Color::Named((*hex).to_string())))
            .collect();
        Self { stops }
    }

    pub fn plasma() -> Self {
        Self::from_samples(&PLASMA)
    }

    pub fn viridis() -> Self {
        Self::from_samples(&VIRIDIS)
    }

    pub fn inferno() -> Self {
        Self::from_samples(&INFERNO)
    }

    pub fn grayscale() -> Self {
        Self::from_samples(&["#000000", "#ffffff"])
    }

    /// Look up a built-in colormap. A `_r` suffix reverses it.
    pub fn from_name(name: &str) -> Option<Self> {
        let lower = name.trim().to_lowercase();
        let (base, reversed) = match lower.strip_suffix("_r") {
            Some(base) => (base, true),
            None => (lower.as_str(), false),
        };

        let map = match base {
            "plasma" => Self::plasma(),
            "viridis" => Self::viridis(),
            "inferno" => Self::inferno(),
            "grayscale" | "greyscale" | "gray" | "grey" => Self::grayscale(),
            _ => return None,
        };

        Some(if reversed { map.reversed() } else { map })
    }

    /// The same ramp running from 1 to 0.
    pub fn reversed(&self) -> Self {
        let mut stops: Vec<ColorStop> = self
            .stops
            .iter()
            .map(|s| ColorStop::new(1.0 - s.position, s.color.clone()))
            .collect();
        stops.reverse();
        Self { stops }
    }

    /// Color at normalized position `t`, clamped to [0, 1].
    pub fn color_at(&self, t: f64) -> Rgba<u8> {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };

        let first = &self.stops[0];
        if t <= first.position {
            return Rgba(first.color.to_bytes());
        }

        for pair in self.stops.windows(2) {
            let (lower, upper) = (&pair[0], &pair[1]);
            if t <= upper.position {
                let span = upper.position - lower.position;
                let local = if span > 0.0 {
                    (t - lower.position) / span
                } else {
                    1.0
                };
                return Rgba(
                    lower
                        .color
                        .lerp(&upper.color, local)
                        .to_bytes(),
                );
            }
        }

        // Past the last stop
        Rgba(self.stops[self.stops.len() - 1].color.to_bytes())
    }
}

impl Default for Colormap {
    fn default() -> Self {
        Self::plasma()
    }
}

/// Fixed data range mapped onto the colormap.
///
/// `min > max` is allowed and runs the ramp backwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }
}

/// Maps data values to normalized colormap positions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueScale {
    range: ValueRange,
}

impl ValueScale {
    /// Use `fixed` if given, otherwise the finite extent of `values`.
    pub fn new(fixed: Option<ValueRange>, values: &[f64]) -> Self {
        let range = fixed.unwrap_or_else(|| Self::auto_range(values));
        Self { range }
    }

    fn auto_range(values: &[f64]) -> ValueRange {
        let (min, max) = values
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            });

        if min > max {
            // No finite values at all
            ValueRange::new(0.0, 1.0)
        } else {
            ValueRange::new(min, max)
        }
    }

    pub fn range(&self) -> ValueRange {
        self.range
    }

    /// Normalized position of `value`, or `None` for a missing sample.
    ///
    /// A zero-width range maps every value to the middle of the ramp.
    pub fn normalize(&self, value: f64) -> Option<f64> {
        if !value.is_finite() {
            return None;
        }

        let span = self.range.max - self.range.min;
        if span == 0.0 || !span.is_finite() {
            return Some(0.5);
        }

        Some(((value - self.range.min) / span).clamp(0.0, 1.0))
    }
}
