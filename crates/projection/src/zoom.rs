//! Zoom level selection.
//!
//! The pixel span of a bounding box doubles with every zoom level:
//!
//! ```text
//! span_w(z) = (x(lon_max) - x(lon_min)) * tile_size * 2^z
//! span_h(z) = (y(lat_min) - y(lat_max)) * tile_size * 2^z
//! ```
//!
//! where `x`, `y` are unit Mercator coordinates. The selected zoom is the
//! smallest `z` with both spans at least the requested minimum size.

use tracing::{debug, warn};
use xmap_common::{BoundingBox, PixelSize};

use crate::mercator::{lat_to_unit_y, lon_to_unit_x, WebMercator};
use crate::ProjectionError;

/// Outcome of a zoom selection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomSelection {
    /// Selected zoom level
    pub zoom: u32,
    /// Pixel span (width, height) of the bounding box at `zoom`
    pub span: (f64, f64),
    /// True if `max_zoom` was reached before the minimum size was met
    pub capped: bool,
}

/// Pixel span (width, height) of a bounding box at `zoom`.
pub fn span_pixels(bbox: &BoundingBox, zoom: u32, tile_size: u32) -> (f64, f64) {
    let (dx, dy) = unit_extent(bbox);
    let scale = tile_size as f64 * 2f64.powi(zoom as i32);
    (dx * scale, dy * scale)
}

/// Select the smallest zoom at which `bbox` spans at least `min_size` pixels
/// in both dimensions, capped at `max_zoom`.
pub fn select_zoom(
    bbox: &BoundingBox,
    min_size: PixelSize,
    tile_size: u32,
    max_zoom: u32,
) -> Result<ZoomSelection, ProjectionError> {
    if tile_size == 0 {
        return Err(ProjectionError::InvalidTileSize);
    }

    let (dx, dy) = unit_extent(bbox);
    if dx <= 0.0 || dy <= 0.0 {
        return Err(ProjectionError::DegenerateBounds(bbox.to_string()));
    }

    let satisfies = |z: u32| {
        let (w, h) = span_pixels(bbox, z, tile_size);
        min_size.is_satisfied_by(w, h)
    };

    // Closed form, then correct for floating point at exact powers of two
    let needed = |min: u32, extent: f64| -> f64 {
        if min == 0 {
            0.0
        } else {
            (min as f64 / (tile_size as f64 * extent)).log2().ceil()
        }
    };
    let estimate = needed(min_size.width, dx).max(needed(min_size.height, dy));
    let mut zoom = estimate.clamp(0.0, max_zoom as f64) as u32;

    while zoom > 0 && satisfies(zoom - 1) {
        zoom -= 1;
    }
    while zoom < max_zoom && !satisfies(zoom) {
        zoom += 1;
    }

    let capped = !satisfies(zoom);
    let span = span_pixels(bbox, zoom, tile_size);

    if capped {
        warn!(
            zoom,
            width = span.0,
            height = span.1,
            min_width = min_size.width,
            min_height = min_size.height,
            "Maximum zoom reached before the minimum image size"
        );
    } else {
        debug!(zoom, estimate, width = span.0, height = span.1, "Selected zoom");
    }

    Ok(ZoomSelection { zoom, span, capped })
}

/// Step `selection` down until the tiles covering `bbox` number at most
/// `max_tiles`.
///
/// A lowered zoom is marked `capped`, like a zoom stopped at `max_zoom`.
pub fn fit_tile_budget(
    bbox: &BoundingBox,
    selection: ZoomSelection,
    tile_size: u32,
    max_tiles: usize,
) -> ZoomSelection {
    let projection = WebMercator::new(tile_size);
    let tiles = |z: u32| projection.tile_range(bbox, z).count();

    let mut zoom = selection.zoom;
    while zoom > 0 && tiles(zoom) > max_tiles {
        zoom -= 1;
    }
    if zoom == selection.zoom {
        return selection;
    }

    let span = span_pixels(bbox, zoom, tile_size);
    warn!(
        zoom,
        requested_zoom = selection.zoom,
        tiles = tiles(zoom),
        max_tiles,
        width = span.0,
        height = span.1,
        "Tile limit reached before the minimum image size"
    );

    ZoomSelection {
        zoom,
        span,
        capped: true,
    }
}

fn unit_extent(bbox: &BoundingBox) -> (f64, f64) {
    let dx = lon_to_unit_x(bbox.lon_max) - lon_to_unit_x(bbox.lon_min);
    // y grows southwards
    let dy = lat_to_unit_y(bbox.lat_min) - lat_to_unit_y(bbox.lat_max);
    (dx, dy)
}
