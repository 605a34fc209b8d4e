//! Plot area and zoom level for a dataset.

use projection::{fit_tile_budget, select_zoom, ZoomSelection};
use tracing::debug;
use xmap_common::{BoundingBox, Dataset, PixelSize, XMapResult, DEGENERATE_PADDING_DEG};

use crate::error::PlotResult;

/// Area to plot around `raw` data extrema.
///
/// Zero-width axes are padded, the box is extended by `extend_percentage`
/// of its extent per side, and the result is clamped to the Web Mercator
/// domain. Clamping can collapse boxes made of points beyond the latitude
/// limit, so those are padded once more.
pub fn plot_bounds(raw: &BoundingBox, extend_percentage: f64) -> BoundingBox {
    let bbox = raw
        .pad_degenerate(DEGENERATE_PADDING_DEG)
        .extend(extend_percentage)
        .clamp_to_mercator();

    if bbox.is_degenerate() {
        bbox.pad_degenerate(DEGENERATE_PADDING_DEG).clamp_to_mercator()
    } else {
        bbox
    }
}

/// Bounding box of the data, before padding and extension.
pub fn data_bounds(dataset: &Dataset) -> XMapResult<BoundingBox> {
    dataset.bounding_box()
}

/// Plot area and zoom selection for `dataset`.
///
/// The zoom is capped both at `max_zoom` and at the highest level whose
/// covering tiles number at most `max_tiles`.
pub fn select_view(
    dataset: &Dataset,
    min_size: PixelSize,
    extend_percentage: f64,
    tile_size: u32,
    max_zoom: u32,
    max_tiles: usize,
) -> PlotResult<(BoundingBox, ZoomSelection)> {
    let raw = data_bounds(dataset)?;
    let bbox = plot_bounds(&raw, extend_percentage);
    let selection = select_zoom(&bbox, min_size, tile_size, max_zoom)?;
    let selection = fit_tile_budget(&bbox, selection, tile_size, max_tiles);

    debug!(
        data = %raw,
        plot = %bbox,
        zoom = selection.zoom,
        "Selected plot area"
    );

    Ok((bbox, selection))
}
