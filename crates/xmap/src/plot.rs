//! The plotting pipeline: bounds, zoom, map fetch, overlay.

use std::sync::OnceLock;

use image::RgbaImage;
use projection::ZoomSelection;
use renderer::{find_system_font, load_font, Font, OverlayStyle, PlotRenderer};
use tiles::{MapImage, MapProvider};
use tracing::{debug, info, instrument, warn};
use xmap_common::{BoundingBox, Dataset, PixelRect, PixelSize, XMapError};

use crate::bounds::select_view;
use crate::config::XMapConfig;
use crate::error::PlotResult;

/// A fetched map cropped to the plot area of a dataset.
#[derive(Debug, Clone)]
pub struct MapView {
    map: MapImage,
    bbox: BoundingBox,
    selection: ZoomSelection,
    crop: PixelRect,
}

impl MapView {
    /// Plot area after padding, extension and clamping.
    pub fn bbox(&self) -> &BoundingBox {
        &self.bbox
    }

    pub fn zoom(&self) -> u32 {
        self.selection.zoom
    }

    pub fn selection(&self) -> &ZoomSelection {
        &self.selection
    }

    /// The full stitched map the view was cut from.
    pub fn map(&self) -> &MapImage {
        &self.map
    }

    /// Position of the view inside the stitched map.
    pub fn crop(&self) -> &PixelRect {
        &self.crop
    }

    pub fn size(&self) -> PixelSize {
        self.crop.size()
    }

    /// Pixels of the plot area.
    pub fn image(&self) -> RgbaImage {
        self.map.crop(&self.crop)
    }

    /// Pixel position of `(lat, lon)` in [`MapView::image`].
    pub fn to_pixels(&self, lat: f64, lon: f64) -> (f64, f64) {
        let (x, y) = self.map.to_pixels(lat, lon);
        (x - self.crop.x as f64, y - self.crop.y as f64)
    }

    /// Geographic position of a pixel in [`MapView::image`].
    pub fn from_pixels(&self, x: f64, y: f64) -> (f64, f64) {
        self.map
            .from_pixels(x + self.crop.x as f64, y + self.crop.y as f64)
    }
}

/// Plots datasets onto maps from a provider.
pub struct XMap<P> {
    provider: P,
    config: XMapConfig,
    style: OverlayStyle,
    font: OnceLock<Option<Font<'static>>>,
}

impl<P: MapProvider> XMap<P> {
    pub fn new(provider: P, config: XMapConfig) -> PlotResult<Self> {
        config.validate()?;
        let style = config.overlay_style()?;
        Ok(Self {
            provider,
            config,
            style,
            font: OnceLock::new(),
        })
    }

    /// Fetch the map covering `dataset` without drawing anything on it.
    #[instrument(skip_all, fields(rows = dataset.len()))]
    pub fn plot_map(&self, dataset: &Dataset) -> PlotResult<MapView> {
        if dataset.is_empty() {
            return Err(XMapError::EmptyInput.into());
        }

        let (bbox, selection) = select_view(
            dataset,
            self.config.min_size,
            self.config.extend_percentage,
            self.provider.tile_size(),
            self.provider.max_zoom(),
            self.provider.max_tiles(),
        )?;

        let map = self.provider.fetch_map(&bbox, selection.zoom)?;
        let crop = map.bbox_pixels(&bbox);

        info!(
            zoom = selection.zoom,
            width = crop.width,
            height = crop.height,
            "Fetched map"
        );

        Ok(MapView {
            map,
            bbox,
            selection,
            crop,
        })
    }

    /// Render one image per value column (one image if there are none).
    ///
    /// `captions` may be empty, hold one caption shared by all images, or
    /// one caption per value column.
    #[instrument(skip_all, fields(rows = dataset.len(), series = dataset.value_columns()))]
    pub fn plot(&self, dataset: &Dataset, captions: &[String]) -> PlotResult<Vec<RgbaImage>> {
        let series = dataset.value_columns();
        let captions = resolve_captions(captions, series)?;

        let view = self.plot_map(dataset)?;
        let base = view.image();
        let points: Vec<(f64, f64)> = dataset
            .coordinates()
            .map(|(lat, lon)| view.to_pixels(lat, lon))
            .collect();

        let renderer = self.renderer(captions.iter().any(Option::is_some))?;

        if series == 0 {
            let img = renderer.render(&base, &points, None, captions[0])?;
            return Ok(vec![img]);
        }

        let mut images = Vec::with_capacity(series);
        for (index, caption) in captions.iter().enumerate() {
            let values = dataset.series(index).ok_or_else(|| {
                XMapError::Render(format!("value column {} is missing", index))
            })?;
            debug!(series = index, "Rendering series");
            images.push(renderer.render(&base, &points, Some(&values), *caption)?);
        }

        Ok(images)
    }

    fn renderer(&self, with_captions: bool) -> PlotResult<PlotRenderer> {
        let renderer = PlotRenderer::new(self.style.clone());
        if !with_captions {
            return Ok(renderer);
        }

        match self.caption_font()? {
            Some(font) => Ok(renderer.with_font(font, self.config.caption_style())),
            None => Ok(renderer),
        }
    }

    fn caption_font(&self) -> PlotResult<Option<Font<'static>>> {
        if let Some(font) = self.font.get() {
            return Ok(font.clone());
        }
        let loaded = load_caption_font(&self.config)?;
        Ok(self.font.get_or_init(|| loaded).clone())
    }
}

/// The configured caption font, or the first system font found.
///
/// A configured font that cannot be loaded is an error; a missing system
/// font only disables captions.
fn load_caption_font(config: &XMapConfig) -> PlotResult<Option<Font<'static>>> {
    if let Some(path) = &config.caption_font {
        return Ok(Some(load_font(path)?));
    }

    match find_system_font() {
        Some(path) => match load_font(&path) {
            Ok(font) => Ok(Some(font)),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to load system font, captions disabled");
                Ok(None)
            }
        },
        None => {
            warn!("No caption font configured and no system font found, captions disabled");
            Ok(None)
        }
    }
}

/// One caption slot per rendered image.
fn resolve_captions(captions: &[String], series: usize) -> PlotResult<Vec<Option<&str>>> {
    let images = series.max(1);
    match captions.len() {
        0 => Ok(vec![None; images]),
        1 => Ok(vec![Some(captions[0].as_str()); images]),
        n if n == images => Ok(captions.iter().map(|c| Some(c.as_str())).collect()),
        n => Err(XMapError::SeriesMismatch {
            what: "captions",
            expected: images,
            found: n,
        }
        .into()),
    }
}

/// Render one image per value column with a fresh [`XMap`].
pub fn plot<P: MapProvider>(
    dataset: &Dataset,
    provider: P,
    config: &XMapConfig,
) -> PlotResult<Vec<RgbaImage>> {
    XMap::new(provider, config.clone())?.plot(dataset, &[])
}

/// Fetch the map for `dataset` with a fresh [`XMap`].
pub fn plot_map<P: MapProvider>(
    dataset: &Dataset,
    provider: P,
    config: &XMapConfig,
) -> PlotResult<MapView> {
    XMap::new(provider, config.clone())?.plot_map(dataset)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_captions_shared_and_per_series() {
        assert_eq!(resolve_captions(&[], 2).unwrap(), vec![None, None]);

        let shared = strings(&["Run 1"]);
        assert_eq!(
            resolve_captions(&shared, 3).unwrap(),
            vec![Some("Run 1"); 3]
        );

        let each = strings(&["a", "b"]);
        assert_eq!(
            resolve_captions(&each, 2).unwrap(),
            vec![Some("a"), Some("b")]
        );
    }

    #[test]
    fn test_captions_without_value_columns() {
        let one = strings(&["track"]);
        assert_eq!(resolve_captions(&one, 0).unwrap(), vec![Some("track")]);
    }

    #[test]
    fn test_caption_count_mismatch() {
        let three = strings(&["a", "b", "c"]);
        let err = resolve_captions(&three, 2).unwrap_err();
        assert!(matches!(
            err,
            crate::PlotError::Input(XMapError::SeriesMismatch {
                what: "captions",
                expected: 2,
                found: 3
            })
        ));
    }
}
