//! Series overlay: markers and gradient lines on top of a base map.

use image::{Rgba, RgbaImage};
use rusttype::Font;
use tracing::{debug, warn};
use xmap_common::{XMapError, XMapResult};

use crate::caption::{draw_caption, CaptionStyle};
use crate::colormap::{Colormap, ValueRange, ValueScale};
use crate::draw::{draw_gradient_line, draw_marker};

/// Color used when a dataset has no value columns.
pub const DEFAULT_UNIFORM_COLOR: Rgba<u8> = Rgba([31, 119, 180, 255]);

/// How a series is drawn.
#[derive(Debug, Clone)]
pub struct OverlayStyle {
    pub markers: bool,
    pub marker_radius: u32,
    pub marker_outline: Option<Rgba<u8>>,
    pub gradient_lines: bool,
    pub line_width: u32,
    pub colormap: Colormap,
    /// Fixed value range; `None` scales each series to its own extent
    pub value_range: Option<ValueRange>,
    /// Color of every point when there are no values to map
    pub uniform_color: Rgba<u8>,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            markers: true,
            marker_radius: 5,
            marker_outline: None,
            gradient_lines: true,
            line_width: 2,
            colormap: Colormap::plasma(),
            value_range: None,
            uniform_color: DEFAULT_UNIFORM_COLOR,
        }
    }
}

/// Draws series onto copies of a base image.
pub struct PlotRenderer {
    style: OverlayStyle,
    caption_style: CaptionStyle,
    font: Option<Font<'static>>,
}

impl PlotRenderer {
    pub fn new(style: OverlayStyle) -> Self {
        Self {
            style,
            caption_style: CaptionStyle::default(),
            font: None,
        }
    }

    /// Enable captions with the given font.
    pub fn with_font(mut self, font: Font<'static>, caption_style: CaptionStyle) -> Self {
        self.font = Some(font);
        self.caption_style = caption_style;
        self
    }

    /// Per-point colors; `None` marks a missing sample.
    fn point_colors(&self, count: usize, values: Option<&[f64]>) -> Vec<Option<Rgba<u8>>> {
        match values {
            None => vec![Some(self.style.uniform_color); count],
            Some(values) => {
                let scale = ValueScale::new(self.style.value_range, values);
                debug!(
                    min = scale.range().min,
                    max = scale.range().max,
                    "Value scale"
                );
                values
                    .iter()
                    .map(|&v| scale.normalize(v).map(|t| self.style.colormap.color_at(t)))
                    .collect()
            }
        }
    }

    /// Render one series over `base`.
    ///
    /// `points` are pixel positions in `base`. `values`, when given, holds one
    /// value per point; without values every point gets the uniform color.
    pub fn render(
        &self,
        base: &RgbaImage,
        points: &[(f64, f64)],
        values: Option<&[f64]>,
        caption: Option<&str>,
    ) -> XMapResult<RgbaImage> {
        if let Some(values) = values {
            if values.len() != points.len() {
                return Err(XMapError::SeriesMismatch {
                    what: "values",
                    expected: points.len(),
                    found: values.len(),
                });
            }
        }

        let mut img = base.clone();
        let colors = self.point_colors(points.len(), values);

        // Lines first so markers sit on top
        if self.style.gradient_lines {
            for i in 1..points.len() {
                if let (Some(start), Some(end)) = (colors[i - 1], colors[i]) {
                    draw_gradient_line(
                        &mut img,
                        points[i - 1],
                        points[i],
                        start,
                        end,
                        self.style.line_width,
                    );
                }
            }
        }

        if self.style.markers {
            for (point, color) in points.iter().zip(&colors) {
                if let Some(color) = color {
                    draw_marker(
                        &mut img,
                        *point,
                        self.style.marker_radius,
                        *color,
                        self.style.marker_outline,
                    );
                }
            }
        }

        if let Some(text) = caption {
            match &self.font {
                Some(font) => draw_caption(&mut img, font, text, &self.caption_style),
                None => warn!(caption = text, "No font available, caption skipped"),
            }
        }

        Ok(img)
    }
}
