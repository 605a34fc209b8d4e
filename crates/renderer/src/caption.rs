//! Caption text drawn in the bottom-left corner of a plot.

use std::fs;
use std::path::{Path, PathBuf};

use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_text_mut, text_size};
use rusttype::{Font, Scale};
use tracing::debug;
use xmap_common::{XMapError, XMapResult};

use crate::draw::blend_pixel;

/// Well-known locations of TrueType fonts, tried in order.
const SYSTEM_FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu-sans-fonts/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation-sans/LiberationSans-Regular.ttf",
    "/usr/share/fonts/noto/NotoSans-Regular.ttf",
    "/usr/share/fonts/truetype/noto/NotoSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Padding around the caption text, in pixels.
const PADDING: i32 = 4;
/// Distance of the caption box from the image edges, in pixels.
const MARGIN: i32 = 6;

/// First existing font from the list of well-known system locations.
pub fn find_system_font() -> Option<PathBuf> {
    SYSTEM_FONT_CANDIDATES
        .iter()
        .map(PathBuf::from)
        .find(|path| path.is_file())
}

/// Load a TrueType or OpenType font from disk.
pub fn load_font(path: &Path) -> XMapResult<Font<'static>> {
    let data = fs::read(path)?;
    let font = Font::try_from_vec(data).ok_or_else(|| {
        XMapError::invalid_parameter(
            "caption_font",
            format!("{} is not a usable TrueType font", path.display()),
        )
    })?;
    debug!(path = %path.display(), "Loaded caption font");
    Ok(font)
}

/// Caption styling.
#[derive(Debug, Clone)]
pub struct CaptionStyle {
    /// Font height in pixels
    pub size: f32,
    pub color: Rgba<u8>,
    pub background: Rgba<u8>,
}

impl Default for CaptionStyle {
    fn default() -> Self {
        Self {
            size: 16.0,
            color: Rgba([0, 0, 0, 255]),
            background: Rgba([255, 255, 255, 200]),
        }
    }
}

/// Draw `text` on a translucent box in the bottom-left corner.
///
/// Empty text draws nothing.
pub fn draw_caption(img: &mut RgbaImage, font: &Font<'_>, text: &str, style: &CaptionStyle) {
    let text = text.trim();
    if text.is_empty() {
        return;
    }

    let scale = Scale::uniform(style.size);
    let (text_w, text_h) = text_size(scale, font, text);
    let line_h = text_h.max(style.size.ceil() as i32);

    let box_x = MARGIN;
    let box_y = img.height() as i32 - MARGIN - line_h - 2 * PADDING;
    let box_w = text_w + 2 * PADDING;
    let box_h = line_h + 2 * PADDING;

    for y in box_y..box_y + box_h {
        for x in box_x..box_x + box_w {
            blend_pixel(img, x, y, style.background);
        }
    }

    draw_text_mut(
        img,
        style.color,
        box_x + PADDING,
        box_y + PADDING,
        scale,
        font,
        text,
    );
}
