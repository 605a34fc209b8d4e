//! Plot rendering on top of stitched map images.
//!
//! Implements:
//! - Colormaps and value scaling
//! - Filled markers and gradient-colored connecting lines
//! - Bottom-left captions with TrueType fonts
//! - PNG encoding (indexed or RGBA)

pub mod caption;
pub mod colormap;
pub mod draw;
pub mod overlay;
pub mod png;

pub use caption::{draw_caption, find_system_font, load_font, CaptionStyle};
pub use colormap::{Colormap, ValueRange, ValueScale, COLORMAP_NAMES};
pub use overlay::{OverlayStyle, PlotRenderer, DEFAULT_UNIFORM_COLOR};
pub use png::{encode_png, write_png};

pub use rusttype::Font;
