//! Color types shared by the renderer and the configuration.

use serde::{Deserialize, Serialize};

/// Color representation supporting multiple formats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Color {
    /// "#RRGGBB", "#RRGGBBAA" or a color name such as "white"
    Named(String),

    /// RGB array: [r, g, b] or [r, g, b, a]
    Array(Vec<u8>),

    /// Explicit RGBA
    Rgba { r: u8, g: u8, b: u8, a: u8 },
}

impl Color {
    pub fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Color::Rgba { r, g, b, a }
    }

    /// Convert to an RGBA tuple; malformed colors fall back to opaque black.
    pub fn to_rgba(&self) -> (u8, u8, u8, u8) {
        self.try_to_rgba().unwrap_or((0, 0, 0, 255))
    }

    /// Convert to an RGBA tuple, or `None` if the color is malformed.
    pub fn try_to_rgba(&self) -> Option<(u8, u8, u8, u8)> {
        match self {
            Color::Named(s) if s.starts_with('#') => parse_hex_color(s),
            Color::Named(name) => named_color(name),
            Color::Array(arr) => match arr.as_slice() {
                [r, g, b] => Some((*r, *g, *b, 255)),
                [r, g, b, a] => Some((*r, *g, *b, *a)),
                _ => None,
            },
            Color::Rgba { r, g, b, a } => Some((*r, *g, *b, *a)),
        }
    }

    /// Convert to the 4-byte pixel layout used by image buffers.
    pub fn to_bytes(&self) -> [u8; 4] {
        let (r, g, b, a) = self.to_rgba();
        [r, g, b, a]
    }

    /// Linear interpolation between two colors, `t` in [0, 1].
    pub fn lerp(&self, other: &Color, t: f64) -> Color {
        let (r1, g1, b1, a1) = self.to_rgba();
        let (r2, g2, b2, a2) = other.to_rgba();

        let t = t.clamp(0.0, 1.0);

        let lerp_u8 = |a: u8, b: u8, t: f64| -> u8 {
            ((a as f64) * (1.0 - t) + (b as f64) * t).round() as u8
        };

        Color::Rgba {
            r: lerp_u8(r1, r2, t),
            g: lerp_u8(g1, g2, t),
            b: lerp_u8(b1, b2, t),
            a: lerp_u8(a1, a2, t),
        }
    }
}

impl From<(u8, u8, u8)> for Color {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Color::rgba(r, g, b, 255)
    }
}

fn parse_hex_color(s: &str) -> Option<(u8, u8, u8, u8)> {
    let s = s.trim_start_matches('#');
    if !s.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |i: usize| s.get(i..i + 2).and_then(|h| u8::from_str_radix(h, 16).ok());

    match s.len() {
        6 => Some((channel(0)?, channel(2)?, channel(4)?, 255)),
        8 => Some((channel(0)?, channel(2)?, channel(4)?, channel(6)?)),
        _ => None,
    }
}

fn named_color(name: &str) -> Option<(u8, u8, u8, u8)> {
    let rgba = match name.trim().to_lowercase().as_str() {
        "transparent" => (0, 0, 0, 0),
        "black" => (0, 0, 0, 255),
        "white" => (255, 255, 255, 255),
        "red" => (255, 0, 0, 255),
        "green" => (0, 255, 0, 255),
        "blue" => (0, 0, 255, 255),
        "yellow" => (255, 255, 0, 255),
        "cyan" => (0, 255, 255, 255),
        "magenta" => (255, 0, 255, 255),
        "orange" => (255, 165, 0, 255),
        "purple" => (128, 0, 128, 255),
        "gray" | "grey" => (128, 128, 128, 255),
        _ => return None,
    };
    Some(rgba)
}

/// A color stop in a colormap. `position` is in [0, 1].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorStop {
    pub position: f64,
    pub color: Color,
}

impl ColorStop {
    pub fn new(position: f64, color: impl Into<Color>) -> Self {
        Self {
            position,
            color: color.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_and_named() {
        assert_eq!(Color::Named("#ff8000".into()).to_rgba(), (255, 128, 0, 255));
        assert_eq!(Color::Named("#ff800080".into()).to_rgba(), (255, 128, 0, 128));
        assert_eq!(Color::Named("White".into()).to_rgba(), (255, 255, 255, 255));
    }

    #[test]
    fn test_array_defaults_alpha() {
        assert_eq!(Color::Array(vec![1, 2, 3]).to_rgba(), (1, 2, 3, 255));
    }

    #[test]
    fn test_lerp_linear_midpoint() {
        let a = Color::rgba(0, 0, 0, 255);
        let b = Color::rgba(200, 100, 50, 255);
        let mid = a.lerp(&b, 0.5);
        assert_eq!(mid.to_rgba(), (100, 50, 25, 255));
    }

    #[test]
    fn test_malformed_colors_rejected() {
        // Multi-byte characters must not be sliced mid-character
        assert_eq!(Color::Named("#a\u{e9}aaa".into()).try_to_rgba(), None);
        assert_eq!(Color::Named("#12345".into()).try_to_rgba(), None);
        assert_eq!(Color::Named("#gg0000".into()).try_to_rgba(), None);
        assert_eq!(Color::Named("chartreuse".into()).try_to_rgba(), None);
        assert_eq!(Color::Array(vec![1, 2]).try_to_rgba(), None);
        assert_eq!(Color::Named("#a\u{e9}aaa".into()).to_rgba(), (0, 0, 0, 255));
    }

    #[test]
    fn test_deserialize_untagged() {
        let c: Color = serde_json::from_str("\"#000000\"").unwrap();
        assert_eq!(c.to_rgba(), (0, 0, 0, 255));
        let c: Color = serde_json::from_str("[10, 20, 30, 40]").unwrap();
        assert_eq!(c.to_rgba(), (10, 20, 30, 40));
    }
}
