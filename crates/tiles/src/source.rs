//! Tile URL templates.

use serde::{Deserialize, Serialize};
use xmap_common::TileCoord;

use crate::{TileError, TileResult};

/// Default OpenStreetMap tile server.
pub const OSM_URL_TEMPLATE: &str = "https://tile.openstreetmap.org/{z}/{x}/{y}.png";

/// Highest zoom served by the standard OpenStreetMap tile layer.
pub const OSM_MAX_ZOOM: u32 = 19;

/// A raster tile source addressed with `{z}`, `{x}`, `{y}` placeholders.
///
/// An optional `{s}` placeholder rotates through `subdomains`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileSource {
    pub url_template: String,
    #[serde(default)]
    pub subdomains: Vec<String>,
    #[serde(default = "default_max_zoom")]
    pub max_zoom: u32,
    #[serde(default = "default_tile_size")]
    pub tile_size: u32,
}

fn default_max_zoom() -> u32 {
    OSM_MAX_ZOOM
}

fn default_tile_size() -> u32 {
    projection::DEFAULT_TILE_SIZE
}

impl Default for TileSource {
    fn default() -> Self {
        Self::openstreetmap()
    }
}

impl TileSource {
    pub fn openstreetmap() -> Self {
        Self {
            url_template: OSM_URL_TEMPLATE.to_string(),
            subdomains: Vec::new(),
            max_zoom: OSM_MAX_ZOOM,
            tile_size: projection::DEFAULT_TILE_SIZE,
        }
    }

    /// A source with a custom template and OpenStreetMap defaults otherwise.
    pub fn from_template(url_template: impl Into<String>) -> Self {
        Self {
            url_template: url_template.into(),
            ..Self::openstreetmap()
        }
    }

    pub fn validate(&self) -> TileResult<()> {
        let invalid = |message: &str| TileError::InvalidTemplate {
            template: self.url_template.clone(),
            message: message.to_string(),
        };

        for placeholder in ["{z}", "{x}", "{y}"] {
            if !self.url_template.contains(placeholder) {
                return Err(invalid(&format!("missing {} placeholder", placeholder)));
            }
        }
        if self.url_template.contains("{s}") && self.subdomains.is_empty() {
            return Err(invalid("{s} placeholder requires at least one subdomain"));
        }
        if self.tile_size == 0 {
            return Err(invalid("tile size must be positive"));
        }
        Ok(())
    }

    /// Build the URL for a tile.
    pub fn url(&self, coord: &TileCoord) -> String {
        let mut url = self
            .url_template
            .replace("{z}", &coord.z.to_string())
            .replace("{x}", &coord.x.to_string())
            .replace("{y}", &coord.y.to_string());

        if !self.subdomains.is_empty() {
            let idx = ((coord.x + coord.y) as usize) % self.subdomains.len();
            url = url.replace("{s}", &self.subdomains[idx]);
        }
        url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_osm_url() {
        let source = TileSource::default();
        assert_eq!(
            source.url(&TileCoord::new(9, 150, 192)),
            "https://tile.openstreetmap.org/9/150/192.png"
        );
        assert!(source.validate().is_ok());
    }

    #[test]
    fn test_subdomain_rotation() {
        let source = TileSource {
            subdomains: vec!["a".into(), "b".into(), "c".into()],
            ..TileSource::from_template("https://{s}.tiles.example/{z}/{x}/{y}.png")
        };
        assert_eq!(
            source.url(&TileCoord::new(1, 0, 0)),
            "https://a.tiles.example/1/0/0.png"
        );
        assert_eq!(
            source.url(&TileCoord::new(1, 1, 1)),
            "https://c.tiles.example/1/1/1.png"
        );
    }

    #[test]
    fn test_validate_rejects_incomplete_templates() {
        assert!(TileSource::from_template("https://example/{z}/{x}.png")
            .validate()
            .is_err());
        assert!(TileSource::from_template("https://{s}.example/{z}/{x}/{y}.png")
            .validate()
            .is_err());
    }
}
