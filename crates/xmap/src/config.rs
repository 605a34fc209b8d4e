//! Plot configuration.
//!
//! Loaded from YAML; every field has a default, so an empty document is a
//! valid configuration. A few tile settings can be overridden from the
//! environment (see [`XMapConfig::apply_env_overrides`]).

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use renderer::{CaptionStyle, Colormap, OverlayStyle, ValueRange, COLORMAP_NAMES};
use serde::{Deserialize, Serialize};
use tiles::{
    CachedTileFetcher, HttpFetcherConfig, HttpTileFetcher, TileMapProvider, TileResult, TileSource,
};
use tracing::{debug, info};
use xmap_common::{Color, PixelSize, XMapError, XMapResult};

use crate::error::ConfigError;

/// Environment variable overriding `tiles.url_template`.
pub const ENV_TILE_URL: &str = "X_MAP_TILE_URL";
/// Environment variable overriding `tiles.cache_dir`.
pub const ENV_TILE_CACHE_DIR: &str = "X_MAP_TILE_CACHE_DIR";
/// Environment variable overriding `tiles.user_agent`.
pub const ENV_USER_AGENT: &str = "X_MAP_USER_AGENT";

/// The tile provider assembled from a configuration.
pub type HttpMapProvider = TileMapProvider<CachedTileFetcher<HttpTileFetcher>>;

/// Everything that controls how a dataset is plotted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct XMapConfig {
    /// Minimum size of the rendered image
    #[serde(default = "default_min_size")]
    pub min_size: PixelSize,

    /// Margin added around the data, in percent of its extent per side
    #[serde(default = "default_extend_percentage")]
    pub extend_percentage: f64,

    #[serde(default = "default_true")]
    pub markers: bool,

    #[serde(default = "default_marker_radius")]
    pub marker_radius: u32,

    /// Ring drawn around each marker
    #[serde(default)]
    pub marker_outline: Option<Color>,

    /// Connect consecutive rows with value-colored lines
    #[serde(default = "default_true")]
    pub gradient_lines: bool,

    #[serde(default = "default_line_width")]
    pub line_width: u32,

    /// Built-in colormap name, optionally with `_r` to reverse it
    #[serde(default = "default_colormap")]
    pub colormap: String,

    /// Fixed `{min, max}` range for all series; auto-scaled when absent
    #[serde(default)]
    pub value_range: Option<ValueRange>,

    /// Caption font height in pixels
    #[serde(default = "default_caption_size")]
    pub caption_size: f32,

    /// TrueType font for captions; a system font is searched when absent
    #[serde(default)]
    pub caption_font: Option<PathBuf>,

    #[serde(default)]
    pub tiles: TileConfig,
}

fn default_min_size() -> PixelSize {
    PixelSize::square(512)
}

fn default_extend_percentage() -> f64 {
    10.0
}

fn default_true() -> bool {
    true
}

fn default_marker_radius() -> u32 {
    5
}

fn default_line_width() -> u32 {
    2
}

fn default_colormap() -> String {
    "plasma".to_string()
}

fn default_caption_size() -> f32 {
    16.0
}

impl Default for XMapConfig {
    fn default() -> Self {
        Self {
            min_size: default_min_size(),
            extend_percentage: default_extend_percentage(),
            markers: true,
            marker_radius: default_marker_radius(),
            marker_outline: None,
            gradient_lines: true,
            line_width: default_line_width(),
            colormap: default_colormap(),
            value_range: None,
            caption_size: default_caption_size(),
            caption_font: None,
            tiles: TileConfig::default(),
        }
    }
}

/// Tile server, download and cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TileConfig {
    #[serde(default = "default_url_template")]
    pub url_template: String,

    /// Values substituted for `{s}` in the template
    #[serde(default)]
    pub subdomains: Vec<String>,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default = "default_max_zoom")]
    pub max_zoom: u32,

    /// Refuse maps that need more tiles than this
    #[serde(default = "default_max_tiles")]
    pub max_tiles: usize,

    #[serde(default = "default_tile_size")]
    pub tile_size: u32,

    /// Directory for the on-disk tile cache
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,

    /// Capacity of the in-memory tile cache (0 disables it)
    #[serde(default = "default_memory_cache_tiles")]
    pub memory_cache_tiles: usize,
}

fn default_url_template() -> String {
    tiles::source::OSM_URL_TEMPLATE.to_string()
}

fn default_user_agent() -> String {
    HttpFetcherConfig::default().user_agent
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    2
}

fn default_max_zoom() -> u32 {
    tiles::source::OSM_MAX_ZOOM
}

fn default_max_tiles() -> usize {
    tiles::DEFAULT_MAX_TILES
}

fn default_tile_size() -> u32 {
    projection::DEFAULT_TILE_SIZE
}

fn default_memory_cache_tiles() -> usize {
    256
}

impl Default for TileConfig {
    fn default() -> Self {
        Self {
            url_template: default_url_template(),
            subdomains: Vec::new(),
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            max_zoom: default_max_zoom(),
            max_tiles: default_max_tiles(),
            tile_size: default_tile_size(),
            cache_dir: None,
            memory_cache_tiles: default_memory_cache_tiles(),
        }
    }
}

impl TileConfig {
    pub fn source(&self) -> TileSource {
        TileSource {
            url_template: self.url_template.clone(),
            subdomains: self.subdomains.clone(),
            max_zoom: self.max_zoom,
            tile_size: self.tile_size,
        }
    }

    pub fn fetcher_config(&self) -> HttpFetcherConfig {
        HttpFetcherConfig {
            user_agent: self.user_agent.clone(),
            request_timeout: Duration::from_secs(self.timeout_secs),
            max_retries: self.max_retries,
            ..Default::default()
        }
    }

    /// Build the HTTP provider with its memory and disk caches.
    pub fn build_provider(&self) -> TileResult<HttpMapProvider> {
        let source = self.source();
        let http = HttpTileFetcher::new(source.clone(), self.fetcher_config())?;

        let mut fetcher = CachedTileFetcher::new(http, self.memory_cache_tiles);
        if let Some(dir) = &self.cache_dir {
            info!(cache_dir = %dir.display(), "Using disk tile cache");
            fetcher = fetcher.with_disk_cache(dir);
        }

        Ok(TileMapProvider::new(fetcher, &source).with_max_tiles(self.max_tiles))
    }

    fn validate(&self) -> XMapResult<()> {
        self.source()
            .validate()
            .map_err(|e| XMapError::invalid_parameter("tiles.url_template", e.to_string()))?;

        if self.tile_size == 0 {
            return Err(XMapError::invalid_parameter(
                "tiles.tile_size",
                "must be positive",
            ));
        }
        if self.max_tiles == 0 {
            return Err(XMapError::invalid_parameter(
                "tiles.max_tiles",
                "must be positive",
            ));
        }
        if self.timeout_secs == 0 {
            return Err(XMapError::invalid_parameter(
                "tiles.timeout_secs",
                "must be positive",
            ));
        }
        Ok(())
    }
}

impl XMapConfig {
    /// Parse and validate a YAML document.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        // An empty file deserializes as null
        let config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(yaml)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a YAML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "Loaded config file");
        Self::from_yaml(&contents)
    }

    pub fn validate(&self) -> XMapResult<()> {
        if !self.extend_percentage.is_finite() || self.extend_percentage < 0.0 {
            return Err(XMapError::invalid_parameter(
                "extend_percentage",
                format!("must be a non-negative number, got {}", self.extend_percentage),
            ));
        }

        if Colormap::from_name(&self.colormap).is_none() {
            return Err(XMapError::invalid_parameter(
                "colormap",
                format!(
                    "unknown colormap '{}', expected one of {}",
                    self.colormap,
                    COLORMAP_NAMES.join(", ")
                ),
            ));
        }

        if let Some(outline) = &self.marker_outline {
            if outline.try_to_rgba().is_none() {
                return Err(XMapError::invalid_parameter(
                    "marker_outline",
                    format!("not a color: {:?}", outline),
                ));
            }
        }

        if let Some(range) = &self.value_range {
            if !range.min.is_finite() || !range.max.is_finite() {
                return Err(XMapError::invalid_parameter(
                    "value_range",
                    "min and max must be finite",
                ));
            }
        }

        if !(self.caption_size > 0.0) {
            return Err(XMapError::invalid_parameter(
                "caption_size",
                "must be positive",
            ));
        }

        self.tiles.validate()
    }

    /// Apply `X_MAP_*` overrides from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary lookup; empty values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = get(ENV_TILE_URL) {
            debug!(url = %url, "Tile URL overridden from environment");
            self.tiles.url_template = url;
        }
        if let Some(dir) = get(ENV_TILE_CACHE_DIR) {
            self.tiles.cache_dir = Some(PathBuf::from(dir));
        }
        if let Some(agent) = get(ENV_USER_AGENT) {
            self.tiles.user_agent = agent;
        }
    }

    pub fn overlay_style(&self) -> XMapResult<OverlayStyle> {
        let colormap = Colormap::from_name(&self.colormap).ok_or_else(|| {
            XMapError::invalid_parameter("colormap", format!("unknown colormap '{}'", self.colormap))
        })?;

        Ok(OverlayStyle {
            markers: self.markers,
            marker_radius: self.marker_radius,
            marker_outline: self.marker_outline.as_ref().map(|c| image::Rgba(c.to_bytes())),
            gradient_lines: self.gradient_lines,
            line_width: self.line_width,
            colormap,
            value_range: self.value_range,
            ..OverlayStyle::default()
        })
    }

    pub fn caption_style(&self) -> CaptionStyle {
        CaptionStyle {
            size: self.caption_size,
            ..CaptionStyle::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = XMapConfig::default();
        assert_eq!(config.min_size, PixelSize::square(512));
        assert_eq!(config.extend_percentage, 10.0);
        assert_eq!(config.marker_radius, 5);
        assert_eq!(config.line_width, 2);
        assert_eq!(config.colormap, "plasma");
        assert_eq!(config.tiles.max_zoom, 19);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_yaml_is_default() {
        let config = XMapConfig::from_yaml("").unwrap();
        assert_eq!(config.min_size, PixelSize::square(512));
        let config = XMapConfig::from_yaml("{}").unwrap();
        assert!(config.markers);
    }

    #[test]
    fn test_unknown_colormap_rejected() {
        let config = XMapConfig {
            colormap: "sunset".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(XMapError::InvalidParameter { ref param, .. }) if param == "colormap"
        ));
    }

    #[test]
    fn test_negative_extend_rejected() {
        let config = XMapConfig {
            extend_percentage: -5.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_marker_outline_rejected() {
        let err = XMapConfig::from_yaml("marker_outline: \"#a\u{e9}aaa\"\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid(XMapError::InvalidParameter { ref param, .. }) if param == "marker_outline"
        ));

        let config = XMapConfig::from_yaml("marker_outline: \"#000000\"\n").unwrap();
        assert_eq!(
            config.overlay_style().unwrap().marker_outline,
            Some(image::Rgba([0, 0, 0, 255]))
        );
    }

    #[test]
    fn test_overrides_ignore_empty_values() {
        let mut config = XMapConfig::default();
        config.apply_overrides(|key| match key {
            ENV_TILE_URL => Some("https://tiles.example.org/{z}/{x}/{y}.png".to_string()),
            ENV_USER_AGENT => Some("  ".to_string()),
            _ => None,
        });
        assert_eq!(
            config.tiles.url_template,
            "https://tiles.example.org/{z}/{x}/{y}.png"
        );
        assert_eq!(config.tiles.user_agent, default_user_agent());
        assert!(config.tiles.cache_dir.is_none());
    }

    #[test]
    fn test_overlay_style_from_config() {
        let config = XMapConfig {
            markers: false,
            line_width: 4,
            colormap: "viridis_r".to_string(),
            marker_outline: Some(Color::Named("black".to_string())),
            ..Default::default()
        };
        let style = config.overlay_style().unwrap();
        assert!(!style.markers);
        assert_eq!(style.line_width, 4);
        assert_eq!(style.marker_outline, Some(image::Rgba([0, 0, 0, 255])));
        assert_eq!(style.colormap, Colormap::viridis().reversed());
    }
}
