//! Tile download.
//!
//! Key features:
//! - Blocking HTTP client with user agent and timeouts
//! - Exponential backoff retry on transient failures (429, 5xx, timeouts)
//! - Zoom and grid validation before any request is made

use std::thread;
use std::time::Duration;

use bytes::Bytes;
use reqwest::blocking::Client;
use tracing::{debug, instrument, warn};
use xmap_common::TileCoord;

use crate::{TileError, TileResult, TileSource};

/// Anything that can produce the encoded bytes of a tile.
pub trait TileFetcher {
    fn fetch_tile(&self, coord: TileCoord) -> TileResult<Bytes>;

    /// Forget any stored copy of a tile whose bytes turned out to be unusable.
    fn invalidate(&self, _coord: TileCoord) {}
}

impl<T: TileFetcher + ?Sized> TileFetcher for &T {
    fn fetch_tile(&self, coord: TileCoord) -> TileResult<Bytes> {
        (**self).fetch_tile(coord)
    }

    fn invalidate(&self, coord: TileCoord) {
        (**self).invalidate(coord)
    }
}

impl<T: TileFetcher + ?Sized> TileFetcher for Box<T> {
    fn fetch_tile(&self, coord: TileCoord) -> TileResult<Bytes> {
        (**self).fetch_tile(coord)
    }

    fn invalidate(&self, coord: TileCoord) {
        (**self).invalidate(coord)
    }
}

/// Configuration for the HTTP tile fetcher.
#[derive(Debug, Clone)]
pub struct HttpFetcherConfig {
    /// User-Agent header; tile servers such as OpenStreetMap require one
    pub user_agent: String,
    /// HTTP request timeout
    pub request_timeout: Duration,
    /// TCP connect timeout
    pub connect_timeout: Duration,
    /// Maximum number of retry attempts
    pub max_retries: u32,
    /// Initial retry delay (doubles each retry)
    pub initial_retry_delay: Duration,
    /// Maximum retry delay
    pub max_retry_delay: Duration,
}

impl Default for HttpFetcherConfig {
    fn default() -> Self {
        Self {
            user_agent: concat!("x-map/", env!("CARGO_PKG_VERSION")).to_string(),
            request_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            max_retries: 2,
            initial_retry_delay: Duration::from_millis(500),
            max_retry_delay: Duration::from_secs(8),
        }
    }
}

/// Downloads tiles from a [`TileSource`] over HTTP.
pub struct HttpTileFetcher {
    client: Client,
    source: TileSource,
    config: HttpFetcherConfig,
}

impl HttpTileFetcher {
    pub fn new(source: TileSource, config: HttpFetcherConfig) -> TileResult<Self> {
        source.validate()?;

        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(TileError::Client)?;

        Ok(Self {
            client,
            source,
            config,
        })
    }

    pub fn source(&self) -> &TileSource {
        &self.source
    }

    fn fetch_once(&self, url: &str) -> TileResult<Bytes> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|source| TileError::Request {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(TileError::Http {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.bytes().map_err(|source| TileError::Request {
            url: url.to_string(),
            source,
        })
    }
}

impl TileFetcher for HttpTileFetcher {
    #[instrument(skip(self), fields(tile = %coord))]
    fn fetch_tile(&self, coord: TileCoord) -> TileResult<Bytes> {
        check_coord(&coord, self.source.max_zoom)?;

        let url = self.source.url(&coord);
        let mut retry_count = 0;
        let mut delay = self.config.initial_retry_delay;

        loop {
            match self.fetch_once(&url) {
                Ok(bytes) => {
                    debug!(url = %url, bytes = bytes.len(), "Fetched tile");
                    return Ok(bytes);
                }
                Err(e) if e.is_retryable() && retry_count < self.config.max_retries => {
                    retry_count += 1;
                    warn!(
                        error = %e,
                        retry = retry_count,
                        max_retries = self.config.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        "Tile fetch failed, retrying"
                    );

                    thread::sleep(delay);

                    // Exponential backoff
                    delay = std::cmp::min(delay * 2, self.config.max_retry_delay);
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Reject tiles above the source's zoom limit or outside the tile grid.
pub(crate) fn check_coord(coord: &TileCoord, max_zoom: u32) -> TileResult<()> {
    if coord.z > max_zoom {
        return Err(TileError::ZoomOutOfRange {
            zoom: coord.z,
            max_zoom,
        });
    }
    if !coord.is_valid() {
        return Err(TileError::InvalidTile(*coord));
    }
    Ok(())
}
