//! Sprite atlas fetching, cropping, and caching.
//!
//! A style's sprite is published as two resources next to each other: a
//! JSON table of named regions and a packed PNG. The cache fetches both on
//! the first icon lookup for a URL and keeps the decoded atlas for its own
//! lifetime. Fetching goes through [`FetchSprite`] so tests can substitute
//! a deterministic fetcher.

use std::collections::HashMap;
use std::io::Cursor;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use image::{DynamicImage, ImageOutputFormat};
use serde::Deserialize;
use thiserror::Error;

const REQUEST_TIMEOUT_SECS: u64 = 30;
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Errors raised while loading a sprite atlas
#[derive(Debug, Error)]
pub enum SpriteError {
    /// The metadata or image fetch failed
    #[error("sprite fetch failed: {0}")]
    Fetch(String),

    /// The metadata JSON did not parse
    #[error("sprite metadata invalid: {0}")]
    Metadata(String),

    /// The atlas image did not decode
    #[error("sprite image invalid: {0}")]
    Decode(String),
}

/// Placement of one named icon inside the atlas image
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct SpriteRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    #[serde(rename = "pixelRatio", default = "default_pixel_ratio")]
    pub pixel_ratio: f64,
}

fn default_pixel_ratio() -> f64 {
    1.0
}

impl SpriteRegion {
    /// pixelRatio as a divisor; zero and non-finite values read as 1
    fn display_ratio(&self) -> f64 {
        if self.pixel_ratio.is_finite() && self.pixel_ratio > 0.0 {
            self.pixel_ratio
        } else {
            1.0
        }
    }
}

/// An icon cropped out of the atlas, ready for embedding
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteIcon {
    /// PNG data URI
    pub href: String,
    /// Display width in CSS pixels (atlas pixels over pixelRatio)
    pub width: f64,
    /// Display height in CSS pixels
    pub height: f64,
}

/// A decoded sprite atlas: the packed image plus its named regions
pub struct SpriteAtlas {
    image: DynamicImage,
    regions: HashMap<String, SpriteRegion>,
}

impl SpriteAtlas {
    /// Decode an atlas from its two fetched halves
    pub fn decode(metadata: &[u8], image_bytes: &[u8]) -> Result<Self, SpriteError> {
        let regions: HashMap<String, SpriteRegion> =
            serde_json::from_slice(metadata).map_err(|e| SpriteError::Metadata(e.to_string()))?;
        let image =
            image::load_from_memory(image_bytes).map_err(|e| SpriteError::Decode(e.to_string()))?;
        Ok(Self { image, regions })
    }

    /// Crop the named icon and encode it as a PNG data URI.
    ///
    /// Returns `None` when the atlas has no region under that name.
    pub fn icon(&self, name: &str) -> Option<SpriteIcon> {
        let region = self.regions.get(name)?;
        let crop = self
            .image
            .crop_imm(region.x, region.y, region.width, region.height);

        let mut png = Vec::new();
        if let Err(e) = crop.write_to(&mut Cursor::new(&mut png), ImageOutputFormat::Png) {
            tracing::warn!(icon = name, error = %e, "failed to re-encode sprite icon");
            return None;
        }

        let ratio = region.display_ratio();
        Some(SpriteIcon {
            href: format!("data:image/png;base64,{}", STANDARD.encode(&png)),
            width: f64::from(region.width) / ratio,
            height: f64::from(region.height) / ratio,
        })
    }
}

/// Fetches sprite resources by URL
#[async_trait::async_trait]
pub trait FetchSprite: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, SpriteError>;
}

/// HTTP fetcher used outside tests
pub struct HttpFetcher {
    http: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, SpriteError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|e| SpriteError::Fetch(e.to_string()))?;
        Ok(Self { http })
    }
}

#[async_trait::async_trait]
impl FetchSprite for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, SpriteError> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| SpriteError::Fetch(e.to_string()))?;

        if !response.status().is_success() {
            return Err(SpriteError::Fetch(format!(
                "{url} returned {}",
                response.status()
            )));
        }

        response
            .bytes()
            .await
            .map(|bytes| bytes.to_vec())
            .map_err(|e| SpriteError::Fetch(e.to_string()))
    }
}

/// Lazily-populated cache of decoded atlases, keyed by sprite URL.
///
/// Exports racing on the same uncached URL may both fetch; the last insert
/// wins. The lock is never held across an await.
pub struct SpriteCache {
    fetcher: Arc<dyn FetchSprite>,
    atlases: Mutex<HashMap<String, Arc<SpriteAtlas>>>,
}

impl SpriteCache {
    /// Cache backed by the HTTP fetcher
    pub fn http() -> Result<Self, SpriteError> {
        Ok(Self::with_fetcher(Arc::new(HttpFetcher::new()?)))
    }

    /// Cache backed by a caller-supplied fetcher
    pub fn with_fetcher(fetcher: Arc<dyn FetchSprite>) -> Self {
        Self {
            fetcher,
            atlases: Mutex::new(HashMap::new()),
        }
    }

    /// The atlas for a sprite URL, fetching `{url}.json` and `{url}.png`
    /// on first use
    pub async fn atlas(&self, url: &str) -> Result<Arc<SpriteAtlas>, SpriteError> {
        if let Some(atlas) = self.lookup(url) {
            return Ok(atlas);
        }

        let metadata = self.fetcher.fetch(&format!("{url}.json")).await?;
        let image = self.fetcher.fetch(&format!("{url}.png")).await?;
        let atlas = Arc::new(SpriteAtlas::decode(&metadata, &image)?);

        self.atlases
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(url.to_string(), Arc::clone(&atlas));
        Ok(atlas)
    }

    fn lookup(&self, url: &str) -> Option<Arc<SpriteAtlas>> {
        self.atlases
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(url)
            .cloned()
    }
}
