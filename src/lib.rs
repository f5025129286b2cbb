//! map2svg - Export the features inside a map bounding box as SVG
//!
//! This library takes a bounding region drawn on an interactive map and
//! turns the rendered features inside it into a standalone SVG document.
//! Features are selected and clipped to the region, reprojected into the
//! map's current screen-pixel space, and emitted as SVG primitives styled
//! from their layer's paint and layout properties, in the map's draw order.
//!
//! The map engine itself stays outside: callers implement [`MapView`] over
//! whatever engine renders their map, and [`RegionDraft`] turns two clicks
//! into a [`BoundingRegion`].
//!
//! # Example
//!
//! ```rust
//! use geo::Coord;
//! use map2svg::{BoundingRegion, Exporter, MapStyle, MapView, ScreenPoint, StyledFeature};
//!
//! // Adapter over the embedding map engine; this one is an unrotated
//! // view at 100 pixels per degree with nothing rendered.
//! struct FlatMap;
//!
//! impl MapView for FlatMap {
//!     fn project(&self, coord: Coord<f64>) -> ScreenPoint {
//!         ScreenPoint::new(coord.x * 100.0, coord.y * -100.0)
//!     }
//!
//!     fn query_rendered_features(&self, _: ScreenPoint, _: ScreenPoint) -> Vec<StyledFeature> {
//!         Vec::new()
//!     }
//!
//!     fn style(&self) -> MapStyle {
//!         MapStyle::default()
//!     }
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), map2svg::ExportError> {
//! let region = BoundingRegion::from_corners(
//!     Coord { x: 139.69, y: 35.68 },
//!     Coord { x: 139.71, y: 35.70 },
//! )
//! .expect("corners span an area");
//!
//! let export = Exporter::http()?.export(&FlatMap, &region).await?;
//! assert!(export.svg.xml.contains("<svg"));
//! # Ok(())
//! # }
//! ```

pub mod attribution;
pub mod draft;
pub mod format;
pub mod geometry;
pub mod map;
pub mod render;
pub mod select;
pub mod sprite;
pub mod style;

pub use attribution::{collect_attributions, Attribution, AttributionLink};
pub use draft::RegionDraft;
pub use format::byte_label;
pub use geometry::BoundingRegion;
pub use map::{MapStyle, MapView, ScreenPoint, StyledFeature};
pub use render::{render_svg, SvgConfig, SvgDocument};
pub use select::select_features;
pub use sprite::{FetchSprite, HttpFetcher, SpriteCache, SpriteError};
pub use style::{LayerKind, Properties, StyleLayer};

use thiserror::Error;

/// Errors that can abort an export.
///
/// Everything else in the pipeline degrades by omission; only a failed
/// sprite-atlas load surfaces to the caller.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The style's sprite atlas could not be fetched or decoded
    #[error("sprite atlas: {0}")]
    Sprite(#[from] SpriteError),
}

/// One finished export: the SVG document plus the figures a result dialog
/// shows alongside it
#[derive(Debug, Clone)]
pub struct Export {
    /// The rendered document
    pub svg: SvgDocument,
    /// How many features survived selection and clipping
    pub feature_count: usize,
    /// Attribution entries for the data sources in view
    pub attributions: Vec<Attribution>,
}

impl Export {
    /// Size of the serialized markup in bytes, as a download would report it
    pub fn byte_size(&self) -> u64 {
        self.svg.xml.len() as u64
    }
}

/// Runs exports against a live map.
///
/// Holds the sprite cache across exports so a style's atlas is fetched at
/// most once per exporter, and the SVG output configuration.
pub struct Exporter {
    sprites: SpriteCache,
    config: SvgConfig,
}

impl Exporter {
    /// Exporter that fetches sprite atlases over HTTP
    pub fn http() -> Result<Self, ExportError> {
        Ok(Self::with_sprites(SpriteCache::http()?))
    }

    /// Exporter over a caller-supplied sprite cache
    pub fn with_sprites(sprites: SpriteCache) -> Self {
        Self {
            sprites,
            config: SvgConfig::default(),
        }
    }

    /// Set the SVG output configuration
    pub fn with_config(mut self, config: SvgConfig) -> Self {
        self.config = config;
        self
    }

    /// Export the features inside `region` as an SVG document.
    ///
    /// Selects and clips the map's rendered features to the region, then
    /// renders them in the style's layer order. Suspends only when an icon
    /// is needed and the style's sprite atlas is not cached yet. The region
    /// must be non-degenerate; [`BoundingRegion::from_corners`] and
    /// [`RegionDraft`] only produce such regions.
    pub async fn export<M: MapView>(
        &self,
        map: &M,
        region: &BoundingRegion,
    ) -> Result<Export, ExportError> {
        let features = select_features(map, region);
        tracing::debug!(count = features.len(), "features selected for export");

        let svg = render_svg(map, &features, region, &self.sprites, &self.config).await?;
        let attributions = collect_attributions(&map.source_attributions());

        Ok(Export {
            svg,
            feature_count: features.len(),
            attributions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{point, Coord};
    use std::sync::Arc;

    struct FakeMap {
        features: Vec<StyledFeature>,
        layers: Vec<String>,
        sprite: Option<String>,
        attributions: Vec<String>,
    }

    impl FakeMap {
        fn empty() -> Self {
            Self {
                features: Vec::new(),
                layers: Vec::new(),
                sprite: None,
                attributions: Vec::new(),
            }
        }
    }

    impl MapView for FakeMap {
        fn project(&self, coord: Coord<f64>) -> ScreenPoint {
            ScreenPoint::new(coord.x * 100.0, (1.0 - coord.y) * 100.0)
        }

        fn query_rendered_features(
            &self,
            _min: ScreenPoint,
            _max: ScreenPoint,
        ) -> Vec<StyledFeature> {
            self.features.clone()
        }

        fn style(&self) -> MapStyle {
            MapStyle {
                layers: self.layers.clone(),
                sprite: self.sprite.clone(),
            }
        }

        fn source_attributions(&self) -> Vec<String> {
            self.attributions.clone()
        }
    }

    struct FailingFetcher;

    #[async_trait::async_trait]
    impl FetchSprite for FailingFetcher {
        async fn fetch(&self, url: &str) -> Result<Vec<u8>, SpriteError> {
            Err(SpriteError::Fetch(format!("{url} unreachable")))
        }
    }

    fn exporter() -> Exporter {
        Exporter::with_sprites(SpriteCache::with_fetcher(Arc::new(FailingFetcher)))
    }

    fn unit_region() -> BoundingRegion {
        BoundingRegion {
            west: 0.0,
            south: 0.0,
            east: 1.0,
            north: 1.0,
        }
    }

    #[tokio::test]
    async fn test_export_empty_map() {
        let export = exporter()
            .export(&FakeMap::empty(), &unit_region())
            .await
            .unwrap();

        assert!(export.svg.xml.starts_with("<?xml"));
        assert!(export.svg.xml.contains("<svg"));
        assert!(export.svg.xml.ends_with("</svg>"));
        assert_eq!(export.feature_count, 0);
        assert!(export.attributions.is_empty());
    }

    #[tokio::test]
    async fn test_export_renders_selected_features() {
        let map = FakeMap {
            features: vec![StyledFeature::new(
                point!(x: 0.5, y: 0.5).into(),
                StyleLayer::new("poi", LayerKind::Circle).with_paint("circle-radius", 5.0),
            )],
            layers: vec!["poi".to_string()],
            sprite: None,
            attributions: Vec::new(),
        };

        let export = exporter().export(&map, &unit_region()).await.unwrap();
        assert_eq!(export.feature_count, 1);
        assert!(export.svg.xml.contains(r#"<g id="poi">"#));
        assert!(export.svg.xml.contains("<circle"));
    }

    #[tokio::test]
    async fn test_export_collects_attributions() {
        let map = FakeMap {
            attributions: vec!["© Example".to_string()],
            ..FakeMap::empty()
        };

        let export = exporter().export(&map, &unit_region()).await.unwrap();
        assert_eq!(export.attributions.len(), 1);
        assert_eq!(export.attributions[0].text, "© Example");
    }

    #[tokio::test]
    async fn test_sprite_fetch_failure_aborts_export() {
        let map = FakeMap {
            features: vec![StyledFeature::new(
                point!(x: 0.5, y: 0.5).into(),
                StyleLayer::new("poi", LayerKind::Symbol).with_layout("icon-image", "marker"),
            )],
            layers: vec!["poi".to_string()],
            sprite: Some("https://tiles.example/sprite".to_string()),
            attributions: Vec::new(),
        };

        let result = exporter().export(&map, &unit_region()).await;
        assert!(matches!(result, Err(ExportError::Sprite(_))));
    }

    #[tokio::test]
    async fn test_byte_size_matches_markup_length() {
        let export = exporter()
            .export(&FakeMap::empty(), &unit_region())
            .await
            .unwrap();
        assert_eq!(export.byte_size(), export.svg.xml.len() as u64);
        assert!(!byte_label(export.byte_size()).is_empty());
    }
}
