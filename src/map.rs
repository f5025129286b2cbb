//! The live-map collaborator consumed by the exporter

use geo::{Coord, Geometry};

use crate::style::StyleLayer;

/// A screen-space pixel coordinate
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A rendered feature tagged with the style layer that drew it
#[derive(Debug, Clone)]
pub struct StyledFeature {
    pub geometry: Geometry<f64>,
    pub layer: StyleLayer,
}

impl StyledFeature {
    pub fn new(geometry: Geometry<f64>, layer: StyleLayer) -> Self {
        Self { geometry, layer }
    }
}

/// The slice of the map's style the exporter needs: layer ids in draw
/// order, and the sprite URL if the style has one
#[derive(Debug, Clone, Default)]
pub struct MapStyle {
    pub layers: Vec<String>,
    pub sprite: Option<String>,
}

/// Read access to the live map.
///
/// Implemented by an adapter over the embedding map engine. The exporter
/// only reads map state; it never mutates the map.
pub trait MapView {
    /// Project a geographic coordinate into the current screen-pixel space
    fn project(&self, coord: Coord<f64>) -> ScreenPoint;

    /// Rendered features whose screen footprint intersects the pixel box
    /// spanned by `min` and `max`, each tagged with its style layer
    fn query_rendered_features(&self, min: ScreenPoint, max: ScreenPoint) -> Vec<StyledFeature>;

    /// The map's current style summary
    fn style(&self) -> MapStyle;

    /// Raw attribution markup per data source, in source order
    fn source_attributions(&self) -> Vec<String> {
        Vec::new()
    }
}
