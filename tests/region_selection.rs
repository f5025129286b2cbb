//! From two clicks to an exported document.
//!
//! Drives the draft state machine the way a map UI would and checks that
//! the completed region flows through selection and rendering unchanged.

use std::sync::Arc;

use geo::{point, Coord};
use map2svg::{
    select_features, Exporter, FetchSprite, LayerKind, MapStyle, MapView, RegionDraft,
    ScreenPoint, SpriteCache, SpriteError, StyleLayer, StyledFeature,
};

struct FakeMap {
    features: Vec<StyledFeature>,
    layers: Vec<String>,
}

impl MapView for FakeMap {
    fn project(&self, coord: Coord<f64>) -> ScreenPoint {
        ScreenPoint::new(coord.x * 100.0, (1.0 - coord.y) * 100.0)
    }

    fn query_rendered_features(&self, _min: ScreenPoint, _max: ScreenPoint) -> Vec<StyledFeature> {
        self.features.clone()
    }

    fn style(&self) -> MapStyle {
        MapStyle {
            layers: self.layers.clone(),
            sprite: None,
        }
    }
}

struct NoFetch;

#[async_trait::async_trait]
impl FetchSprite for NoFetch {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, SpriteError> {
        Err(SpriteError::Fetch(format!("unexpected fetch of {url}")))
    }
}

fn exporter() -> Exporter {
    Exporter::with_sprites(SpriteCache::with_fetcher(Arc::new(NoFetch)))
}

fn poi_map() -> FakeMap {
    FakeMap {
        features: vec![
            StyledFeature::new(
                point!(x: 0.5, y: 0.5).into(),
                StyleLayer::new("poi", LayerKind::Circle).with_paint("circle-color", "#ff0000"),
            ),
            StyledFeature::new(
                point!(x: 3.0, y: 3.0).into(),
                StyleLayer::new("poi", LayerKind::Circle).with_paint("circle-color", "#ff0000"),
            ),
        ],
        layers: vec!["poi".to_string()],
    }
}

fn coord(x: f64, y: f64) -> Coord<f64> {
    Coord { x, y }
}

#[test]
fn test_two_clicks_drive_a_selection() {
    let map = poi_map();
    let mut draft = RegionDraft::new();

    assert_eq!(draft.click(coord(0.0, 0.0)), None);

    // The preview tracks the cursor while armed
    let preview = draft.preview(coord(0.4, 0.7)).expect("armed preview");
    assert_eq!(preview.east, 0.4);
    assert_eq!(preview.north, 0.7);

    let region = draft.click(coord(1.0, 1.0)).expect("completed region");
    let selected = select_features(&map, &region);

    assert_eq!(selected.len(), 1);
    assert_eq!(
        selected[0].geometry,
        geo::Geometry::Point(point!(x: 0.5, y: 0.5))
    );
}

#[tokio::test]
async fn test_click_order_does_not_change_the_export() {
    let map = poi_map();
    let exporter = exporter();

    let mut draft = RegionDraft::new();
    draft.click(coord(0.0, 0.0));
    let southwest_first = draft.click(coord(2.0, 1.0)).expect("completed region");

    draft.click(coord(2.0, 1.0));
    let northeast_first = draft.click(coord(0.0, 0.0)).expect("completed region");

    let a = exporter.export(&map, &southwest_first).await.expect("export");
    let b = exporter.export(&map, &northeast_first).await.expect("export");

    assert_eq!(a.svg.xml, b.svg.xml);
    assert_eq!(a.svg.width, 200.0);
    assert_eq!(a.svg.height, 100.0);
    assert_eq!(a.feature_count, 1);
}

#[tokio::test]
async fn test_restarted_draft_exports_the_new_corners() {
    let map = poi_map();
    let mut draft = RegionDraft::new();

    // Abandon a first attempt, then draft the unit region
    draft.click(coord(5.0, 5.0));
    draft.reset();
    draft.click(coord(0.0, 0.0));
    let region = draft.click(coord(1.0, 1.0)).expect("completed region");

    let export = exporter().export(&map, &region).await.expect("export");
    assert_eq!(export.svg.width, 100.0);
    assert_eq!(export.svg.height, 100.0);
    assert!(export.svg.xml.contains(r#"<circle cx="50" cy="50""#));
}
