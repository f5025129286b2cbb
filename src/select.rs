//! Feature selection and clipping for a bounding region.
//!
//! Queries the map for rendered features under the projected region,
//! clips each geometry to the region's geographic extent, and sorts the
//! survivors bottom-to-top by their layer's position in the style.

use std::collections::HashMap;

use geo::{Contains, Geometry, MultiLineString, MultiPoint, MultiPolygon};

use crate::geometry::clip::{clip_line_string, clip_polygon, ClipRect};
use crate::geometry::BoundingRegion;
use crate::map::{MapView, ScreenPoint, StyledFeature};

/// Features intersecting the region, clipped to it and sorted ascending by
/// style-layer index.
///
/// Point geometries survive only strictly inside the region; lines and
/// polygons are clipped to its bounding box. A line that leaves the region
/// and re-enters splits into its visible parts. A multipolygon whose clip
/// fails passes through unclipped, trading an oversized feature for not
/// losing it. Unrecognized geometry types are silently excluded. Ties in
/// layer order keep their query order.
pub fn select_features<M: MapView>(map: &M, region: &BoundingRegion) -> Vec<StyledFeature> {
    let corners = region.corners().map(|corner| map.project(corner));
    let min = ScreenPoint::new(
        corners.iter().map(|p| p.x).fold(f64::INFINITY, f64::min),
        corners.iter().map(|p| p.y).fold(f64::INFINITY, f64::min),
    );
    let max = ScreenPoint::new(
        corners.iter().map(|p| p.x).fold(f64::NEG_INFINITY, f64::max),
        corners.iter().map(|p| p.y).fold(f64::NEG_INFINITY, f64::max),
    );

    let region_polygon = region.to_polygon();
    let rect = ClipRect::from(region);

    let mut selected: Vec<StyledFeature> = map
        .query_rendered_features(min, max)
        .into_iter()
        .filter_map(|feature| {
            clip_feature(feature.geometry, &region_polygon, &rect)
                .map(|geometry| StyledFeature::new(geometry, feature.layer))
        })
        .collect();

    let style = map.style();
    let order: HashMap<&str, usize> = style
        .layers
        .iter()
        .enumerate()
        .map(|(index, id)| (id.as_str(), index))
        .collect();
    selected.sort_by_key(|feature| {
        order
            .get(feature.layer.id.as_str())
            .copied()
            .unwrap_or(usize::MAX)
    });

    selected
}

fn clip_feature(
    geometry: Geometry<f64>,
    region: &geo::Polygon<f64>,
    rect: &ClipRect,
) -> Option<Geometry<f64>> {
    match geometry {
        Geometry::Point(point) => region
            .contains(&point)
            .then(|| Geometry::Point(point)),
        Geometry::MultiPoint(points) => {
            let inside: Vec<geo::Point<f64>> = points
                .0
                .into_iter()
                .filter(|point| region.contains(point))
                .collect();
            if inside.is_empty() {
                None
            } else {
                Some(Geometry::MultiPoint(MultiPoint::new(inside)))
            }
        }
        Geometry::LineString(line) => {
            let mut parts = clip_line_string(&line, rect);
            match parts.len() {
                0 => None,
                1 => Some(Geometry::LineString(parts.remove(0))),
                _ => Some(Geometry::MultiLineString(MultiLineString::new(parts))),
            }
        }
        Geometry::MultiLineString(lines) => {
            let clipped: Vec<geo::LineString<f64>> = lines
                .0
                .iter()
                .flat_map(|line| clip_line_string(line, rect))
                .collect();
            if clipped.is_empty() {
                None
            } else {
                Some(Geometry::MultiLineString(MultiLineString::new(clipped)))
            }
        }
        Geometry::Polygon(polygon) => match clip_polygon(&polygon, rect) {
            Ok(kept) => kept.map(Geometry::Polygon),
            Err(error) => {
                tracing::debug!(error = %error, "dropping polygon that failed to clip");
                None
            }
        },
        Geometry::MultiPolygon(polygons) => {
            let mut clipped = Vec::new();
            for polygon in &polygons.0 {
                match clip_polygon(polygon, rect) {
                    Ok(Some(kept)) => clipped.push(kept),
                    // An empty clip result just drops this ring
                    Ok(None) => {}
                    Err(error) => {
                        tracing::debug!(error = %error, "clip failed, passing multipolygon through unclipped");
                        return Some(Geometry::MultiPolygon(polygons));
                    }
                }
            }
            if clipped.is_empty() {
                None
            } else {
                Some(Geometry::MultiPolygon(MultiPolygon::new(clipped)))
            }
        }
        _ => None,
    }
}
