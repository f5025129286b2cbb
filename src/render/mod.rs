//! SVG rendering of selected features.
//!
//! Features arrive in draw order from the selector; each contributes
//! primitives into a per-layer buffer, and the final document groups the
//! buffers as `<g id="layerId">` in the map style's layer order. Every
//! vertex is projected through the map at emission time, so output
//! reflects the view transform at the moment of the call.

mod config;
mod svg;

pub use config::SvgConfig;
pub use svg::SvgBuilder;

use geo::{Coord, Geometry, LineString, Polygon};

use crate::geometry::BoundingRegion;
use crate::map::{MapView, ScreenPoint, StyledFeature};
use crate::sprite::{SpriteAtlas, SpriteCache, SpriteError};
use crate::style::{LayerKind, StyleLayer};

const DEFAULT_CIRCLE_RADIUS: f64 = 5.0;
const DEFAULT_CIRCLE_COLOR: &str = "#000000";
const DEFAULT_TEXT_COLOR: &str = "#000000";

/// A rendered export: SVG markup plus its pixel dimensions
#[derive(Debug, Clone, PartialEq)]
pub struct SvgDocument {
    pub xml: String,
    pub width: f64,
    pub height: f64,
}

/// The projected output canvas.
///
/// The view box spans the axis-aligned extent of the four projected region
/// corners; the pixel dimensions average the opposing projected edge
/// lengths, which compensates for minor skew when the map is rotated or
/// pitched.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub min_x: f64,
    pub min_y: f64,
    pub view_width: f64,
    pub view_height: f64,
    pub pixel_width: f64,
    pub pixel_height: f64,
}

impl Viewport {
    /// Project the region's corners into the map's current screen space
    pub fn compute<M: MapView + ?Sized>(map: &M, region: &BoundingRegion) -> Self {
        let nw = map.project(region.nw());
        let ne = map.project(region.ne());
        let sw = map.project(region.sw());
        let se = map.project(region.se());

        let min_x = nw.x.min(ne.x).min(sw.x).min(se.x);
        let max_x = nw.x.max(ne.x).max(sw.x).max(se.x);
        let min_y = nw.y.min(ne.y).min(sw.y).min(se.y);
        let max_y = nw.y.max(ne.y).max(sw.y).max(se.y);

        Self {
            min_x,
            min_y,
            view_width: max_x - min_x,
            view_height: max_y - min_y,
            pixel_width: ((nw.x - ne.x) + (sw.x - se.x)).abs() / 2.0,
            pixel_height: ((nw.y - sw.y) + (ne.y - se.y)).abs() / 2.0,
        }
    }
}

/// Render selected features to an SVG document.
///
/// Suspends only when a symbol feature needs an icon and the style's
/// sprite atlas is not cached yet; everything else is synchronous. A
/// failed sprite fetch aborts the whole export. All other irregularities
/// degrade by omission.
pub async fn render_svg<M: MapView>(
    map: &M,
    features: &[StyledFeature],
    region: &BoundingRegion,
    sprites: &SpriteCache,
    config: &SvgConfig,
) -> Result<SvgDocument, SpriteError> {
    let style = map.style();
    let viewport = Viewport::compute(map, region);
    let mut builder = SvgBuilder::new(config.clone());

    let atlas = match &style.sprite {
        Some(url) if wants_icons(features) => Some(sprites.atlas(url).await?),
        _ => None,
    };

    for feature in features {
        render_feature(&mut builder, map, feature, atlas.as_deref());
    }

    Ok(SvgDocument {
        xml: builder.build(&viewport, &style.layers),
        width: viewport.pixel_width,
        height: viewport.pixel_height,
    })
}

/// Whether any feature will ask the sprite atlas for an icon
fn wants_icons(features: &[StyledFeature]) -> bool {
    features.iter().any(|feature| {
        matches!(
            feature.geometry,
            Geometry::Point(_) | Geometry::MultiPoint(_)
        ) && feature.layer.kind == LayerKind::Symbol
            && feature.layer.layout.str("icon-image").is_some()
    })
}

fn render_feature<M: MapView>(
    builder: &mut SvgBuilder,
    map: &M,
    feature: &StyledFeature,
    atlas: Option<&SpriteAtlas>,
) {
    let layer = &feature.layer;
    match &feature.geometry {
        Geometry::Point(point) => render_points(builder, map, layer, &[point.0], atlas),
        Geometry::MultiPoint(points) => {
            let coords: Vec<Coord<f64>> = points.iter().map(|p| p.0).collect();
            render_points(builder, map, layer, &coords, atlas);
        }
        Geometry::LineString(line) => {
            render_lines(builder, map, layer, std::slice::from_ref(line))
        }
        Geometry::MultiLineString(lines) => render_lines(builder, map, layer, &lines.0),
        Geometry::Polygon(polygon) => {
            render_polygons(builder, map, layer, std::slice::from_ref(polygon))
        }
        Geometry::MultiPolygon(polygons) => render_polygons(builder, map, layer, &polygons.0),
        other => {
            tracing::warn!(layer = %layer.id, geometry = geometry_name(other), "unhandled geometry type");
        }
    }
}

fn geometry_name(geometry: &Geometry<f64>) -> &'static str {
    match geometry {
        Geometry::Point(_) => "Point",
        Geometry::Line(_) => "Line",
        Geometry::LineString(_) => "LineString",
        Geometry::Polygon(_) => "Polygon",
        Geometry::MultiPoint(_) => "MultiPoint",
        Geometry::MultiLineString(_) => "MultiLineString",
        Geometry::MultiPolygon(_) => "MultiPolygon",
        Geometry::GeometryCollection(_) => "GeometryCollection",
        Geometry::Rect(_) => "Rect",
        Geometry::Triangle(_) => "Triangle",
    }
}

/// Points become icons and labels on symbol layers, circles on circle
/// layers; any other layer kind is out of scope for point geometry
fn render_points<M: MapView>(
    builder: &mut SvgBuilder,
    map: &M,
    layer: &StyleLayer,
    points: &[Coord<f64>],
    atlas: Option<&SpriteAtlas>,
) {
    match &layer.kind {
        LayerKind::Symbol => {
            for point in points {
                let at = map.project(*point);
                render_icon(builder, layer, at, atlas);
                render_label(builder, layer, at);
            }
        }
        LayerKind::Circle => {
            let radius = layer
                .paint
                .f64("circle-radius")
                .unwrap_or(DEFAULT_CIRCLE_RADIUS);
            let color = layer
                .paint
                .str("circle-color")
                .unwrap_or(DEFAULT_CIRCLE_COLOR);
            for point in points {
                let at = map.project(*point);
                builder.add_circle(&layer.id, at.x, at.y, radius, color);
            }
        }
        kind => {
            tracing::warn!(layer = %layer.id, kind = ?kind, "unhandled layer kind for point geometry");
        }
    }
}

/// The icon sits bottom-center on its anchor point, at the sprite's
/// display size
fn render_icon(
    builder: &mut SvgBuilder,
    layer: &StyleLayer,
    at: ScreenPoint,
    atlas: Option<&SpriteAtlas>,
) {
    let Some(atlas) = atlas else { return };
    let Some(name) = layer.layout.str("icon-image") else {
        return;
    };
    let Some(icon) = atlas.icon(name) else {
        tracing::debug!(icon = name, "icon not present in sprite atlas");
        return;
    };

    builder.add_image(
        &layer.id,
        &icon.href,
        at.x - icon.width / 2.0,
        at.y - icon.height,
        icon.width,
        icon.height,
    );
}

fn render_label(builder: &mut SvgBuilder, layer: &StyleLayer, at: ScreenPoint) {
    let Some(text) = layer.layout.string_like("text-field") else {
        return;
    };
    if text.is_empty() {
        return;
    }

    let size = layer.layout.f64("text-size");
    let em = size.unwrap_or(builder.config().base_text_size);
    let (dx, dy) = match layer.layout.f64_list("text-offset").as_deref() {
        Some(&[ox, oy]) => (ox * em, oy * em),
        _ => (0.0, 0.0),
    };
    let x = at.x + dx;
    let y = at.y + dy;

    let mut shared = String::new();
    if let Some(size) = size {
        shared.push_str(&format!(r#" font-size="{}""#, builder.fmt(size)));
    }
    if let Some(fonts) = layer.layout.str_list("text-font") {
        shared.push_str(&format!(
            r#" font-family="{}""#,
            svg::escape_xml(&fonts.join(", "))
        ));
    }
    if let Some(anchor) = text_anchor(layer.layout.str("text-anchor")) {
        shared.push_str(&format!(r#" text-anchor="{}""#, anchor));
    }

    // Halo duplicate goes underneath the label proper
    let halo_width = layer.paint.f64("text-halo-width").unwrap_or(0.0);
    if halo_width > 0.0 {
        if let Some(halo_color) = layer.paint.str("text-halo-color") {
            let attrs = format!(
                r#" fill="{halo_color}" stroke="{halo_color}" stroke-width="{}"{shared}"#,
                builder.fmt(halo_width * 2.0)
            );
            builder.add_text(&layer.id, &text, x, y, &attrs);
        }
    }

    let color = layer.paint.str("text-color").unwrap_or(DEFAULT_TEXT_COLOR);
    let attrs = format!(r#" fill="{color}"{shared}"#);
    builder.add_text(&layer.id, &text, x, y, &attrs);
}

/// Fixed anchor lookup; anything unmapped leaves the attribute out
fn text_anchor(value: Option<&str>) -> Option<&'static str> {
    match value? {
        "top" | "bottom" => Some("middle"),
        "left" => Some("left"),
        "right" => Some("right"),
        _ => None,
    }
}

/// One path per line part; nothing is drawn without a line color
fn render_lines<M: MapView>(
    builder: &mut SvgBuilder,
    map: &M,
    layer: &StyleLayer,
    lines: &[LineString<f64>],
) {
    let Some(color) = layer.paint.str("line-color") else {
        return;
    };

    let mut attrs = format!(r#" fill="none" stroke="{color}""#);
    if let Some(width) = layer.paint.f64("line-width") {
        attrs.push_str(&format!(r#" stroke-width="{}""#, builder.fmt(width)));
    }
    if let Some(opacity) = layer.paint.f64("line-opacity") {
        if opacity < 1.0 {
            attrs.push_str(&format!(r#" stroke-opacity="{}""#, builder.fmt(opacity)));
        }
    }
    if let Some(dashes) = layer.paint.f64_list("line-dasharray") {
        let dashes = dashes
            .iter()
            .map(|dash| builder.fmt(*dash))
            .collect::<Vec<_>>()
            .join(",");
        attrs.push_str(&format!(r#" stroke-dasharray="{dashes}""#));
    }
    if let Some(cap) = layer.layout.str("line-cap") {
        attrs.push_str(&format!(r#" stroke-linecap="{cap}""#));
    }
    if let Some(join) = layer.layout.str("line-join") {
        attrs.push_str(&format!(r#" stroke-linejoin="{join}""#));
    }

    for line in lines {
        if line.0.is_empty() {
            continue;
        }
        let d = path_d(builder, map, line);
        builder.add_path(&layer.id, &d, &attrs);
    }
}

/// Convert a line part to an SVG path `d` attribute, projecting as it goes
fn path_d<M: MapView>(builder: &SvgBuilder, map: &M, line: &LineString<f64>) -> String {
    line.0
        .iter()
        .enumerate()
        .map(|(i, coord)| {
            let at = map.project(*coord);
            let command = if i == 0 { "M" } else { "L" };
            format!("{} {},{}", command, builder.fmt(at.x), builder.fmt(at.y))
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// One polygon element per ring; nothing is drawn without a fill or
/// outline color
fn render_polygons<M: MapView>(
    builder: &mut SvgBuilder,
    map: &M,
    layer: &StyleLayer,
    polygons: &[Polygon<f64>],
) {
    let fill = layer.paint.str("fill-color");
    let outline = layer.paint.str("fill-outline-color");
    if fill.is_none() && outline.is_none() {
        return;
    }

    let mut attrs = format!(r#" fill="{}""#, fill.unwrap_or("none"));
    if let Some(outline) = outline {
        attrs.push_str(&format!(r#" stroke="{outline}""#));
    }

    for polygon in polygons {
        for ring in std::iter::once(polygon.exterior()).chain(polygon.interiors().iter()) {
            if ring.0.is_empty() {
                continue;
            }
            let points = ring_points(builder, map, ring);
            builder.add_polygon(&layer.id, &points, &attrs);
        }
    }
}

fn ring_points<M: MapView>(builder: &SvgBuilder, map: &M, ring: &LineString<f64>) -> String {
    ring.0
        .iter()
        .map(|coord| {
            let at = map.project(*coord);
            format!("{},{}", builder.fmt(at.x), builder.fmt(at.y))
        })
        .collect::<Vec<_>>()
        .join(" ")
}
