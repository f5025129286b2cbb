//! Clipping of line and polygon geometries to a bounding region.
//!
//! Lines are clipped segment-by-segment with Cohen-Sutherland and split
//! into one part per contiguous run inside the window; polygon exterior
//! rings are clipped with Sutherland-Hodgman. Interior rings are dropped
//! when a polygon is clipped; they survive only on geometries that bypass
//! clipping.

use geo::{Coord, LineString, Polygon};
use thiserror::Error;

use super::BoundingRegion;

/// Raised when a ring cannot be clipped meaningfully
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ClipError {
    /// The geometry carries NaN or infinite coordinates
    #[error("geometry has non-finite coordinates")]
    NonFinite,

    /// The exterior ring has fewer than three distinct vertices
    #[error("ring has fewer than three distinct vertices")]
    DegenerateRing,
}

/// The rectangular clip window in geographic coordinates
#[derive(Debug, Clone, Copy)]
pub struct ClipRect {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl ClipRect {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }
}

impl From<&BoundingRegion> for ClipRect {
    fn from(region: &BoundingRegion) -> Self {
        Self::new(region.west, region.south, region.east, region.north)
    }
}

/// Edge of the clip window
#[derive(Debug, Clone, Copy)]
enum Edge {
    Left,
    Right,
    Bottom,
    Top,
}

impl Edge {
    fn is_inside(&self, p: &Coord<f64>, rect: &ClipRect) -> bool {
        match self {
            Edge::Left => p.x >= rect.min_x,
            Edge::Right => p.x <= rect.max_x,
            Edge::Bottom => p.y >= rect.min_y,
            Edge::Top => p.y <= rect.max_y,
        }
    }

    fn intersect(&self, p: &Coord<f64>, q: &Coord<f64>, rect: &ClipRect) -> Coord<f64> {
        let dx = q.x - p.x;
        let dy = q.y - p.y;

        match self {
            Edge::Left => {
                let t = (rect.min_x - p.x) / dx;
                Coord {
                    x: rect.min_x,
                    y: p.y + t * dy,
                }
            }
            Edge::Right => {
                let t = (rect.max_x - p.x) / dx;
                Coord {
                    x: rect.max_x,
                    y: p.y + t * dy,
                }
            }
            Edge::Bottom => {
                let t = (rect.min_y - p.y) / dy;
                Coord {
                    x: p.x + t * dx,
                    y: rect.min_y,
                }
            }
            Edge::Top => {
                let t = (rect.max_y - p.y) / dy;
                Coord {
                    x: p.x + t * dx,
                    y: rect.max_y,
                }
            }
        }
    }
}

/// One Sutherland-Hodgman pass against a single edge
fn clip_ring_edge(vertices: &[Coord<f64>], edge: Edge, rect: &ClipRect) -> Vec<Coord<f64>> {
    if vertices.is_empty() {
        return Vec::new();
    }

    let mut output = Vec::new();
    let n = vertices.len();

    for i in 0..n {
        let current = &vertices[i];
        let next = &vertices[(i + 1) % n];

        let current_inside = edge.is_inside(current, rect);
        let next_inside = edge.is_inside(next, rect);

        match (current_inside, next_inside) {
            (true, true) => {
                output.push(*next);
            }
            (true, false) => {
                output.push(edge.intersect(current, next, rect));
            }
            (false, true) => {
                output.push(edge.intersect(current, next, rect));
                output.push(*next);
            }
            (false, false) => {}
        }
    }

    output
}

/// Clip a polygon's exterior ring to the window.
///
/// `Ok(None)` means the polygon lies entirely outside. `Err` reports input
/// the algorithm cannot handle, letting callers decide between dropping the
/// geometry and passing it through untouched.
pub fn clip_polygon(polygon: &Polygon<f64>, rect: &ClipRect) -> Result<Option<Polygon<f64>>, ClipError> {
    let mut vertices: Vec<Coord<f64>> = polygon.exterior().0.to_vec();

    if vertices.iter().any(|c| !c.x.is_finite() || !c.y.is_finite()) {
        return Err(ClipError::NonFinite);
    }

    // Drop the closing vertex for the algorithm
    if vertices.len() > 1 && vertices.first() == vertices.last() {
        vertices.pop();
    }
    if vertices.len() < 3 {
        return Err(ClipError::DegenerateRing);
    }

    for edge in [Edge::Left, Edge::Right, Edge::Bottom, Edge::Top] {
        vertices = clip_ring_edge(&vertices, edge, rect);
        if vertices.is_empty() {
            return Ok(None);
        }
    }

    // Close the ring again
    vertices.push(vertices[0]);

    Ok(Some(Polygon::new(LineString::new(vertices), vec![])))
}

/// Clip a line string to the window, one part per contiguous run inside.
///
/// A line that exits the window and re-enters is never joined across the
/// gap; each visible run comes back as its own part. Empty when nothing
/// remains inside.
pub fn clip_line_string(line: &LineString<f64>, rect: &ClipRect) -> Vec<LineString<f64>> {
    let mut parts: Vec<LineString<f64>> = Vec::new();
    let mut run: Vec<Coord<f64>> = Vec::new();

    for window in line.0.windows(2) {
        let (p0, p1) = (window[0], window[1]);
        match clip_segment(p0, p1, rect) {
            Some((c0, c1)) => {
                // A start that does not continue the run opens a new part
                if run.last() != Some(&c0) {
                    end_run(&mut parts, &mut run);
                    run.push(c0);
                }
                run.push(c1);
            }
            None => end_run(&mut parts, &mut run),
        }
    }
    end_run(&mut parts, &mut run);

    parts
}

fn end_run(parts: &mut Vec<LineString<f64>>, run: &mut Vec<Coord<f64>>) {
    if run.len() >= 2 {
        parts.push(LineString::new(std::mem::take(run)));
    } else {
        run.clear();
    }
}

/// Cohen-Sutherland region codes
const INSIDE: u8 = 0b0000;
const LEFT: u8 = 0b0001;
const RIGHT: u8 = 0b0010;
const BOTTOM: u8 = 0b0100;
const TOP: u8 = 0b1000;

fn outcode(p: Coord<f64>, rect: &ClipRect) -> u8 {
    let mut code = INSIDE;
    if p.x < rect.min_x {
        code |= LEFT;
    }
    if p.x > rect.max_x {
        code |= RIGHT;
    }
    if p.y < rect.min_y {
        code |= BOTTOM;
    }
    if p.y > rect.max_y {
        code |= TOP;
    }
    code
}

fn clip_segment(
    mut p0: Coord<f64>,
    mut p1: Coord<f64>,
    rect: &ClipRect,
) -> Option<(Coord<f64>, Coord<f64>)> {
    let mut code0 = outcode(p0, rect);
    let mut code1 = outcode(p1, rect);

    loop {
        if (code0 | code1) == 0 {
            return Some((p0, p1));
        }
        if (code0 & code1) != 0 {
            return None;
        }

        let code_out = if code0 != 0 { code0 } else { code1 };
        let dx = p1.x - p0.x;
        let dy = p1.y - p0.y;

        let new_point = if code_out & TOP != 0 {
            let t = (rect.max_y - p0.y) / dy;
            Coord {
                x: p0.x + t * dx,
                y: rect.max_y,
            }
        } else if code_out & BOTTOM != 0 {
            let t = (rect.min_y - p0.y) / dy;
            Coord {
                x: p0.x + t * dx,
                y: rect.min_y,
            }
        } else if code_out & RIGHT != 0 {
            let t = (rect.max_x - p0.x) / dx;
            Coord {
                x: rect.max_x,
                y: p0.y + t * dy,
            }
        } else {
            let t = (rect.min_x - p0.x) / dx;
            Coord {
                x: rect.min_x,
                y: p0.y + t * dy,
            }
        };

        if code_out == code0 {
            p0 = new_point;
            code0 = outcode(p0, rect);
        } else {
            p1 = new_point;
            code1 = outcode(p1, rect);
        }
    }
}
