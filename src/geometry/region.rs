//! Geographic bounding regions

use geo::{Coord, LineString, Polygon};

/// An axis-aligned rectangle in geographic longitude/latitude.
///
/// Invariant: `west < east` and `south < north`. [`BoundingRegion::from_corners`]
/// is the checked way to build one from user clicks; code constructing a
/// region directly is responsible for the invariant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingRegion {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl BoundingRegion {
    /// Build a region from two opposite corners, normalizing their order.
    ///
    /// Returns `None` when the corners describe a zero-width or zero-height
    /// box.
    pub fn from_corners(a: Coord<f64>, b: Coord<f64>) -> Option<Self> {
        let west = a.x.min(b.x);
        let east = a.x.max(b.x);
        let south = a.y.min(b.y);
        let north = a.y.max(b.y);
        if west == east || south == north {
            return None;
        }
        Some(Self {
            west,
            south,
            east,
            north,
        })
    }

    /// North-west corner
    pub fn nw(&self) -> Coord<f64> {
        Coord {
            x: self.west,
            y: self.north,
        }
    }

    /// North-east corner
    pub fn ne(&self) -> Coord<f64> {
        Coord {
            x: self.east,
            y: self.north,
        }
    }

    /// South-west corner
    pub fn sw(&self) -> Coord<f64> {
        Coord {
            x: self.west,
            y: self.south,
        }
    }

    /// South-east corner
    pub fn se(&self) -> Coord<f64> {
        Coord {
            x: self.east,
            y: self.south,
        }
    }

    /// All four corners, north row first
    pub fn corners(&self) -> [Coord<f64>; 4] {
        [self.nw(), self.ne(), self.sw(), self.se()]
    }

    /// The region as a closed polygon ring
    pub fn to_polygon(&self) -> Polygon<f64> {
        Polygon::new(
            LineString::from(vec![
                (self.west, self.north),
                (self.east, self.north),
                (self.east, self.south),
                (self.west, self.south),
                (self.west, self.north),
            ]),
            vec![],
        )
    }
}
