//! Two-click region selection state.
//!
//! The first click arms the draft, the second completes it. The caller
//! owns the state machine and drives it from map click/mousemove events;
//! drawing the on-map preview overlay stays with the caller.

use geo::Coord;

use crate::geometry::BoundingRegion;

/// State of an in-progress bounding-box selection
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum RegionDraft {
    /// No point selected yet
    #[default]
    Idle,
    /// One corner selected, waiting for the opposite one
    FirstPointSet(Coord<f64>),
}

impl RegionDraft {
    pub fn new() -> Self {
        Self::Idle
    }

    /// Feed a click into the draft.
    ///
    /// The first click arms it; the second completes the region and
    /// returns to [`RegionDraft::Idle`]. A second click at the same
    /// longitude or latitude as the first would make a zero-area box and
    /// resets the draft without producing a region.
    pub fn click(&mut self, point: Coord<f64>) -> Option<BoundingRegion> {
        match *self {
            RegionDraft::Idle => {
                *self = RegionDraft::FirstPointSet(point);
                None
            }
            RegionDraft::FirstPointSet(first) => {
                *self = RegionDraft::Idle;
                BoundingRegion::from_corners(first, point)
            }
        }
    }

    /// The region the current cursor position would complete, if armed.
    ///
    /// Drives the preview overlay while the user moves toward the second
    /// corner.
    pub fn preview(&self, cursor: Coord<f64>) -> Option<BoundingRegion> {
        match *self {
            RegionDraft::FirstPointSet(first) => BoundingRegion::from_corners(first, cursor),
            RegionDraft::Idle => None,
        }
    }

    /// Abandon any armed first point
    pub fn reset(&mut self) {
        *self = RegionDraft::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coord(x: f64, y: f64) -> Coord<f64> {
        Coord { x, y }
    }

    #[test]
    fn test_two_clicks_complete_a_region() {
        let mut draft = RegionDraft::new();

        assert_eq!(draft.click(coord(0.0, 0.0)), None);
        assert_eq!(draft, RegionDraft::FirstPointSet(coord(0.0, 0.0)));

        let region = draft.click(coord(2.0, 3.0)).unwrap();
        assert_eq!(region.west, 0.0);
        assert_eq!(region.south, 0.0);
        assert_eq!(region.east, 2.0);
        assert_eq!(region.north, 3.0);
        assert_eq!(draft, RegionDraft::Idle);
    }

    #[test]
    fn test_corner_order_does_not_matter() {
        let mut draft = RegionDraft::new();
        draft.click(coord(5.0, 5.0));
        let region = draft.click(coord(1.0, 2.0)).unwrap();
        assert_eq!(region.west, 1.0);
        assert_eq!(region.east, 5.0);
        assert_eq!(region.south, 2.0);
        assert_eq!(region.north, 5.0);
    }

    #[test]
    fn test_same_point_click_resets_without_region() {
        let mut draft = RegionDraft::new();
        draft.click(coord(1.0, 1.0));

        assert_eq!(draft.click(coord(1.0, 1.0)), None);
        assert_eq!(draft, RegionDraft::Idle);

        // The next click starts a fresh draft
        assert_eq!(draft.click(coord(4.0, 4.0)), None);
        assert!(draft.click(coord(5.0, 5.0)).is_some());
    }

    #[test]
    fn test_degenerate_second_click_rejected() {
        let mut draft = RegionDraft::new();
        draft.click(coord(1.0, 1.0));
        // Same longitude, zero width
        assert_eq!(draft.click(coord(1.0, 9.0)), None);
        assert_eq!(draft, RegionDraft::Idle);
    }

    #[test]
    fn test_preview_only_while_armed() {
        let mut draft = RegionDraft::new();
        assert_eq!(draft.preview(coord(3.0, 3.0)), None);

        draft.click(coord(0.0, 0.0));
        let preview = draft.preview(coord(3.0, 3.0)).unwrap();
        assert_eq!(preview.east, 3.0);
        assert_eq!(preview.north, 3.0);

        // Preview does not consume the draft
        assert_eq!(draft, RegionDraft::FirstPointSet(coord(0.0, 0.0)));
    }

    #[test]
    fn test_reset_disarms() {
        let mut draft = RegionDraft::new();
        draft.click(coord(0.0, 0.0));
        draft.reset();
        assert_eq!(draft, RegionDraft::Idle);
        assert_eq!(draft.preview(coord(1.0, 1.0)), None);
    }
}
