// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Simple polygons for room overlap accounting
//!
//! Rooms and annotation rectangles are compared through their intersection
//! area. Only an intersection that forms one connected region counts. The
//! intersection itself is computed with the i_overlay crate; this module
//! converts rings to and from its path format and measures the result.

use crate::types::Point2D;
use i_overlay::core::fill_rule::FillRule;
use i_overlay::core::overlay_rule::OverlayRule;
use i_overlay::float::single::SingleFloatOverlay;

/// Polygons with less area than this are considered degenerate
const MIN_AREA_THRESHOLD: f64 = 1e-10;

/// A simple polygon ring, without a repeated closing point.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    ring: Vec<Point2D>,
}

impl Polygon {
    /// Build a polygon from a polyline. A trailing point equal to the first
    /// is dropped. Returns `None` for fewer than three distinct vertices or
    /// a ring without area.
    pub fn new(points: &[Point2D]) -> Option<Self> {
        let mut ring = points.to_vec();
        if ring.len() > 1 && ring.first() == ring.last() {
            ring.pop();
        }
        if ring.len() < 3 {
            return None;
        }

        let polygon = Self { ring };
        if polygon.area() > MIN_AREA_THRESHOLD {
            Some(polygon)
        } else {
            None
        }
    }

    /// Axis-aligned rectangle spanned by two opposite corners.
    pub fn rectangle(p1: &Point2D, p2: &Point2D) -> Option<Self> {
        Self::new(&[
            Point2D::new(p1.x, p1.y),
            Point2D::new(p2.x, p1.y),
            Point2D::new(p2.x, p2.y),
            Point2D::new(p1.x, p2.y),
        ])
    }

    pub fn area(&self) -> f64 {
        signed_area(&self.ring).abs()
    }

    /// Area of the overlap between `self` and `other` when it is a single
    /// connected region. Disjoint or touching polygons, and overlaps that
    /// split into several pieces, give `None`.
    pub fn overlap_area(&self, other: &Polygon) -> Option<f64> {
        let subject = vec![ring_to_path(&self.ring)];
        let clip = vec![ring_to_path(&other.ring)];

        // Result is Vec<Vec<Vec<[f64; 2]>>>: shapes, each an outer contour
        // followed by its holes
        let shapes = subject.overlay(&clip, OverlayRule::Intersect, FillRule::EvenOdd);
        let mut pieces = shapes
            .iter()
            .map(|shape| shape_area(shape))
            .filter(|&area| area > MIN_AREA_THRESHOLD);

        match (pieces.next(), pieces.next()) {
            (Some(area), None) => Some(area),
            _ => None,
        }
    }
}

/// Shoelace area. Positive when counter-clockwise in a y-up frame.
pub fn signed_area(ring: &[Point2D]) -> f64 {
    if ring.len() < 3 {
        return 0.0;
    }

    let n = ring.len();
    let mut area = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        area += ring[i].x * ring[j].y;
        area -= ring[j].x * ring[i].y;
    }

    area * 0.5
}

fn ring_to_path(ring: &[Point2D]) -> Vec<[f64; 2]> {
    // i_overlay expects counter-clockwise outer contours
    if signed_area(ring) < 0.0 {
        ring.iter().rev().map(|p| [p.x, p.y]).collect()
    } else {
        ring.iter().map(|p| [p.x, p.y]).collect()
    }
}

fn contour_area(contour: &[[f64; 2]]) -> f64 {
    let points: Vec<Point2D> = contour.iter().map(|p| Point2D::new(p[0], p[1])).collect();
    signed_area(&points).abs()
}

fn shape_area(shape: &[Vec<[f64; 2]>]) -> f64 {
    let Some((outer, holes)) = shape.split_first() else {
        return 0.0;
    };
    let area = contour_area(outer) - holes.iter().map(|h| contour_area(h)).sum::<f64>();
    area.max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn square(x: f64, y: f64, size: f64) -> Polygon {
        Polygon::rectangle(&Point2D::new(x, y), &Point2D::new(x + size, y + size))
            .expect("square has area")
    }

    #[test]
    fn test_signed_area_orientation() {
        let ccw = [
            Point2D::new(0.0, 0.0),
            Point2D::new(1.0, 0.0),
            Point2D::new(1.0, 1.0),
            Point2D::new(0.0, 1.0),
        ];
        let cw: Vec<_> = ccw.iter().rev().cloned().collect();
        assert_relative_eq!(signed_area(&ccw), 1.0);
        assert_relative_eq!(signed_area(&cw), -1.0);
    }

    #[test]
    fn test_closed_polyline_drops_last_point() {
        let polyline = [
            Point2D::new(0.0, 0.0),
            Point2D::new(10.0, 0.0),
            Point2D::new(10.0, 10.0),
            Point2D::new(0.0, 10.0),
            Point2D::new(0.0, 0.0),
        ];
        let polygon = Polygon::new(&polyline).expect("valid polygon");
                assert_relative_eq!(polygon.area(), 100.0);
    }

    #[test]
    fn test_degenerate_polygons_rejected() {
        assert!(Polygon::new(&[Point2D::new(0.0, 0.0), Point2D::new(1.0, 0.0)]).is_none());
        let collinear = [
            Point2D::new(0.0, 0.0),
            Point2D::new(5.0, 0.0),
            Point2D::new(10.0, 0.0),
        ];
        assert!(Polygon::new(&collinear).is_none());
        assert!(Polygon::rectangle(&Point2D::new(1.0, 1.0), &Point2D::new(1.0, 5.0)).is_none());
    }

    #[test]
    fn test_overlap_area_partial() {
        let a = square(0.0, 0.0, 10.0);
        let b = square(5.0, 5.0, 10.0);
        assert_relative_eq!(a.overlap_area(&b).unwrap(), 25.0, epsilon = 1e-6);
    }

    #[test]
    fn test_overlap_area_contained() {
        let outer = square(0.0, 0.0, 10.0);
        let inner = square(2.0, 2.0, 3.0);
        assert_relative_eq!(outer.overlap_area(&inner).unwrap(), 9.0, epsilon = 1e-6);
        assert_relative_eq!(inner.overlap_area(&outer).unwrap(), 9.0, epsilon = 1e-6);
    }

    #[test]
    fn test_touching_polygons_have_no_overlap() {
        let a = square(0.0, 0.0, 10.0);
        let b = square(10.0, 0.0, 10.0);
        assert_eq!(a.overlap_area(&b), None);

        let far = square(50.0, 50.0, 1.0);
        assert_eq!(a.overlap_area(&far), None);
    }

    #[test]
    fn test_overlap_in_two_pieces_is_not_counted() {
        // U shape open at the top; the bar crosses both arms
        let u = Polygon::new(&[
            Point2D::new(0.0, 0.0),
            Point2D::new(30.0, 0.0),
            Point2D::new(30.0, 30.0),
            Point2D::new(20.0, 30.0),
            Point2D::new(20.0, 10.0),
            Point2D::new(10.0, 10.0),
            Point2D::new(10.0, 30.0),
            Point2D::new(0.0, 30.0),
        ])
        .expect("valid polygon");
        assert_relative_eq!(u.area(), 700.0);

        let bar = Polygon::rectangle(&Point2D::new(0.0, 20.0), &Point2D::new(30.0, 25.0)).unwrap();
        assert_eq!(u.overlap_area(&bar), None);

        let one_arm = Polygon::rectangle(&Point2D::new(0.0, 20.0), &Point2D::new(10.0, 25.0)).unwrap();
        assert_relative_eq!(u.overlap_area(&one_arm).unwrap(), 50.0, epsilon = 1e-6);
    }
}
