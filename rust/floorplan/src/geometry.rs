// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Stateless geometric primitives used by every reconstruction stage

use crate::types::Point2D;

/// Axis-wise distance between two points: `max(|dx|, |dy|)`.
///
/// This is the "manhattan" metric of the R2V tooling. For two points on an
/// axis-aligned wall it equals the distance along the wall.
pub fn manhattan_distance(a: &Point2D, b: &Point2D) -> f64 {
    (a.x - b.x).abs().max((a.y - b.y).abs())
}

pub fn euclidean_distance(a: &Point2D, b: &Point2D) -> f64 {
    a.vector_to(b).norm()
}

/// Perpendicular distance from `p` to the line `y = gradient * x + intercept`
pub fn perpendicular_distance(gradient: f64, intercept: f64, p: &Point2D) -> f64 {
    (-gradient * p.x + p.y - intercept).abs() / (gradient * gradient + 1.0).sqrt()
}

/// Shortest distance from `p` to the segment `a`-`b`, and the closest point.
///
/// With `extend_line` the segment is treated as an infinite line.
pub fn point_segment_distance(
    a: &Point2D,
    b: &Point2D,
    p: &Point2D,
    extend_line: bool,
) -> (f64, Point2D) {
    let d = a.vector_to(b);
    let norm_sq = d.norm_squared();

    if norm_sq == 0.0 {
        return (euclidean_distance(a, p), *a);
    }

    let mut u = a.vector_to(p).dot(&d) / norm_sq;
    if !extend_line {
        u = u.clamp(0.0, 1.0);
    }

    let foot = Point2D::new(a.x + u * d.x, a.y + u * d.y);
    (euclidean_distance(&foot, p), foot)
}

/// Distance between a rectangle annotation and a segment: the smallest
/// distance between any rectangle corner and either segment endpoint.
pub fn rect_segment_distance(
    rect_p1: &Point2D,
    rect_p2: &Point2D,
    seg_p1: &Point2D,
    seg_p2: &Point2D,
) -> f64 {
    let corners = [
        Point2D::new(rect_p1.x, rect_p1.y),
        Point2D::new(rect_p2.x, rect_p1.y),
        Point2D::new(rect_p2.x, rect_p2.y),
        Point2D::new(rect_p1.x, rect_p2.y),
    ];

    corners
        .iter()
        .flat_map(|c| [euclidean_distance(c, seg_p1), euclidean_distance(c, seg_p2)])
        .fold(f64::INFINITY, f64::min)
}

/// Angle of a vector in degrees, measured counter-clockwise from +x with
/// the image y-axis pointing down. Result lies in `(-180, 180]`.
pub fn vector_angle(dx: f64, dy: f64) -> f64 {
    let h = (dx * dx + dy * dy).sqrt();
    let angle = (dx / h).clamp(-1.0, 1.0).acos().to_degrees();
    if dy > 0.0 {
        -angle
    } else {
        angle
    }
}

/// Angle from `v1` to `v2` in degrees. Both angles are first mapped to
/// `[0, 360)`, so the result lies in `(-360, 360)`.
pub fn angle_between(v1: (f64, f64), v2: (f64, f64)) -> f64 {
    let wrap = |a: f64| if a < 0.0 { a + 360.0 } else { a };
    wrap(vector_angle(v2.0, v2.1)) - wrap(vector_angle(v1.0, v1.1))
}

/// Order `a` and `b` by Euclidean distance to `target`: `(closest, furthest)`.
pub fn closest_and_furthest(target: &Point2D, a: Point2D, b: Point2D) -> (Point2D, Point2D) {
    if euclidean_distance(target, &a) < euclidean_distance(target, &b) {
        (a, b)
    } else {
        (b, a)
    }
}

/// Convert a wall-local interval to a world-space segment.
pub fn hole_to_line(wall_p1: &Point2D, wall_p2: &Point2D, min_x: f64, max_x: f64) -> (Point2D, Point2D) {
    let d = wall_p1.vector_to(wall_p2);
    let length = d.norm();
    let at = |t: f64| Point2D::new(wall_p1.x + d.x / length * t, wall_p1.y + d.y / length * t);
    (at(min_x), at(max_x))
}

/// Test whether the `child` segment lies along the `parent` segment.
///
/// Both child endpoints must be within `margin` of the parent's line and map
/// onto the parent's endpoints without crossing. Returns the smaller of the
/// two perpendicular offsets on success.
pub fn line_contains(
    parent: (&Point2D, &Point2D),
    child: (&Point2D, &Point2D),
    margin: f64,
) -> Option<f64> {
    let (w1, w2) = parent;
    let (c1, c2) = child;

    let (pd1, pd2) = if (w2.x - w1.x).abs() > 0.0 {
        let gradient = (w2.y - w1.y) / (w2.x - w1.x);
        let intercept = w1.y - gradient * w1.x;
        (
            perpendicular_distance(gradient, intercept, c1),
            perpendicular_distance(gradient, intercept, c2),
        )
    } else {
        ((c1.x - w1.x).abs(), (c2.x - w2.x).abs())
    };

    if pd1 > margin || pd2 > margin {
        return None;
    }

    let d11 = euclidean_distance(w1, c1);
    let d12 = euclidean_distance(w1, c2);
    let d21 = euclidean_distance(w2, c1);
    let d22 = euclidean_distance(w2, c2);

    if (d11 < d12 && d22 < d21) || (d12 < d11 && d21 < d22) {
        Some(pd1.min(pd2))
    } else {
        None
    }
}
