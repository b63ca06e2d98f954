// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Cuts raw wall records at T- and cross-junctions.
//!
//! R2V output frequently contains a wall that ends on the middle of another
//! wall. Face tracing needs a corner there, so the crossed wall is replaced by
//! two collinear children meeting at the junction. Only axis-aligned walls
//! take part; diagonal walls pass through untouched.

use crate::geometry::manhattan_distance;
use crate::types::{Point2D, RawRecord, RecordCategory};

/// How one wall of a pair takes part in a junction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JunctionRole {
    /// The walls do not meet.
    Unconnected,
    /// The wall meets the other with its first (`0`) or second (`1`) endpoint.
    Endpoint(usize),
    /// The junction lies inside the wall.
    Interior,
}

/// Junction between two walls
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Connection {
    pub roles: [JunctionRole; 2],
    pub point: Point2D,
}

impl Connection {
    fn none() -> Self {
        Self {
            roles: [JunctionRole::Unconnected; 2],
            point: Point2D::new(0.0, 0.0),
        }
    }
}

/// Outcome of a splitting pass
#[derive(Debug, Clone, Default)]
pub struct SplitReport {
    pub splits: usize,
    pub iterations: usize,
    pub truncated: bool,
}

type Segment = (Point2D, Point2D);

/// Axis of a segment: `1` when it runs mostly along y.
fn direction(line: &Segment) -> usize {
    usize::from((line.0.x - line.1.x).abs() < (line.0.y - line.1.y).abs())
}

fn coord(p: &Point2D, axis: usize) -> f64 {
    if axis == 0 {
        p.x
    } else {
        p.y
    }
}

/// `(direction, fixed, min, max)`: the constant coordinate and the span
/// along the running axis.
fn line_range(line: &Segment) -> (usize, f64, f64, f64) {
    let d = direction(line);
    let fixed = ((coord(&line.0, 1 - d) + coord(&line.1, 1 - d)) / 2.0).floor();
    let a = coord(&line.0, d);
    let b = coord(&line.1, d);
    (d, fixed, a.min(b), a.max(b))
}

fn find_connection_ordered(line1: &Segment, line2: &Segment, gap: f64) -> Connection {
    let ends1 = [line1.0, line1.1];
    let ends2 = [line2.0, line2.1];

    for (c1, e1) in ends1.iter().enumerate() {
        for (c2, e2) in ends2.iter().enumerate() {
            if manhattan_distance(e1, e2) > gap {
                continue;
            }
            return Connection {
                roles: [JunctionRole::Endpoint(c1), JunctionRole::Endpoint(c2)],
                point: Point2D::new(((e1.x + e2.x) / 2.0).floor(), ((e1.y + e2.y) / 2.0).floor()),
            };
        }
    }

    let (direction1, fixed1, min1, max1) = line_range(line1);
    let (direction2, fixed2, min2, max2) = line_range(line2);
    if direction1 == direction2 {
        return Connection::none();
    }

    if fixed1.min(max2) < fixed1.max(min2) - gap || fixed2.min(max1) < fixed2.max(min1) - gap {
        return Connection::none();
    }

    use JunctionRole::{Endpoint, Interior};
    let roles = if (min1 - fixed2).abs() <= gap {
        [Endpoint(0), Interior]
    } else if (max1 - fixed2).abs() <= gap {
        [Endpoint(1), Interior]
    } else if (min2 - fixed1).abs() <= gap {
        [Interior, Endpoint(0)]
    } else if (max2 - fixed1).abs() <= gap {
        [Interior, Endpoint(1)]
    } else {
        [Interior, Interior]
    };

    Connection {
        roles,
        point: Point2D::new(fixed2, fixed1),
    }
}

/// Locate the junction between two axis-aligned walls.
///
/// Endpoint proximity wins over interior junctions. For interior junctions
/// the preference order is: near the start of `line1`, near its end, near
/// the start of `line2`, near its end, else a full cross.
pub fn find_connection(line1: &Segment, line2: &Segment, gap: f64) -> Connection {
    if line1.0.x == line1.1.x {
        let mut c = find_connection_ordered(line2, line1, gap);
        c.roles.swap(0, 1);
        c
    } else {
        find_connection_ordered(line1, line2, gap)
    }
}

fn segment(record: &RawRecord) -> Segment {
    (record.start(), record.end())
}

/// Finds the first `(index, junction)` split in scan order.
fn next_split(walls: &[RawRecord], gap: f64) -> Option<(usize, Point2D)> {
    for (i1, wall1) in walls.iter().enumerate() {
        if !wall1.is_manhattan() {
            continue;
        }
        for (i2, wall2) in walls.iter().enumerate() {
            if !wall2.is_manhattan() || wall1 == wall2 {
                continue;
            }

            let connection = find_connection(&segment(wall1), &segment(wall2), gap);
            let target = if connection.roles[0] == JunctionRole::Interior {
                Some(i1)
            } else if connection.roles[1] == JunctionRole::Interior {
                Some(i2)
            } else {
                None
            };

            if let Some(index) = target {
                let w = &walls[index];
                // A junction on the wall's own endpoint would produce a
                // zero-length child
                if connection.point == w.start() || connection.point == w.end() {
                    continue;
                }
                return Some((index, connection.point));
            }
        }
    }
    None
}

/// Split walls at junctions until none remain or `max_iter` splits were made.
///
/// Non-wall records in `walls` are ignored by the scan but kept in place.
pub fn split_walls(walls: &mut Vec<RawRecord>, gap: f64, max_iter: usize, source: &str) -> SplitReport {
    let mut report = SplitReport::default();

    loop {
        if report.iterations >= max_iter {
            report.truncated = next_split(walls, gap).is_some();
            break;
        }
        report.iterations += 1;

        let Some((index, junction)) = next_split(walls, gap) else {
            break;
        };

        let parent = walls.remove(index);
        tracing::debug!(
            file = source,
            x = junction.x,
            y = junction.y,
            "Split wall ({}, {}) - ({}, {})",
            parent.x_min,
            parent.y_min,
            parent.x_max,
            parent.y_max
        );

        let first = RawRecord {
            x_max: junction.x,
            y_max: junction.y,
            category: RecordCategory::Wall,
            ..parent.clone()
        };
        let second = RawRecord {
            x_min: junction.x,
            y_min: junction.y,
            category: RecordCategory::Wall,
            ..parent
        };
        walls.push(first);
        walls.push(second);
        report.splits += 1;
    }

    if report.truncated {
        tracing::warn!(file = source, max_iter, "Split walls iterations truncated");
    }

    report
}
