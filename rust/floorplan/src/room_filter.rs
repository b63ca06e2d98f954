// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! False room elimination.
//!
//! Face tracing also returns the outer perimeter of the plan as a room. That
//! face overlaps every real room and its area is their sum, while a real room
//! overlaps only the perimeter face, which is larger than itself. A room is
//! therefore dropped when the rooms overlapping it add up to its own area.

use crate::error::Result;
use crate::polygon::Polygon;
use crate::room::{RoomKey, RoomSet};
use crate::wall_graph::WallLinkageGraph;

/// Remove rooms covered by the other rooms within `threshold` (relative to
/// their own area). Returns the removed keys in room order.
pub fn eliminate_false_rooms(
    graph: &WallLinkageGraph,
    rooms: &mut RoomSet,
    threshold: f64,
    source: &str,
) -> Result<Vec<RoomKey>> {
    let mut polygons: Vec<(RoomKey, Polygon)> = Vec::with_capacity(rooms.len());
    for room in rooms.iter() {
        let polyline = room.polyline(graph)?;
        if polyline.len() < 3 {
            continue;
        }
        match Polygon::new(&polyline) {
            Some(polygon) => polygons.push((room.key().clone(), polygon)),
            None => tracing::error!(
                file = source,
                vertices = polyline.len(),
                "Room polygon construction failed"
            ),
        }
    }

    let mut removed = Vec::new();
    for (parent_key, parent) in &polygons {
        let parent_area = parent.area();

        // A child overlapping the parent in several separate pieces does
        // not count towards the cover
        let covered: f64 = polygons
            .iter()
            .filter(|(child_key, _)| child_key != parent_key)
            .filter(|(_, child)| parent.overlap_area(child).is_some())
            .map(|(_, child)| child.area())
            .sum();

        if (covered - parent_area).abs() < parent_area * threshold {
            tracing::info!(file = source, area = parent_area, covered, "Removed false room");
            removed.push(parent_key.clone());
        }
    }

    rooms.remove_all(&removed);
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::room_extractor::extract_rooms;
    use crate::types::Point2D;

    fn p(x: f64, y: f64) -> Point2D {
        Point2D::new(x, y)
    }

    #[test]
    fn test_outer_face_of_split_rectangle_removed() {
        let mut graph = WallLinkageGraph::new(0.5);
        let walls = [
            (p(0.0, 0.0), p(10.0, 0.0)),
            (p(10.0, 0.0), p(20.0, 0.0)),
            (p(20.0, 0.0), p(20.0, 10.0)),
            (p(20.0, 10.0), p(10.0, 10.0)),
            (p(10.0, 10.0), p(0.0, 10.0)),
            (p(0.0, 10.0), p(0.0, 0.0)),
            (p(10.0, 0.0), p(10.0, 10.0)),
        ];
        for (a, b) in walls {
            graph.add_wall(a, b, None, None).unwrap();
        }

        let mut rooms = extract_rooms(&graph).unwrap();
        assert_eq!(rooms.len(), 3);

        let removed = eliminate_false_rooms(&graph, &mut rooms, 0.05, "split").unwrap();
        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0].len(), 6);
        assert_eq!(rooms.len(), 2);
        for room in rooms.iter() {
            let polygon = room.polygon(&graph).unwrap().unwrap();
            assert!((polygon.area() - 100.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_single_room_kept() {
        let mut graph = WallLinkageGraph::new(0.5);
        let corners = [p(0.0, 0.0), p(10.0, 0.0), p(10.0, 10.0), p(0.0, 10.0)];
        for i in 0..4 {
            graph.add_wall(corners[i], corners[(i + 1) % 4], None, None).unwrap();
        }
        let mut rooms = extract_rooms(&graph).unwrap();
        let removed = eliminate_false_rooms(&graph, &mut rooms, 0.05, "square").unwrap();
        assert!(removed.is_empty());
        assert_eq!(rooms.len(), 1);
    }
}
