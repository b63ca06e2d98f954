// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Opening resolution: door segments become holes on their host walls, and
//! every hole is then classified as a door or a window.

use crate::error::{Error, Result};
use crate::geometry::{closest_and_furthest, line_contains, manhattan_distance, rect_segment_distance};
use crate::keys::WallKey;
use crate::room::RoomSet;
use crate::types::{HoleKind, Point2D, ENTRANCE_TYPE};
use crate::wall_graph::WallLinkageGraph;

/// An opening accepted onto a wall
#[derive(Debug, Clone, PartialEq)]
pub struct AssignedOpening {
    /// Index into the opening list passed to [`assign_openings`].
    pub opening: usize,
    pub wall: WallKey,
    pub hole_id: String,
    pub offset: f64,
}

/// Outcome of opening assignment
#[derive(Debug, Clone, Default)]
pub struct AssignmentReport {
    pub assigned: Vec<AssignedOpening>,
    /// Indices of openings no wall accepted.
    pub unmatched: Vec<usize>,
}

/// Match opening segments to walls and record them as holes.
///
/// Every (opening, wall) pair accepted by [`line_contains`] is a candidate.
/// Candidates are taken in ascending offset order and each opening is
/// placed at most once.
pub fn assign_openings(
    graph: &mut WallLinkageGraph,
    openings: &[(Point2D, Point2D)],
    max_offset: f64,
    source: &str,
) -> Result<AssignmentReport> {
    let mut candidates: Vec<(f64, usize, WallKey)> = Vec::new();
    for (index, (o1, o2)) in openings.iter().enumerate() {
        for &wall in graph.wall_keys() {
            let (w1, w2) = graph.wall_endpoints(wall)?;
            if let Some(offset) = line_contains((&w1, &w2), (o1, o2), max_offset) {
                candidates.push((offset, index, wall));
            }
        }
    }

    // sort_by is stable, so equal offsets keep opening-then-wall order
    candidates.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut placed = vec![false; openings.len()];
    let mut report = AssignmentReport::default();

    for (offset, index, wall) in candidates {
        if placed[index] {
            continue;
        }

        let (w1, _) = graph.wall_endpoints(wall)?;
        let (o1, o2) = openings[index];
        let (closest, furthest) = closest_and_furthest(&w1, o1, o2);
        let hole_id = graph.add_hole(
            wall,
            manhattan_distance(&w1, &closest),
            manhattan_distance(&w1, &furthest),
        )?;

        placed[index] = true;
        report.assigned.push(AssignedOpening {
            opening: index,
            wall,
            hole_id,
            offset,
        });
    }

    for (index, (o1, o2)) in openings.iter().enumerate() {
        if !placed[index] {
            tracing::warn!(file = source, opening = %format!("{o1} - {o2}"), "Door not added");
            report.unmatched.push(index);
        }
    }

    tracing::debug!(
        file = source,
        assigned = report.assigned.len(),
        unmatched = report.unmatched.len(),
        "Assigned openings"
    );
    Ok(report)
}

/// Classify every hole as a door or a window.
///
/// 1. Holes on walls shared by two rooms are doors.
/// 2. For each `entrance` annotation of a room, the nearest unresolved hole
///    on that room's walls is a door.
/// 3. Everything left is a window.
pub fn classify_openings(graph: &mut WallLinkageGraph, rooms: &RoomSet) -> Result<()> {
    let walls: Vec<WallKey> = graph.wall_keys().to_vec();

    for &wall in &walls {
        let count = rooms.rooms_with_wall(wall).len();
        if count > 2 {
            return Err(Error::TooManyAdjacentRooms { wall, count });
        }
        if count == 2 {
            for hole in &mut graph.wall_mut(wall)?.holes {
                hole.kind = HoleKind::Door;
            }
        }
    }

    for room in rooms.iter() {
        for annotation in room.annotations.iter().filter(|a| a.annotation_type == ENTRANCE_TYPE) {
            let mut closest: Option<(f64, WallKey, usize)> = None;

            for &wall in &room.walls {
                let data = graph.wall(wall)?;
                for (i, hole) in data.holes.iter().enumerate() {
                    if hole.kind != HoleKind::Unresolved {
                        continue;
                    }
                    let (s, e) = graph.hole_segment(wall, hole)?;
                    let distance = rect_segment_distance(&annotation.p1, &annotation.p2, &s, &e);
                    if closest.map_or(true, |(d, _, _)| distance < d) {
                        closest = Some((distance, wall, i));
                    }
                }
            }

            // Duplicate entrance annotations may find nothing left
            if let Some((_, wall, i)) = closest {
                if let Some(hole) = graph.wall_mut(wall)?.holes.get_mut(i) {
                    hole.kind = HoleKind::Door;
                }
            }
        }
    }

    for &wall in &walls {
        for hole in &mut graph.wall_mut(wall)?.holes {
            if hole.kind == HoleKind::Unresolved {
                hole.kind = HoleKind::Window;
            }
        }
    }

    Ok(())
}
