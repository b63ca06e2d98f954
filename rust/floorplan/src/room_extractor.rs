// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Room detection by planar face tracing.
//!
//! Walking along a wall and always leaving each corner by the wall with the
//! smallest counter-clockwise turn from the incoming direction traces one
//! face of the planar graph. Every wall is traced from both endpoints, which
//! yields both faces it borders, including the outer perimeter.

use crate::error::Result;
use crate::geometry::angle_between;
use crate::keys::{CornerKey, WallKey};
use crate::room::{RoomDescription, RoomSet};
use crate::wall_graph::WallLinkageGraph;

/// Step cap for a single face trace
pub const MAX_TRACE_STEPS: usize = 500;

/// The wall to leave `vertex` by after arriving along `in_wall`, or `None`
/// at a dead end.
fn next_wall(graph: &WallLinkageGraph, vertex: CornerKey, in_wall: WallKey) -> Result<Option<WallKey>> {
    let corner = graph.corner(vertex)?;
    if corner.adjacent.len() == 1 {
        return Ok(None);
    }

    let origin = corner.position;
    let incoming = graph.corner_position(graph.other_corner(in_wall, vertex)?)?;
    let v_in = (incoming.x - origin.x, incoming.y - origin.y);

    let mut best: Option<(f64, WallKey)> = None;
    for &candidate in &corner.adjacent {
        if candidate == in_wall {
            continue;
        }
        let outgoing = graph.corner_position(graph.other_corner(candidate, vertex)?)?;
        let v_out = (outgoing.x - origin.x, outgoing.y - origin.y);

        let mut angle = angle_between(v_in, v_out);
        if angle < 0.0 {
            angle += 360.0;
        }

        // Strict comparison keeps the first candidate on ties
        if best.map_or(true, |(a, _)| angle < a) {
            best = Some((angle, candidate));
        }
    }

    Ok(best.map(|(_, wall)| wall))
}

/// Walls of one face trace
#[derive(Debug, Clone, PartialEq)]
pub struct FaceTrace {
    pub walls: Vec<WallKey>,
    /// Whether the trace returned to its first wall within the step cap.
    pub closed: bool,
}

/// Trace the face on one side of `start_wall`, starting at `start_corner`.
///
/// The trace ends when it would re-enter `start_wall`. After
/// [`MAX_TRACE_STEPS`] the partial trace is returned with `closed` unset.
/// Dead ends are walked back along the same wall.
pub fn trace_face(
    graph: &WallLinkageGraph,
    start_corner: CornerKey,
    start_wall: WallKey,
) -> Result<FaceTrace> {
    let mut walls = vec![start_wall];
    let mut current = start_corner;

    for _ in 0..MAX_TRACE_STEPS {
        let last = walls[walls.len() - 1];
        let next = next_wall(graph, current, last)?;

        if next == Some(start_wall) {
            return Ok(FaceTrace { walls, closed: true });
        }

        let wall = next.unwrap_or(last);
        current = graph.other_corner(wall, current)?;
        walls.push(wall);
    }

    Ok(FaceTrace { walls, closed: false })
}

/// Walls of [`trace_face`], closed or not.
pub fn find_room(
    graph: &WallLinkageGraph,
    start_corner: CornerKey,
    start_wall: WallKey,
) -> Result<Vec<WallKey>> {
    trace_face(graph, start_corner, start_wall).map(|trace| trace.walls)
}

/// Trace every wall from `p1` and then `p2`, in graph order, keeping the
/// first trace of each distinct room. Traces that do not close are not
/// rooms.
pub fn extract_rooms(graph: &WallLinkageGraph) -> Result<RoomSet> {
    let mut rooms = RoomSet::new();
    let mut open_traces = 0usize;

    for (key, wall) in graph.walls() {
        for start in [wall.p1, wall.p2] {
            let trace = trace_face(graph, start, key)?;
            if !trace.closed {
                tracing::debug!(wall = ?key, steps = MAX_TRACE_STEPS, "Face trace did not close");
                open_traces += 1;
                continue;
            }
            rooms.insert(RoomDescription::new(trace.walls));
        }
    }

    if open_traces > 0 {
        tracing::warn!(traces = open_traces, "Skipped face traces that did not close");
    }
    tracing::debug!(walls = graph.wall_count(), rooms = rooms.len(), "Extracted rooms");
    Ok(rooms)
}
