// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Room-door-room connectivity.

use crate::error::{Error, Result};
use crate::keys::WallKey;
use crate::room::{RoomKey, RoomSet};
use crate::types::HoleKind;
use crate::wall_graph::WallLinkageGraph;

/// A door connecting `source` to `target`, or to the exterior when `target`
/// is `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RdrEdge {
    pub source: RoomKey,
    pub wall: WallKey,
    pub hole_id: String,
    pub target: Option<RoomKey>,
}

/// Derive RDR edges for every door hole, in graph order.
pub fn compute_rdr(graph: &WallLinkageGraph, rooms: &RoomSet) -> Result<Vec<RdrEdge>> {
    let mut edges = Vec::new();

    for (wall, data) in graph.walls() {
        for hole in data.holes.iter().filter(|h| h.kind == HoleKind::Door) {
            let adjacent = rooms.rooms_with_wall(wall);
            let edge = |source: &RoomKey, target: Option<&RoomKey>| RdrEdge {
                source: source.clone(),
                wall,
                hole_id: hole.id.clone(),
                target: target.cloned(),
            };

            match adjacent.as_slice() {
                [] => {}
                [room] => edges.push(edge(room, None)),
                [a, b] => {
                    edges.push(edge(a, Some(b)));
                    edges.push(edge(b, Some(a)));
                }
                _ => {
                    return Err(Error::TooManyAdjacentRooms {
                        wall,
                        count: adjacent.len(),
                    })
                }
            }
        }
    }

    tracing::debug!(edges = edges.len(), "Computed RDR edges");
    Ok(edges)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::room::RoomDescription;
    use crate::types::Point2D;

    fn p(x: f64, y: f64) -> Point2D {
        Point2D::new(x, y)
    }

    #[test]
    fn test_internal_door_is_symmetric() {
        let mut graph = WallLinkageGraph::new(0.5);
        let segs = [
            (p(0.0, 0.0), p(10.0, 0.0)),
            (p(10.0, 0.0), p(20.0, 0.0)),
            (p(20.0, 0.0), p(20.0, 10.0)),
            (p(20.0, 10.0), p(10.0, 10.0)),
            (p(10.0, 10.0), p(0.0, 10.0)),
            (p(0.0, 10.0), p(0.0, 0.0)),
            (p(10.0, 0.0), p(10.0, 10.0)),
        ];
        let w: Vec<WallKey> = segs
            .iter()
            .map(|(a, b)| graph.add_wall(*a, *b, None, None).unwrap().unwrap())
            .collect();

        let mut rooms = RoomSet::new();
        rooms.insert(RoomDescription::new(vec![w[0], w[6], w[4], w[5]]));
        rooms.insert(RoomDescription::new(vec![w[1], w[2], w[3], w[6]]));
        let keys: Vec<RoomKey> = rooms.keys().cloned().collect();

        let internal = graph.add_hole(w[6], 2.0, 6.0).unwrap();
        let external = graph.add_hole(w[2], 2.0, 6.0).unwrap();
        let window = graph.add_hole(w[0], 2.0, 6.0).unwrap();
        graph.wall_mut(w[6]).unwrap().holes[0].kind = HoleKind::Door;
        graph.wall_mut(w[2]).unwrap().holes[0].kind = HoleKind::Door;
        graph.wall_mut(w[0]).unwrap().holes[0].kind = HoleKind::Window;

        let edges = compute_rdr(&graph, &rooms).unwrap();
        assert_eq!(edges.len(), 3);

        let internal_edges: Vec<&RdrEdge> = edges.iter().filter(|e| e.hole_id == internal).collect();
        assert_eq!(internal_edges.len(), 2);
        assert_eq!(internal_edges[0].source, keys[0]);
        assert_eq!(internal_edges[0].target.as_ref(), Some(&keys[1]));
        assert_eq!(internal_edges[1].source, keys[1]);
        assert_eq!(internal_edges[1].target.as_ref(), Some(&keys[0]));

        let exterior: Vec<&RdrEdge> = edges.iter().filter(|e| e.hole_id == external).collect();
        assert_eq!(exterior.len(), 1);
        assert_eq!(exterior[0].source, keys[1]);
        assert!(exterior[0].target.is_none());

        assert!(edges.iter().all(|e| e.hole_id != window));
    }
}
