// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Room descriptions and their enrichment passes.
//!
//! A room is identified by the set of its boundary walls ([`RoomKey`]). The
//! traversal order of those walls is kept separately in
//! [`RoomDescription::walls`]. Keys are never rebuilt once a room exists;
//! later passes only attach ids, types and annotations.

use std::collections::BTreeSet;

use rustc_hash::FxHashMap;
use sha2::{Digest, Sha256};

use crate::error::{Error, Result};
use crate::keys::{PositionKey, WallKey};
use crate::polygon::Polygon;
use crate::types::{AabbAnnotation, Point2D, RawRecord, RecordCategory, OUTSIDE_ROOM_TYPE};
use crate::wall_graph::WallLinkageGraph;

/// Frozen set of a room's boundary walls.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RoomKey(BTreeSet<WallKey>);

impl RoomKey {
    pub fn from_walls(walls: &[WallKey]) -> Self {
        Self(walls.iter().copied().collect())
    }

    pub fn contains(&self, wall: WallKey) -> bool {
        self.0.contains(&wall)
    }

    pub fn walls(&self) -> impl Iterator<Item = WallKey> + '_ {
        self.0.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A detected room
#[derive(Debug, Clone)]
pub struct RoomDescription {
    key: RoomKey,
    /// Boundary walls in traversal order. May repeat a wall when the trace
    /// backtracked over a dead end.
    pub walls: Vec<WallKey>,
    pub room_id: Option<String>,
    pub room_types: Vec<AabbAnnotation>,
    /// Annotation rectangles lying inside the room.
    pub annotations: Vec<AabbAnnotation>,
}

impl RoomDescription {
    pub fn new(walls: Vec<WallKey>) -> Self {
        Self {
            key: RoomKey::from_walls(&walls),
            walls,
            room_id: None,
            room_types: Vec::new(),
            annotations: Vec::new(),
        }
    }

    pub fn key(&self) -> &RoomKey {
        &self.key
    }

    pub fn polyline(&self, graph: &WallLinkageGraph) -> Result<Vec<Point2D>> {
        graph.polyline(&self.walls)
    }

    /// The room outline as a polygon, or `None` when it has no area.
    pub fn polygon(&self, graph: &WallLinkageGraph) -> Result<Option<Polygon>> {
        Ok(Polygon::new(&self.polyline(graph)?))
    }

    /// Room types joined for display, e.g. `"kitchen and dining_room"`.
    pub fn room_type_label(&self) -> Option<String> {
        if self.room_types.is_empty() {
            return None;
        }
        let names: Vec<&str> = self
            .room_types
            .iter()
            .map(|t| t.annotation_type.as_str())
            .collect();
        Some(names.join(" and "))
    }

    /// Whether wall `i` of the cycle is traversed from `p2` to `p1`.
    pub fn wall_orientations(&self, graph: &WallLinkageGraph) -> Result<Vec<bool>> {
        wall_orientations(graph, &self.walls)
    }
}

/// For each wall of a cycle, `true` when its `p2` is not the corner it
/// shares with the next wall.
pub fn wall_orientations(graph: &WallLinkageGraph, walls: &[WallKey]) -> Result<Vec<bool>> {
    let n = walls.len();
    let mut swapped = Vec::with_capacity(n);

    for (i, &key) in walls.iter().enumerate() {
        let next_key = walls[(i + 1) % n];
        let wall = graph.wall(key)?;
        let next = graph.wall(next_key)?;

        let connection = if wall.contains_corner(next.p1) {
            next.p1
        } else if wall.contains_corner(next.p2) {
            next.p2
        } else {
            return Err(Error::DisconnectedCycle(key, next_key));
        };

        swapped.push(wall.p2 != connection);
    }

    Ok(swapped)
}

/// Insertion-ordered set of rooms, unique by [`RoomKey`].
#[derive(Debug, Clone, Default)]
pub struct RoomSet {
    rooms: Vec<RoomDescription>,
    index: FxHashMap<RoomKey, usize>,
}

impl RoomSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a room unless one with the same key exists. Returns whether it
    /// was added.
    pub fn insert(&mut self, room: RoomDescription) -> bool {
        if self.index.contains_key(room.key()) {
            return false;
        }
        self.index.insert(room.key().clone(), self.rooms.len());
        self.rooms.push(room);
        true
    }

    pub fn get(&self, key: &RoomKey) -> Option<&RoomDescription> {
        self.index.get(key).map(|&i| &self.rooms[i])
    }

    pub fn get_mut(&mut self, key: &RoomKey) -> Option<&mut RoomDescription> {
        match self.index.get(key) {
            Some(&i) => self.rooms.get_mut(i),
            None => None,
        }
    }

    /// Position of a room in insertion order.
    pub fn position(&self, key: &RoomKey) -> Option<usize> {
        self.index.get(key).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RoomDescription> {
        self.rooms.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut RoomDescription> {
        self.rooms.iter_mut()
    }

    pub fn keys(&self) -> impl Iterator<Item = &RoomKey> {
        self.rooms.iter().map(|r| r.key())
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    /// Removes the given rooms, keeping the order of the rest.
    pub fn remove_all(&mut self, keys: &[RoomKey]) {
        if keys.is_empty() {
            return;
        }
        self.rooms.retain(|r| !keys.contains(r.key()));
        self.index = self
            .rooms
            .iter()
            .enumerate()
            .map(|(i, r)| (r.key().clone(), i))
            .collect();
    }

    /// Keys of the rooms bounded by `wall`, in room order.
    pub fn rooms_with_wall(&self, wall: WallKey) -> Vec<&RoomKey> {
        self.keys().filter(|k| k.contains(wall)).collect()
    }
}

/// Deterministic room id: `room_<index>_<sha256 of the wall positions>`.
pub fn generate_room_id(graph: &WallLinkageGraph, index: usize, key: &RoomKey) -> Result<String> {
    let mut walls = Vec::with_capacity(key.len());
    for wall in key.walls() {
        let (a, b) = graph.wall_endpoints(wall)?;
        walls.push(format!(
            "{}:{}",
            PositionKey::new(a.x, a.y),
            PositionKey::new(b.x, b.y)
        ));
    }
    walls.sort();

    let mut hasher = Sha256::new();
    hasher.update(walls.join(";").as_bytes());
    Ok(format!("room_{}_{}", index, hex::encode(hasher.finalize())))
}

/// Assigns each annotation rectangle to every room that covers it: the
/// uncovered part must be less than `overlap` of the rectangle's area.
pub fn populate_room_annotations(
    graph: &WallLinkageGraph,
    rooms: &mut RoomSet,
    annotations: &[AabbAnnotation],
    overlap: f64,
) -> Result<()> {
    let rectangles: Vec<(&AabbAnnotation, Polygon)> = annotations
        .iter()
        .filter_map(|a| Polygon::rectangle(&a.p1, &a.p2).map(|p| (a, p)))
        .collect();

    for room in rooms.iter_mut() {
        let Some(room_polygon) = room.polygon(graph)? else {
            tracing::debug!(walls = room.walls.len(), "Room without area skipped for annotations");
            continue;
        };

        for (annotation, rect) in &rectangles {
            let rect_area = rect.area();
            let Some(shared) = room_polygon.overlap_area(rect) else {
                continue;
            };
            if (shared - rect_area).abs() < rect_area * overlap {
                room.annotations.push((*annotation).clone());
            }
        }
    }

    Ok(())
}

/// Records that annotate rooms: everything except walls and doors.
pub fn room_annotation_records(records: &[RawRecord]) -> Vec<AabbAnnotation> {
    records
        .iter()
        .filter(|r| !matches!(r.category, RecordCategory::Wall | RecordCategory::Door))
        .map(RawRecord::to_annotation)
        .collect()
}

/// Object annotations: records that are not walls, doors, entrances or
/// room-type labels.
pub fn populate_object_annotations(records: &[RawRecord], room_types: &[String]) -> Vec<AabbAnnotation> {
    records
        .iter()
        .filter(|r| {
            !matches!(
                r.category,
                RecordCategory::Wall | RecordCategory::Door | RecordCategory::Entrance
            )
        })
        .filter(|r| !room_types.iter().any(|t| t == r.category.as_str()))
        .map(RawRecord::to_annotation)
        .collect()
}

/// Ids and room types from the wall side labels of R2V output.
///
/// Each wall contributes the label on the room's side: `left_room_type`
/// when the cycle traverses it from `p2` to `p1`, `right_room_type`
/// otherwise.
pub fn populate_from_r2v_output(graph: &WallLinkageGraph, rooms: &mut RoomSet, source: &str) -> Result<()> {
    let mut updates = Vec::with_capacity(rooms.len());

    for (index, room) in rooms.iter().enumerate() {
        let orientations = room.wall_orientations(graph)?;

        let mut candidates: Vec<String> = Vec::new();
        for (&wall_key, &swapped) in room.walls.iter().zip(&orientations) {
            let wall = graph.wall(wall_key)?;
            let label = if swapped {
                &wall.left_room_type
            } else {
                &wall.right_room_type
            };
            if let Some(label) = label {
                if !candidates.contains(label) {
                    candidates.push(label.clone());
                }
            }
        }

        if candidates.first().map(String::as_str) == Some(OUTSIDE_ROOM_TYPE) {
            tracing::warn!(
                file = source,
                room = index,
                candidates = ?candidates,
                "Room type inconsistent: first candidate is the exterior"
            );
        }

        let id = generate_room_id(graph, index, room.key())?;
        updates.push((id, candidates));
    }

    for (room, (id, candidates)) in rooms.iter_mut().zip(updates) {
        room.room_id = Some(id);
        room.room_types = candidates.into_iter().map(AabbAnnotation::type_only).collect();
    }

    Ok(())
}

/// Ids and room types from assigned annotations whose type is a room type.
pub fn populate_from_r2v_annotation(
    graph: &WallLinkageGraph,
    rooms: &mut RoomSet,
    room_types: &[String],
) -> Result<()> {
    let mut ids = Vec::with_capacity(rooms.len());
    for (index, room) in rooms.iter().enumerate() {
        ids.push(generate_room_id(graph, index, room.key())?);
    }

    for (room, id) in rooms.iter_mut().zip(ids) {
        room.room_id = Some(id);
        let types: Vec<AabbAnnotation> = room
            .annotations
            .iter()
            .filter(|a| room_types.contains(&a.annotation_type))
            .cloned()
            .collect();
        room.room_types.extend(types);
    }

    Ok(())
}
