// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Arena-based wall linkage graph.
//!
//! [`WallLinkageGraph`] owns every corner and wall of one floor plan. Corners
//! merge raw wall endpoints that lie within `tolerance` of each other
//! (axis-wise metric), and each corner keeps the walls incident to it in
//! insertion order. Walls are kept in insertion order too; every stage that
//! scans "in graph order" uses that order.
//!
//! A position-keyed index maps exact corner positions to corner keys. It is
//! only valid while positions are stable, so [`WallLinkageGraph::move_corner`]
//! removes and reinserts the moved corner's entry.

use rustc_hash::FxHashMap;
use slotmap::SlotMap;

use crate::error::{Error, Result};
use crate::geometry::{euclidean_distance, hole_to_line, manhattan_distance};
use crate::keys::{CornerKey, PositionKey, WallKey};
use crate::types::{Hole, HoleKind, Point2D};

/// A merged wall endpoint.
#[derive(Debug, Clone)]
pub struct CornerData {
    pub position: Point2D,
    /// Incident walls, in the order they were attached.
    pub adjacent: Vec<WallKey>,
}

/// An undirected wall between two distinct corners.
#[derive(Debug, Clone)]
pub struct WallData {
    pub p1: CornerKey,
    pub p2: CornerKey,
    pub left_room_type: Option<String>,
    pub right_room_type: Option<String>,
    /// Openings measured along the wall from `p1`.
    pub holes: Vec<Hole>,
}

impl WallData {
    pub fn contains_corner(&self, corner: CornerKey) -> bool {
        self.p1 == corner || self.p2 == corner
    }
}

/// Planar graph of corners and walls with tolerance-based corner merging.
#[derive(Debug)]
pub struct WallLinkageGraph {
    corners: SlotMap<CornerKey, CornerData>,
    corner_order: Vec<CornerKey>,
    corner_index: FxHashMap<PositionKey, CornerKey>,

    walls: SlotMap<WallKey, WallData>,
    wall_order: Vec<WallKey>,

    tolerance: f64,
    next_hole_id: usize,
}

impl WallLinkageGraph {
    /// Creates an empty graph merging endpoints closer than `tolerance`.
    pub fn new(tolerance: f64) -> Self {
        Self {
            corners: SlotMap::with_key(),
            corner_order: Vec::new(),
            corner_index: FxHashMap::default(),
            walls: SlotMap::with_key(),
            wall_order: Vec::new(),
            tolerance,
            next_hole_id: 0,
        }
    }

    // --- Corner operations ---

    pub fn corner(&self, key: CornerKey) -> Result<&CornerData> {
        self.corners.get(key).ok_or(Error::CornerNotFound(key))
    }

    pub fn corner_position(&self, key: CornerKey) -> Result<Point2D> {
        self.corner(key).map(|c| c.position)
    }

    /// Corners in creation order.
    pub fn corners(&self) -> impl Iterator<Item = (CornerKey, &CornerData)> + '_ {
        self.corner_order
            .iter()
            .filter_map(move |&k| self.corners.get(k).map(|c| (k, c)))
    }

    pub fn corner_count(&self) -> usize {
        self.corners.len()
    }

    /// Looks up the corner at exactly `position` through the position index.
    pub fn find_corner(&self, position: &Point2D) -> Option<CornerKey> {
        self.corner_index
            .get(&PositionKey::new(position.x, position.y))
            .copied()
    }

    /// Closest and second-closest corners strictly within `cutoff` of
    /// `target`. Ties keep creation order.
    pub fn find_closest(
        &self,
        target: &Point2D,
        cutoff: f64,
    ) -> (Option<CornerKey>, Option<CornerKey>) {
        let mut candidates: Vec<(f64, CornerKey)> = self
            .corners()
            .map(|(k, c)| (manhattan_distance(&c.position, target), k))
            .filter(|(d, _)| *d < cutoff)
            .collect();

        // sort_by is stable
        candidates.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut iter = candidates.into_iter().map(|(_, k)| k);
        (iter.next(), iter.next())
    }

    /// Moves a corner and re-keys it in the position index.
    pub fn move_corner(&mut self, key: CornerKey, position: Point2D) -> Result<()> {
        let corner = self.corners.get_mut(key).ok_or(Error::CornerNotFound(key))?;
        let old_key = PositionKey::new(corner.position.x, corner.position.y);
        corner.position = position;

        if self.corner_index.get(&old_key) == Some(&key) {
            self.corner_index.remove(&old_key);
        }
        self.corner_index
            .insert(PositionKey::new(position.x, position.y), key);
        Ok(())
    }

    fn create_corner(&mut self, position: Point2D) -> CornerKey {
        let key = self.corners.insert(CornerData {
            position,
            adjacent: Vec::new(),
        });
        self.corner_order.push(key);
        self.corner_index
            .insert(PositionKey::new(position.x, position.y), key);
        key
    }

    // --- Wall operations ---

    /// Inserts a wall, merging its endpoints into existing corners.
    ///
    /// Returns `Ok(None)` without inserting anything when `p1 == p2`.
    pub fn add_wall(
        &mut self,
        p1: Point2D,
        p2: Point2D,
        left_room_type: Option<String>,
        right_room_type: Option<String>,
    ) -> Result<Option<WallKey>> {
        if p1 == p2 {
            tracing::warn!(x = p1.x, y = p1.y, "Not adding zero-length wall");
            return Ok(None);
        }

        let (mut n1, n1_backup) = self.find_closest(&p1, self.tolerance);
        if n1.is_none() {
            n1 = Some(self.create_corner(p1));
        }

        // The second lookup sees a corner freshly created for p1
        let (mut n2, n2_backup) = self.find_closest(&p2, self.tolerance);
        if n2.is_none() {
            n2 = Some(self.create_corner(p2));
        }

        if let (Some(a), Some(b)) = (n1, n2) {
            if a == b {
                // Both endpoints resolved to one corner: the nearer endpoint
                // keeps it, the other falls back to its second candidate
                let shared = self.corner_position(a)?;
                if manhattan_distance(&shared, &p1) < manhattan_distance(&shared, &p2) {
                    n2 = n2_backup;
                } else {
                    n1 = n1_backup;
                }
            }
        }

        let n1 = match n1 {
            Some(k) => k,
            None => self.create_corner(p1),
        };
        let n2 = match n2 {
            Some(k) => k,
            None => self.create_corner(p2),
        };

        let pos1 = self.corner_position(n1)?;
        let pos2 = self.corner_position(n2)?;
        if n1 == n2 || pos1 == pos2 {
            return Err(Error::CornerCollision {
                x1: p1.x,
                y1: p1.y,
                x2: p2.x,
                y2: p2.y,
                tolerance: self.tolerance,
            });
        }

        let wall = self.walls.insert(WallData {
            p1: n1,
            p2: n2,
            left_room_type,
            right_room_type,
            holes: Vec::new(),
        });
        self.wall_order.push(wall);

        for corner in [n1, n2] {
            if let Some(c) = self.corners.get_mut(corner) {
                c.adjacent.push(wall);
            }
        }

        Ok(Some(wall))
    }

    pub fn wall(&self, key: WallKey) -> Result<&WallData> {
        self.walls.get(key).ok_or(Error::WallNotFound(key))
    }

    pub fn wall_mut(&mut self, key: WallKey) -> Result<&mut WallData> {
        self.walls.get_mut(key).ok_or(Error::WallNotFound(key))
    }

    /// Wall keys in graph order.
    pub fn wall_keys(&self) -> &[WallKey] {
        &self.wall_order
    }

    /// Walls in graph order.
    pub fn walls(&self) -> impl Iterator<Item = (WallKey, &WallData)> + '_ {
        self.wall_order
            .iter()
            .filter_map(move |&k| self.walls.get(k).map(|w| (k, w)))
    }

    pub fn wall_count(&self) -> usize {
        self.walls.len()
    }

    /// The endpoint of `wall` that is not `corner`.
    pub fn other_corner(&self, wall: WallKey, corner: CornerKey) -> Result<CornerKey> {
        let w = self.wall(wall)?;
        Ok(if w.p1 == corner { w.p2 } else { w.p1 })
    }

    pub fn wall_endpoints(&self, wall: WallKey) -> Result<(Point2D, Point2D)> {
        let w = self.wall(wall)?;
        Ok((self.corner_position(w.p1)?, self.corner_position(w.p2)?))
    }

    /// Euclidean length of a wall.
    pub fn wall_length(&self, wall: WallKey) -> Result<f64> {
        let (a, b) = self.wall_endpoints(wall)?;
        Ok(euclidean_distance(&a, &b))
    }

    /// Adds an unresolved hole to `wall` and returns its id. The interval is
    /// ordered and clamped into `[0, wall_length]`.
    pub fn add_hole(&mut self, wall: WallKey, min_x: f64, max_x: f64) -> Result<String> {
        let length = self.wall_length(wall)?;
        let (lo, hi) = if min_x <= max_x { (min_x, max_x) } else { (max_x, min_x) };

        let id = format!("hole_{}", self.next_hole_id);
        self.next_hole_id += 1;

        self.wall_mut(wall)?.holes.push(Hole {
            id: id.clone(),
            min_x: lo.clamp(0.0, length),
            max_x: hi.clamp(0.0, length),
            kind: HoleKind::Unresolved,
        });
        Ok(id)
    }

    /// World-space segment of a hole.
    pub fn hole_segment(&self, wall: WallKey, hole: &Hole) -> Result<(Point2D, Point2D)> {
        let (a, b) = self.wall_endpoints(wall)?;
        Ok(hole_to_line(&a, &b, hole.min_x, hole.max_x))
    }

    /// Chains `walls` into a point sequence, starting with the first wall's
    /// `p1` and `p2`. A closed cycle repeats its first point at the end.
    /// Chaining stops at the first gap.
    pub fn polyline(&self, walls: &[WallKey]) -> Result<Vec<Point2D>> {
        let Some((&first, rest)) = walls.split_first() else {
            return Ok(Vec::new());
        };

        let w = self.wall(first)?;
        let mut points = vec![w.p1, w.p2];
        let mut unvisited: Vec<WallKey> = rest.to_vec();

        while !unvisited.is_empty() {
            let Some(&last) = points.last() else { break };

            let mut next = None;
            for (i, &key) in unvisited.iter().enumerate() {
                let candidate = self.wall(key)?;
                if candidate.p1 == last {
                    next = Some((i, candidate.p2));
                    break;
                } else if candidate.p2 == last {
                    next = Some((i, candidate.p1));
                    break;
                }
            }

            match next {
                Some((i, corner)) => {
                    unvisited.remove(i);
                    points.push(corner);
                }
                None => break,
            }
        }

        points
            .into_iter()
            .map(|c| self.corner_position(c))
            .collect()
    }
}
