// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Key types for the wall graph arena.
//!
//! Corners and walls live in `slotmap::SlotMap`s owned by
//! [`WallLinkageGraph`](crate::wall_graph::WallLinkageGraph). Rooms, holes
//! and RDR edges refer back to them through these keys, so the
//! corner → wall → corner cycles never turn into ownership cycles.

use slotmap::new_key_type;

new_key_type! {
    /// Key for a corner (a merged wall endpoint).
    pub struct CornerKey;

    /// Key for a wall (an undirected edge between two corners).
    pub struct WallKey;
}

/// Position-derived key of the graph's corner index.
///
/// Built from the exact bit patterns of the coordinates, so it must be
/// recomputed whenever a corner moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PositionKey {
    x: u64,
    y: u64,
}

impl PositionKey {
    pub fn new(x: f64, y: f64) -> Self {
        // -0.0 and 0.0 are the same position
        let norm = |v: f64| if v == 0.0 { 0.0f64.to_bits() } else { v.to_bits() };
        Self {
            x: norm(x),
            y: norm(y),
        }
    }
}

impl std::fmt::Display for PositionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}_{}", f64::from_bits(self.x), f64::from_bits(self.y))
    }
}
