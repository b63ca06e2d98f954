// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Floor plan reconstruction from raster-to-vector (R2V) records
//!
//! This crate turns the line segments and rectangles of an R2V file into a
//! structured floor plan:
//! 1. Walls are split at junctions and linked into a corner/wall graph
//! 2. Rooms are traced as faces of that graph
//! 3. Inclined walls are straightened and false rooms removed
//! 4. Door segments become holes on walls, classified as doors or windows
//! 5. Rooms receive ids, types and annotations, and room-door-room edges
//!    are derived
//!
//! # Usage
//!
//! ```rust,ignore
//! use r2v_floorplan::{reconstruct, ParserConfig, PipelineOptions};
//!
//! let house = reconstruct("plan.txt", &text, &ParserConfig::default(), &PipelineOptions::default(), &room_types)?;
//! for room in house.rooms.iter() {
//!     println!("{:?} {:?}", room.room_id, room.room_type_label());
//! }
//! ```

pub mod config;
pub mod error;
pub mod geometry;
pub mod house;
pub mod keys;
pub mod openings;
pub mod polygon;
pub mod r2v_format;
pub mod rdr;
pub mod room;
pub mod room_extractor;
pub mod room_filter;
pub mod splitter;
pub mod straightener;
pub mod types;
pub mod wall_graph;

// Re-export commonly used types and functions
pub use config::ParserConfig;
pub use error::{Error, Result};
pub use house::{Bounds, House, PipelineOptions, SourceKind};
pub use keys::{CornerKey, WallKey};
pub use polygon::Polygon;
pub use rdr::RdrEdge;
pub use room::{RoomDescription, RoomKey, RoomSet};
pub use types::{
    AabbAnnotation, Hole, HoleKind, Point2D, RawRecord, RecordCategory, ENTRANCE_TYPE,
    OUTSIDE_ROOM_TYPE,
};
pub use wall_graph::WallLinkageGraph;

/// High-level function to reconstruct a floor plan from R2V text
///
/// Parses `text` in the format named by `options.source_kind` and runs the
/// full pipeline. `source` names the input in log events.
pub fn reconstruct(
    source: &str,
    text: &str,
    config: &ParserConfig,
    options: &PipelineOptions,
    room_types: &[String],
) -> Result<House> {
    let mut house = match options.source_kind {
        SourceKind::R2vOutput => House::load_r2v_output(source, text, room_types)?,
        SourceKind::R2vAnnotation => House::load_r2v_annotation(source, text)?,
    };
    house.reconstruct(config, options, room_types)?;
    Ok(house)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reconstruct_single_room_output() {
        let room_types: Vec<String> = ["bedroom", "outside"].iter().map(|s| s.to_string()).collect();
        let text = "\
100\t100
4
0\t0\t10\t0\t0\t1
10\t0\t10\t10\t0\t1
10\t10\t0\t10\t0\t1
0\t10\t0\t0\t0\t1
";
        let house = reconstruct(
            "single.txt",
            text,
            &ParserConfig::default(),
            &PipelineOptions::default(),
            &room_types,
        )
        .unwrap();

        assert_eq!(house.graph.wall_count(), 4);
        assert_eq!(house.rooms.len(), 1);
        let room = house.rooms.iter().next().unwrap();
        assert!(room.room_id.as_deref().unwrap().starts_with("room_0_"));
    }
}
