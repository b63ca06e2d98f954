// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-memory floor plan and the reconstruction pipeline.
//!
//! A [`House`] is built from the raw records of one file and then taken
//! through the stages in a fixed order:
//!
//! 1. split walls at junctions
//! 2. build the wall graph and trace rooms
//! 3. straighten inclined walls
//! 4. drop false rooms
//! 5. place openings on walls
//! 6. assign annotations to rooms and collect object annotations
//! 7. classify doors and windows
//! 8. attach room ids and types
//! 9. derive room-door-room edges

use crate::config::ParserConfig;
use crate::error::Result;
use crate::openings::{assign_openings, classify_openings, AssignmentReport};
use crate::r2v_format::{parse_r2v_annotation, parse_r2v_output};
use crate::rdr::{compute_rdr, RdrEdge};
use crate::room::{
    populate_from_r2v_annotation, populate_from_r2v_output, populate_object_annotations,
    populate_room_annotations, room_annotation_records, RoomSet,
};
use crate::room_extractor::extract_rooms;
use crate::room_filter::eliminate_false_rooms;
use crate::splitter::split_walls;
use crate::straightener::straighten_walls;
use crate::types::{AabbAnnotation, Point2D, RawRecord, RecordCategory};
use crate::wall_graph::WallLinkageGraph;

/// Which R2V format the records came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceKind {
    /// Extractor output: walls carry room-type labels on both sides.
    #[default]
    R2vOutput,
    /// Hand annotation: room types come from label rectangles.
    R2vAnnotation,
}

/// Optional pipeline stages
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub source_kind: SourceKind,
    pub collect_objects: bool,
    pub classify_openings: bool,
    pub compute_rdr: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            source_kind: SourceKind::R2vOutput,
            collect_objects: true,
            classify_openings: true,
            compute_rdr: true,
        }
    }
}

/// Bounding box of all records
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bounds {
    pub x_min: f64,
    pub y_min: f64,
    pub x_max: f64,
    pub y_max: f64,
}

impl Bounds {
    fn of(records: &[RawRecord]) -> Self {
        let mut xs = records.iter().flat_map(|r| [r.x_min, r.x_max]);
        let mut ys = records.iter().flat_map(|r| [r.y_min, r.y_max]);
        let Some(x0) = xs.next() else {
            return Self::default();
        };
        let y0 = ys.next().unwrap_or(0.0);

        let (x_min, x_max) = xs.fold((x0, x0), |(lo, hi), x| (lo.min(x), hi.max(x)));
        let (y_min, y_max) = ys.fold((y0, y0), |(lo, hi), y| (lo.min(y), hi.max(y)));
        Self {
            x_min,
            y_min,
            x_max,
            y_max,
        }
    }

    pub fn width(&self) -> f64 {
        self.x_max - self.x_min
    }

    pub fn height(&self) -> f64 {
        self.y_max - self.y_min
    }
}

/// A floor plan under reconstruction
#[derive(Debug)]
pub struct House {
    /// Path or name of the input, used in log events and errors.
    pub source: String,
    pub records: Vec<RawRecord>,
    /// Wall records, split at junctions before graph construction.
    pub walls: Vec<RawRecord>,
    pub bounds: Bounds,

    pub graph: WallLinkageGraph,
    pub rooms: RoomSet,
    pub object_annotations: Vec<AabbAnnotation>,
    pub rdr: Vec<RdrEdge>,
}

impl House {
    pub fn from_records(source: impl Into<String>, records: Vec<RawRecord>) -> Self {
        let walls = records
            .iter()
            .filter(|r| r.category == RecordCategory::Wall)
            .cloned()
            .collect();
        Self {
            source: source.into(),
            bounds: Bounds::of(&records),
            walls,
            records,
            graph: WallLinkageGraph::new(0.0),
            rooms: RoomSet::new(),
            object_annotations: Vec::new(),
            rdr: Vec::new(),
        }
    }

    pub fn load_r2v_output(source: impl Into<String>, text: &str, room_types: &[String]) -> Result<Self> {
        Ok(Self::from_records(source, parse_r2v_output(text, room_types)?))
    }

    pub fn load_r2v_annotation(source: impl Into<String>, text: &str) -> Result<Self> {
        Ok(Self::from_records(source, parse_r2v_annotation(text)?))
    }

    /// Door segments, the openings to place on walls.
    pub fn openings(&self) -> Vec<(Point2D, Point2D)> {
        self.records_of(&RecordCategory::Door)
            .map(|r| (r.start(), r.end()))
            .collect()
    }

    pub fn records_of<'a>(&'a self, category: &'a RecordCategory) -> impl Iterator<Item = &'a RawRecord> + 'a {
        self.records.iter().filter(move |r| &r.category == category)
    }

    // ─── Stages ───

    pub fn split_source_walls(&mut self, config: &ParserConfig) {
        let report = split_walls(
            &mut self.walls,
            config.wall_join_margin,
            config.split_walls.max_iter,
            &self.source,
        );
        tracing::debug!(file = %self.source, splits = report.splits, "Split source walls");
    }

    /// Builds the wall graph from the wall records and traces all rooms.
    pub fn generate_wall_graph(&mut self, config: &ParserConfig) -> Result<()> {
        let mut graph = WallLinkageGraph::new(config.wall_join_margin);
        for wall in &self.walls {
            graph.add_wall(
                wall.start(),
                wall.end(),
                wall.left_room_type.clone(),
                wall.right_room_type.clone(),
            )?;
        }
        self.rooms = extract_rooms(&graph)?;
        self.graph = graph;

        tracing::info!(
            file = %self.source,
            corners = self.graph.corner_count(),
            walls = self.graph.wall_count(),
            rooms = self.rooms.len(),
            "Generated wall graph"
        );
        Ok(())
    }

    pub fn straighten_walls(&mut self, config: &ParserConfig) -> Result<()> {
        let report = straighten_walls(
            &mut self.graph,
            config.straighten_walls.cutoff_gradient,
            config.straighten_walls.max_iter,
            &self.source,
        )?;
        tracing::debug!(file = %self.source, corrections = report.corrections, "Straightened walls");
        Ok(())
    }

    pub fn eliminate_false_rooms(&mut self, config: &ParserConfig) -> Result<()> {
        let removed = eliminate_false_rooms(
            &self.graph,
            &mut self.rooms,
            config.eliminate_false_rooms.threshold,
            &self.source,
        )?;
        tracing::info!(file = %self.source, removed = removed.len(), rooms = self.rooms.len(), "Eliminated false rooms");
        Ok(())
    }

    pub fn assign_openings(&mut self, config: &ParserConfig) -> Result<AssignmentReport> {
        let openings = self.openings();
        assign_openings(
            &mut self.graph,
            &openings,
            config.max_door_perpendicular_offset,
            &self.source,
        )
    }

    pub fn populate_room_annotations(&mut self, config: &ParserConfig) -> Result<()> {
        let annotations = room_annotation_records(&self.records);
        populate_room_annotations(
            &self.graph,
            &mut self.rooms,
            &annotations,
            config.room_label_assignment_overlap,
        )
    }

    pub fn populate_object_annotations(&mut self, room_types: &[String]) {
        self.object_annotations = populate_object_annotations(&self.records, room_types);
    }

    pub fn classify_doors_and_windows(&mut self) -> Result<()> {
        classify_openings(&mut self.graph, &self.rooms)
    }

    pub fn populate_room_descriptions(&mut self, kind: SourceKind, room_types: &[String]) -> Result<()> {
        match kind {
            SourceKind::R2vOutput => populate_from_r2v_output(&self.graph, &mut self.rooms, &self.source),
            SourceKind::R2vAnnotation => populate_from_r2v_annotation(&self.graph, &mut self.rooms, room_types),
        }
    }

    pub fn compute_rdr(&mut self) -> Result<()> {
        self.rdr = compute_rdr(&self.graph, &self.rooms)?;
        Ok(())
    }

    /// Runs every enabled stage in order.
    pub fn reconstruct(
        &mut self,
        config: &ParserConfig,
        options: &PipelineOptions,
        room_types: &[String],
    ) -> Result<()> {
        if config.split_walls.enabled {
            self.split_source_walls(config);
        }

        self.generate_wall_graph(config)?;

        if config.straighten_walls.enabled {
            self.straighten_walls(config)?;
        }

        if config.eliminate_false_rooms.enabled {
            self.eliminate_false_rooms(config)?;
        }

        self.assign_openings(config)?;
        self.populate_room_annotations(config)?;

        if options.collect_objects {
            self.populate_object_annotations(room_types);
        }

        if options.classify_openings {
            self.classify_doors_and_windows()?;
        }

        self.populate_room_descriptions(options.source_kind, room_types)?;

        if options.compute_rdr {
            self.compute_rdr()?;
        }

        tracing::info!(
            file = %self.source,
            rooms = self.rooms.len(),
            objects = self.object_annotations.len(),
            rdr = self.rdr.len(),
            "Reconstructed floor plan"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_cover_all_records() {
        let house = House::from_records(
            "b",
            vec![
                RawRecord::new(10.0, 5.0, 40.0, 5.0, RecordCategory::Wall),
                RawRecord::new(-3.0, 60.0, 2.0, 8.0, RecordCategory::parse("bedroom")),
            ],
        );
        assert_eq!(
            house.bounds,
            Bounds {
                x_min: -3.0,
                y_min: 5.0,
                x_max: 40.0,
                y_max: 60.0
            }
        );
        assert_eq!(house.walls.len(), 1);
    }

    #[test]
    fn test_empty_house() {
        let mut house = House::from_records("empty", Vec::new());
        house
            .reconstruct(&ParserConfig::default(), &PipelineOptions::default(), &[])
            .unwrap();
        assert!(house.rooms.is_empty());
        assert_eq!(house.bounds, Bounds::default());
    }
}
