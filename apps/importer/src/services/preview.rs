// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! PNG previews of the raw records and of each reconstructed room.

use std::path::Path;

use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_line_segment_mut, draw_polygon_mut};
use imageproc::point::Point;
use imageproc::rect::Rect;
use r2v_floorplan::{AabbAnnotation, HoleKind, House, Point2D, RecordCategory};

use crate::error::{ImporterError, Result};

const RAW_MARGIN: f64 = 20.0;
const ROOM_MARGIN: f64 = 20.0;

const RAW_WALL: Rgb<u8> = Rgb([255, 255, 255]);
const RAW_DOOR: Rgb<u8> = Rgb([255, 0, 0]);
const RAW_ENTRANCE: Rgb<u8> = Rgb([0, 0, 255]);
const RAW_STAIRS: Rgb<u8> = Rgb([0, 160, 0]);
const RAW_OBJECT: Rgb<u8> = Rgb([128, 128, 0]);

const SELECTED_ROOM: Rgb<u8> = Rgb([90, 90, 160]);
const CONNECTED_ROOM: Rgb<u8> = Rgb([60, 120, 60]);
const ROOM_WALL: Rgb<u8> = Rgb([255, 255, 255]);
const HOLE_UNRESOLVED: Rgb<u8> = Rgb([255, 255, 0]);
const HOLE_DOOR: Rgb<u8> = Rgb([255, 0, 0]);
const HOLE_WINDOW: Rgb<u8> = Rgb([0, 200, 255]);
const ROOM_ANNOTATION: Rgb<u8> = Rgb([200, 120, 0]);

const HOLE_WIDTH: i32 = 3;

/// Canvas covering the record bounds plus a margin on each side.
struct Canvas {
    image: RgbImage,
    offset_x: f64,
    offset_y: f64,
}

impl Canvas {
    fn new(house: &House, margin: f64) -> Self {
        let bounds = house.bounds;
        let width = (bounds.width() + 2.0 * margin).ceil().max(1.0) as u32;
        let height = (bounds.height() + 2.0 * margin).ceil().max(1.0) as u32;
        Self {
            image: RgbImage::new(width, height),
            offset_x: margin - bounds.x_min,
            offset_y: margin - bounds.y_min,
        }
    }

    fn to_pixel(&self, p: &Point2D) -> (f32, f32) {
        ((p.x + self.offset_x) as f32, (p.y + self.offset_y) as f32)
    }

    fn line(&mut self, a: &Point2D, b: &Point2D, color: Rgb<u8>) {
        let (start, end) = (self.to_pixel(a), self.to_pixel(b));
        draw_line_segment_mut(&mut self.image, start, end, color);
    }

    /// A line of roughly `width` pixels, drawn as parallel offsets along
    /// the segment normal.
    fn thick_line(&mut self, a: &Point2D, b: &Point2D, color: Rgb<u8>, width: i32) {
        let (dx, dy) = (b.x - a.x, b.y - a.y);
        let length = (dx * dx + dy * dy).sqrt();
        if length == 0.0 {
            return;
        }
        let (nx, ny) = (-dy / length, dx / length);
        for k in -(width / 2)..=(width / 2) {
            let shift = f64::from(k);
            let a = Point2D::new(a.x + nx * shift, a.y + ny * shift);
            let b = Point2D::new(b.x + nx * shift, b.y + ny * shift);
            self.line(&a, &b, color);
        }
    }

    fn rect(&mut self, p1: &Point2D, p2: &Point2D, color: Rgb<u8>) {
        let (x1, y1) = self.to_pixel(p1);
        let (x2, y2) = self.to_pixel(p2);
        let (x, y) = (x1.min(x2).round() as i32, y1.min(y2).round() as i32);
        let w = (x1 - x2).abs().round().max(1.0) as u32;
        let h = (y1 - y2).abs().round().max(1.0) as u32;
        draw_filled_rect_mut(&mut self.image, Rect::at(x, y).of_size(w, h), color);
    }

    /// Fills a closed outline. Outlines that collapse to fewer than three
    /// distinct pixels are skipped.
    fn polygon(&mut self, outline: &[Point2D], color: Rgb<u8>) {
        let mut points: Vec<Point<i32>> = Vec::with_capacity(outline.len());
        for p in outline {
            let (x, y) = self.to_pixel(p);
            let point = Point::new(x.round() as i32, y.round() as i32);
            if points.last() != Some(&point) {
                points.push(point);
            }
        }
        // The polygon must not repeat its first point
        while points.len() > 1 && points.first() == points.last() {
            points.pop();
        }
        if points.len() >= 3 {
            draw_polygon_mut(&mut self.image, &points, color);
        }
    }

    fn annotation(&mut self, annotation: &AabbAnnotation, color: Rgb<u8>) {
        self.rect(&annotation.p1, &annotation.p2, color);
    }

    fn save(&self, path: &Path) -> Result<()> {
        self.image.save(path)?;
        tracing::info!(path = %path.display(), "Saved preview");
        Ok(())
    }
}

/// Walls, door segments and annotation rectangles as loaded.
pub fn sketch_raw_annotations(house: &House, room_types: &[String], path: &Path) -> Result<()> {
    let mut canvas = Canvas::new(house, RAW_MARGIN);

    for wall in &house.walls {
        canvas.line(&wall.start(), &wall.end(), RAW_WALL);
    }

    for record in &house.records {
        let color = match &record.category {
            RecordCategory::Wall | RecordCategory::Door => continue,
            RecordCategory::Entrance => RAW_ENTRANCE,
            RecordCategory::Stairs => RAW_STAIRS,
            RecordCategory::Label(name) if room_types.contains(name) => continue,
            RecordCategory::Label(_) => RAW_OBJECT,
        };
        canvas.rect(&record.start(), &record.end(), color);
    }

    for door in house.records_of(&RecordCategory::Door) {
        canvas.line(&door.start(), &door.end(), RAW_DOOR);
    }

    canvas.save(path)
}

/// Room `index` filled, its RDR neighbours in a second colour, all walls
/// with their holes, and the room's annotations.
pub fn sketch_room(house: &House, index: usize, path: &Path) -> Result<()> {
    let graph = &house.graph;
    let room = house
        .rooms
        .iter()
        .nth(index)
        .ok_or(ImporterError::MissingRoomId(index))?;

    let mut canvas = Canvas::new(house, ROOM_MARGIN);
    canvas.polygon(&room.polyline(graph)?, SELECTED_ROOM);

    for edge in house.rdr.iter().filter(|e| &e.source == room.key()) {
        if let Some(neighbour) = edge.target.as_ref().and_then(|k| house.rooms.get(k)) {
            canvas.polygon(&neighbour.polyline(graph)?, CONNECTED_ROOM);
        }
    }

    for (key, wall) in graph.walls() {
        let (a, b) = graph.wall_endpoints(key)?;
        canvas.line(&a, &b, ROOM_WALL);
        for hole in &wall.holes {
            let (s, e) = graph.hole_segment(key, hole)?;
            let color = match hole.kind {
                HoleKind::Door => HOLE_DOOR,
                HoleKind::Window => HOLE_WINDOW,
                HoleKind::Unresolved => HOLE_UNRESOLVED,
            };
            canvas.thick_line(&s, &e, color, HOLE_WIDTH);
        }
    }

    for annotation in &room.annotations {
        canvas.annotation(annotation, ROOM_ANNOTATION);
    }

    canvas.save(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use r2v_floorplan::{ParserConfig, PipelineOptions, RawRecord};

    fn p(x: f64, y: f64) -> Point2D {
        Point2D::new(x, y)
    }

    fn square_house() -> House {
        let corners = [p(10.0, 10.0), p(60.0, 10.0), p(60.0, 40.0), p(10.0, 40.0)];
        let mut records: Vec<RawRecord> = (0..4)
            .map(|i| RawRecord::wall(corners[i], corners[(i + 1) % 4], None, None))
            .collect();
        records.push(RawRecord::new(20.0, 10.0, 30.0, 10.0, RecordCategory::Door));
        records.push(RawRecord::new(40.0, 20.0, 50.0, 30.0, RecordCategory::parse("sofa")));
        let mut house = House::from_records("square.txt", records);
        house
            .reconstruct(&ParserConfig::default(), &PipelineOptions::default(), &[])
            .unwrap();
        house
    }

    #[test]
    fn test_previews_written_with_bounds_size() {
        let house = square_house();
        let dir = tempfile::tempdir().unwrap();

        let raw = dir.path().join("raw_annot.png");
        sketch_raw_annotations(&house, &[], &raw).unwrap();
        let image = image::open(&raw).unwrap().to_rgb8();
        assert_eq!(image.dimensions(), (50 + 40, 30 + 40));
        // Bottom wall point (35, 40) shifted by the margin
        assert_eq!(image.get_pixel(45, 50), &RAW_WALL);

        let room = dir.path().join("room_0.png");
        sketch_room(&house, 0, &room).unwrap();
        let image = image::open(&room).unwrap().to_rgb8();
        assert_eq!(image.get_pixel(35, 45), &SELECTED_ROOM);
    }

    #[test]
    fn test_unknown_room_index() {
        let house = square_house();
        let dir = tempfile::tempdir().unwrap();
        assert!(sketch_room(&house, 5, &dir.path().join("room_5.png")).is_err());
    }
}
