// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Core types shared by the reconstruction stages

use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};

/// Room-type label marking the exterior side of a wall.
pub const OUTSIDE_ROOM_TYPE: &str = "outside";

/// Annotation type marking a building entrance.
pub const ENTRANCE_TYPE: &str = "entrance";

/// A 2D point in raster pixel space
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn to_nalgebra(&self) -> Point2<f64> {
        Point2::new(self.x, self.y)
    }

    /// Vector from `self` to `other`.
    pub fn vector_to(&self, other: &Point2D) -> Vector2<f64> {
        other.to_nalgebra() - self.to_nalgebra()
    }

    pub fn scaled(&self, factor: f64) -> Self {
        Self::new(self.x * factor, self.y * factor)
    }
}

impl std::fmt::Display for Point2D {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Category of a raw R2V record
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordCategory {
    Wall,
    Door,
    Entrance,
    Stairs,
    /// Room-type label or object category
    Label(String),
}

impl RecordCategory {
    pub fn parse(s: &str) -> Self {
        match s {
            "wall" => RecordCategory::Wall,
            "door" => RecordCategory::Door,
            "entrance" => RecordCategory::Entrance,
            "stairs" => RecordCategory::Stairs,
            other => RecordCategory::Label(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            RecordCategory::Wall => "wall",
            RecordCategory::Door => "door",
            RecordCategory::Entrance => "entrance",
            RecordCategory::Stairs => "stairs",
            RecordCategory::Label(s) => s,
        }
    }
}

/// A geometric record produced by the R2V extractor.
///
/// `x_min`/`y_min` and `x_max`/`y_max` are the two endpoints of a segment
/// (walls, doors) or the corners of a box (labels); they are not sorted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub x_min: f64,
    pub y_min: f64,
    pub x_max: f64,
    pub y_max: f64,
    pub category: RecordCategory,
    pub left_room_type: Option<String>,
    pub right_room_type: Option<String>,
}

impl RawRecord {
    pub fn new(x_min: f64, y_min: f64, x_max: f64, y_max: f64, category: RecordCategory) -> Self {
        Self {
            x_min,
            y_min,
            x_max,
            y_max,
            category,
            left_room_type: None,
            right_room_type: None,
        }
    }

    /// A wall record with room types on both sides.
    pub fn wall(
        start: Point2D,
        end: Point2D,
        left_room_type: Option<String>,
        right_room_type: Option<String>,
    ) -> Self {
        Self {
            x_min: start.x,
            y_min: start.y,
            x_max: end.x,
            y_max: end.y,
            category: RecordCategory::Wall,
            left_room_type,
            right_room_type,
        }
    }

    pub fn start(&self) -> Point2D {
        Point2D::new(self.x_min, self.y_min)
    }

    pub fn end(&self) -> Point2D {
        Point2D::new(self.x_max, self.y_max)
    }

    /// Axis-aligned wall: endpoints share an x or a y coordinate.
    pub fn is_manhattan(&self) -> bool {
        self.x_min == self.x_max || self.y_min == self.y_max
    }

    pub fn to_annotation(&self) -> AabbAnnotation {
        AabbAnnotation::new(self.category.as_str(), self.start(), self.end())
    }
}

/// Axis-aligned box annotation (room label, object, entrance or stairs marker)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AabbAnnotation {
    pub annotation_type: String,
    pub p1: Point2D,
    pub p2: Point2D,
}

impl AabbAnnotation {
    pub fn new(annotation_type: impl Into<String>, p1: Point2D, p2: Point2D) -> Self {
        Self {
            annotation_type: annotation_type.into(),
            p1,
            p2,
        }
    }

    /// Annotation carrying only a type (room types read from wall labels).
    pub fn type_only(annotation_type: impl Into<String>) -> Self {
        Self::new(annotation_type, Point2D::new(0.0, 0.0), Point2D::new(0.0, 0.0))
    }

    /// Corners in ring order.
    pub fn corners(&self) -> [Point2D; 4] {
        [
            Point2D::new(self.p1.x, self.p1.y),
            Point2D::new(self.p2.x, self.p1.y),
            Point2D::new(self.p2.x, self.p2.y),
            Point2D::new(self.p1.x, self.p2.y),
        ]
    }

    pub fn area(&self) -> f64 {
        ((self.p2.x - self.p1.x) * (self.p2.y - self.p1.y)).abs()
    }
}

/// Classification of a wall opening
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum HoleKind {
    #[default]
    Unresolved,
    Door,
    Window,
}

/// An opening on a wall, measured along the wall from its first endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Hole {
    pub id: String,
    pub min_x: f64,
    pub max_x: f64,
    pub kind: HoleKind,
}

impl Hole {
    /// Extent along the wall.
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }
}
