// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! scene.json, arch.json and objectaabb.json documents.
//!
//! The floor plan lies in the XZ plane: an image point `(x, y)` becomes
//! `[x * scale, 0, y * scale]`.

use r2v_floorplan::{HoleKind, House, Point2D, RoomDescription, RoomKey, WallKey};
use rustc_hash::FxHashMap;
use serde::Serialize;
use serde_json::Value;

use crate::config::ArchDefaults;
use crate::error::{ImporterError, Result};

// ============================================================================
// Document types
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct SceneFile {
    pub format: &'static str,
    pub scene: Scene,
    pub selected: Vec<Value>,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl From<[f64; 3]> for Vec3 {
    fn from([x, y, z]: [f64; 3]) -> Self {
        Self { x, y, z }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    pub up: Vec3,
    pub front: Vec3,
    pub unit: f64,
    pub asset_source: Value,
    pub arch: SceneArch,
    pub object: Vec<Value>,
    pub asset_transforms: Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct SceneArch {
    pub id: String,
    pub elements: Vec<Element>,
    pub defaults: ElementDefaults,
    pub rooms: Vec<RoomEntry>,
    /// `[source room id, hole id, target room id or null]`
    pub rdr: Vec<(String, String, Option<String>)>,
}

/// Standalone architecture of one room
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchFile {
    pub version: String,
    pub id: String,
    pub up: [f64; 3],
    pub front: [f64; 3],
    pub scale_to_meters: f64,
    pub defaults: ElementDefaults,
    pub elements: Vec<Element>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ElementDefaults {
    #[serde(rename = "Wall")]
    pub wall: WallDefaults,
    #[serde(rename = "Ceiling")]
    pub ceiling: DepthDefaults,
    #[serde(rename = "Floor")]
    pub floor: DepthDefaults,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WallDefaults {
    pub depth: f64,
    pub extra_height: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DepthDefaults {
    pub depth: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoomEntry {
    pub id: String,
    pub types: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum Element {
    Ceiling(SurfaceElement),
    Floor(SurfaceElement),
    Wall(WallElement),
}

impl Element {
    pub fn id(&self) -> &str {
        match self {
            Element::Ceiling(s) | Element::Floor(s) => &s.id,
            Element::Wall(w) => &w.id,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SurfaceElement {
    pub id: String,
    pub room_id: String,
    pub points: Vec<Vec<[f64; 3]>>,
    pub materials: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<[f64; 3]>,
    pub depth: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WallElement {
    pub room_id: Vec<String>,
    pub id: String,
    pub points: [[f64; 3]; 2],
    pub holes: Vec<HoleElement>,
    pub height: f64,
    pub materials: Value,
    pub depth: f64,
    #[serde(rename = "extra_height")]
    pub extra_height: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct HoleElement {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: Option<&'static str>,
    #[serde(rename = "box")]
    pub bounds: HoleBox,
}

/// Cut-out on the wall: x runs from `points[0]` toward `points[1]`, y is
/// the height above the wall bottom.
#[derive(Debug, Clone, Serialize)]
pub struct HoleBox {
    pub min: [f64; 2],
    pub max: [f64; 2],
}

#[derive(Debug, Clone, Serialize)]
pub struct ObjectAabbFile {
    pub objects: Vec<ObjectEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ObjectEntry {
    #[serde(rename = "type")]
    pub object_type: String,
    pub bound_box: BoundBox,
}

#[derive(Debug, Clone, Serialize)]
pub struct BoundBox {
    pub p1: [f64; 2],
    pub p2: [f64; 2],
}

// ============================================================================
// Builder
// ============================================================================

/// Builds output documents for a reconstructed house.
pub struct SceneBuilder<'a> {
    house: &'a House,
    defaults: &'a ArchDefaults,
    scene_id: String,
    scale: f64,
    adjust_short_walls: bool,
    wall_ids: FxHashMap<WallKey, String>,
}

impl<'a> SceneBuilder<'a> {
    pub fn new(
        house: &'a House,
        defaults: &'a ArchDefaults,
        scene_id: impl Into<String>,
        scale: f64,
        adjust_short_walls: bool,
    ) -> Result<Self> {
        let mut builder = Self {
            house,
            defaults,
            scene_id: scene_id.into(),
            scale,
            adjust_short_walls,
            wall_ids: FxHashMap::default(),
        };
        builder.wall_ids = builder.assign_wall_ids()?;
        Ok(builder)
    }

    fn rooms(&self) -> Vec<&'a RoomDescription> {
        self.house.rooms.iter().collect()
    }

    fn room_id(index: usize, room: &RoomDescription) -> Result<&str> {
        room.room_id.as_deref().ok_or(ImporterError::MissingRoomId(index))
    }

    fn is_short_walled(&self, room: &RoomDescription) -> bool {
        self.adjust_short_walls
            && room
                .room_types
                .iter()
                .any(|t| self.defaults.short_wall_room_types.contains(&t.annotation_type))
    }

    /// Room indices in emission order. With short-wall adjustment on,
    /// short-walled rooms go last so shared walls take the full height.
    pub fn room_order(&self) -> Vec<usize> {
        let rooms = self.rooms();
        let (mut regular, short): (Vec<usize>, Vec<usize>) =
            (0..rooms.len()).partition(|&i| !self.is_short_walled(rooms[i]));
        regular.extend(short);
        regular
    }

    /// `<room id>_wall<n>` for the first room, in emission order, that
    /// contains the wall.
    fn assign_wall_ids(&self) -> Result<FxHashMap<WallKey, String>> {
        let rooms = self.rooms();
        let mut ids = FxHashMap::default();
        for index in self.room_order() {
            let room = rooms[index];
            let room_id = Self::room_id(index, room)?;
            for (n, &wall) in room.walls.iter().enumerate() {
                ids.entry(wall).or_insert_with(|| format!("{room_id}_wall{n}"));
            }
        }
        Ok(ids)
    }

    fn point(&self, p: &Point2D) -> [f64; 3] {
        [p.x * self.scale, 0.0, p.y * self.scale]
    }

    fn element_defaults(&self) -> ElementDefaults {
        ElementDefaults {
            wall: WallDefaults {
                depth: self.defaults.wall_depth,
                extra_height: self.defaults.wall_extra_height,
            },
            ceiling: DepthDefaults {
                depth: self.defaults.ceiling_depth,
            },
            floor: DepthDefaults {
                depth: self.defaults.floor_depth,
            },
        }
    }

    fn wall_element(&self, room_id: &str, wall: WallKey, swapped: bool, short: bool) -> Result<WallElement> {
        let graph = &self.house.graph;
        let (mut p1, mut p2) = graph.wall_endpoints(wall)?;
        let length = graph.wall_length(wall)?;
        let scaled_length = length * self.scale.abs();
        if swapped {
            std::mem::swap(&mut p1, &mut p2);
        }

        let holes = graph
            .wall(wall)?
            .holes
            .iter()
            .map(|hole| {
                // Swapped walls are measured from the other end
                let min_x = if swapped { length - hole.max_x } else { hole.min_x };
                let max_x = min_x + hole.width();
                let (kind, min_y, max_y) = match hole.kind {
                    HoleKind::Door => (Some("Door"), self.defaults.door_min_y, self.defaults.door_max_y),
                    HoleKind::Window => (Some("Window"), self.defaults.window_min_y, self.defaults.window_max_y),
                    HoleKind::Unresolved => (None, self.defaults.door_min_y, self.defaults.door_max_y),
                };
                HoleElement {
                    id: hole.id.clone(),
                    kind,
                    bounds: HoleBox {
                        min: [min_x / length * scaled_length, min_y],
                        max: [max_x / length * scaled_length, max_y],
                    },
                }
            })
            .collect();

        Ok(WallElement {
            room_id: vec![room_id.to_string()],
            id: self.wall_ids.get(&wall).cloned().unwrap_or_else(|| format!("{room_id}_wall")),
            points: [self.point(&p1), self.point(&p2)],
            holes,
            height: if short {
                self.defaults.short_wall_height
            } else {
                self.defaults.wall_height
            },
            materials: self.defaults.wall_materials.clone(),
            depth: self.defaults.wall_depth,
            extra_height: self.defaults.wall_extra_height,
        })
    }

    /// Ceiling, floor and the walls of one room not listed in `emitted`.
    /// Walls already in `emitted` get this room's id appended instead.
    fn room_elements(
        &self,
        index: usize,
        elements: &mut Vec<Element>,
        emitted: &mut FxHashMap<WallKey, usize>,
    ) -> Result<()> {
        let graph = &self.house.graph;
        let room = self.rooms()[index];
        let room_id = Self::room_id(index, room)?;
        let outline: Vec<[f64; 3]> = room.polyline(graph)?.iter().map(|p| self.point(p)).collect();

        elements.push(Element::Ceiling(SurfaceElement {
            id: format!("{room_id}_c"),
            room_id: room_id.to_string(),
            points: vec![outline.clone()],
            materials: self.defaults.ceiling_materials.clone(),
            offset: Some([0.0, self.defaults.wall_height, 0.0]),
            depth: self.defaults.ceiling_depth,
        }));
        elements.push(Element::Floor(SurfaceElement {
            id: format!("{room_id}_f"),
            room_id: room_id.to_string(),
            points: vec![outline],
            materials: self.defaults.floor_materials.clone(),
            offset: None,
            depth: self.defaults.floor_depth,
        }));

        let short = self.is_short_walled(room);
        let orientations = room.wall_orientations(graph)?;
        for (&wall, &swapped) in room.walls.iter().zip(&orientations) {
            match emitted.get(&wall) {
                Some(&at) => {
                    if let Some(Element::Wall(existing)) = elements.get_mut(at) {
                        if !existing.room_id.iter().any(|r| r == room_id) {
                            existing.room_id.push(room_id.to_string());
                        }
                    }
                }
                None => {
                    emitted.insert(wall, elements.len());
                    elements.push(Element::Wall(self.wall_element(room_id, wall, swapped, short)?));
                }
            }
        }
        Ok(())
    }

    pub fn arch(&self) -> Result<SceneArch> {
        let rooms = self.rooms();
        let mut elements = Vec::new();
        let mut emitted = FxHashMap::default();
        let mut entries = Vec::with_capacity(rooms.len());

        for index in self.room_order() {
            self.room_elements(index, &mut elements, &mut emitted)?;
            let room = rooms[index];
            entries.push(RoomEntry {
                id: Self::room_id(index, room)?.to_string(),
                types: room.room_types.iter().map(|t| t.annotation_type.clone()).collect(),
            });
        }

        let room_id_of = |key: &RoomKey| {
            self.house
                .rooms
                .position(key)
                .and_then(|i| rooms[i].room_id.clone())
        };
        let mut rdr = Vec::with_capacity(self.house.rdr.len());
        for edge in &self.house.rdr {
            let source = room_id_of(&edge.source)
                .ok_or_else(|| ImporterError::MissingRoomId(self.house.rooms.position(&edge.source).unwrap_or(0)))?;
            let target = edge.target.as_ref().and_then(room_id_of);
            rdr.push((source, edge.hole_id.clone(), target));
        }

        Ok(SceneArch {
            id: self.scene_id.clone(),
            elements,
            defaults: self.element_defaults(),
            rooms: entries,
            rdr,
        })
    }

    pub fn scene(&self) -> Result<SceneFile> {
        Ok(SceneFile {
            format: "sceneState",
            scene: Scene {
                up: self.defaults.up.into(),
                front: self.defaults.front.into(),
                unit: self.defaults.scale_to_meters,
                asset_source: self.defaults.asset_source.clone(),
                arch: self.arch()?,
                object: Vec::new(),
                asset_transforms: self.defaults.asset_transforms.clone(),
            },
            selected: Vec::new(),
        })
    }

    /// Architecture of room `index` alone, with all of its walls.
    pub fn room_arch(&self, index: usize) -> Result<ArchFile> {
        let mut elements = Vec::new();
        self.room_elements(index, &mut elements, &mut FxHashMap::default())?;
        Ok(ArchFile {
            version: self.defaults.version.clone(),
            id: format!("{}_room_{}", self.scene_id, index),
            up: self.defaults.up,
            front: self.defaults.front,
            scale_to_meters: self.defaults.scale_to_meters,
            defaults: self.element_defaults(),
            elements,
        })
    }

    pub fn object_aabb(&self) -> ObjectAabbFile {
        ObjectAabbFile {
            objects: self
                .house
                .object_annotations
                .iter()
                .map(|a| ObjectEntry {
                    object_type: a.annotation_type.clone(),
                    bound_box: BoundBox {
                        p1: [a.p1.x * self.scale, a.p1.y * self.scale],
                        p2: [a.p2.x * self.scale, a.p2.y * self.scale],
                    },
                })
                .collect(),
        }
    }
}
