// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Reconstruction parameters.
//!
//! Mirrors `parser_config.json`. Every field has a default, so a partial
//! file only overrides what it names.

use serde::{Deserialize, Serialize};

/// Wall splitting stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitWallsConfig {
    pub enabled: bool,
    pub max_iter: usize,
}

impl Default for SplitWallsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_iter: 1000,
        }
    }
}

/// Wall straightening stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StraightenWallsConfig {
    pub enabled: bool,
    /// Walls whose normalized offset along the minor axis is below this
    /// are snapped.
    pub cutoff_gradient: f64,
    pub max_iter: usize,
}

impl Default for StraightenWallsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            cutoff_gradient: 0.1,
            max_iter: 1000,
        }
    }
}

/// False room elimination stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EliminateFalseRoomsConfig {
    pub enabled: bool,
    /// Relative area difference under which a room counts as covered.
    pub threshold: f64,
}

impl Default for EliminateFalseRoomsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            threshold: 0.05,
        }
    }
}

/// Parameters of the reconstruction pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Corner merge tolerance and junction gap (pixels).
    pub wall_join_margin: f64,
    pub split_walls: SplitWallsConfig,
    pub straighten_walls: StraightenWallsConfig,
    pub eliminate_false_rooms: EliminateFalseRoomsConfig,
    /// Maximum distance of an opening from its host wall's line (pixels).
    pub max_door_perpendicular_offset: f64,
    /// Fraction of an annotation allowed outside a room it is assigned to.
    pub room_label_assignment_overlap: f64,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            wall_join_margin: 5.0,
            split_walls: SplitWallsConfig::default(),
            straighten_walls: StraightenWallsConfig::default(),
            eliminate_false_rooms: EliminateFalseRoomsConfig::default(),
            max_door_perpendicular_offset: 5.0,
            room_label_assignment_overlap: 0.2,
        }
    }
}

impl ParserConfig {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}
