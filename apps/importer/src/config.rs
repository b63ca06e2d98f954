// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Importer configuration: environment, JSON config files and the room-type
//! vocabulary.

use std::fs;
use std::path::{Path, PathBuf};

use r2v_floorplan::ParserConfig;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{ImporterError, Result};

pub const DEFAULT_PARSER_CONFIG: &str = "./conf/r2v_importer/parser_config.json";
pub const DEFAULT_ARCH_DEFAULTS: &str = "./conf/r2v_importer/arch_defaults.json";
pub const DEFAULT_LABELS_PATH: &str = "./conf/r2v_importer/labels";
pub const ROOM_TYPES_FILE: &str = "room_types.json";

/// Process configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Number of worker threads for batch processing.
    pub worker_threads: usize,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            worker_threads: std::env::var("R2V_WORKER_THREADS")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|&n: &usize| n > 0)
                .unwrap_or_else(num_cpus::get),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Defaults for the generated architecture (`arch_defaults.json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchDefaults {
    pub version: String,
    pub up: [f64; 3],
    pub front: [f64; 3],
    pub scale_to_meters: f64,

    pub wall_depth: f64,
    pub ceiling_depth: f64,
    pub floor_depth: f64,
    pub wall_height: f64,
    /// Height of walls of short-walled rooms such as balconies.
    pub short_wall_height: f64,
    pub wall_extra_height: f64,

    pub door_min_y: f64,
    pub door_max_y: f64,
    pub window_min_y: f64,
    pub window_max_y: f64,

    pub wall_materials: Value,
    pub ceiling_materials: Value,
    pub floor_materials: Value,

    pub asset_source: Value,
    pub asset_transforms: Value,

    pub short_wall_room_types: Vec<String>,
}

impl Default for ArchDefaults {
    fn default() -> Self {
        Self {
            version: "arch@1.0.2".into(),
            up: [0.0, 1.0, 0.0],
            front: [0.0, 0.0, 1.0],
            scale_to_meters: 1.0,
            wall_depth: 0.1,
            ceiling_depth: 0.05,
            floor_depth: 0.05,
            wall_height: 2.8,
            short_wall_height: 1.0,
            wall_extra_height: 0.035,
            door_min_y: 0.0,
            door_max_y: 2.1,
            window_min_y: 0.9,
            window_max_y: 2.1,
            wall_materials: json!([
                {"name": "surface1", "diffuse": "#ffffff"},
                {"name": "surface2", "diffuse": "#ffffff"}
            ]),
            ceiling_materials: json!([{"name": "surface", "diffuse": "#ffffff"}]),
            floor_materials: json!([{"name": "surface", "diffuse": "#ffffff"}]),
            asset_source: json!(["3dw"]),
            asset_transforms: json!({}),
            short_wall_room_types: vec!["balcony".into()],
        }
    }
}

fn read_json_or_default<T>(path: &Path, what: &str) -> Result<T>
where
    T: Default + for<'de> Deserialize<'de>,
{
    if !path.exists() {
        tracing::warn!(path = %path.display(), "{} not found, using defaults", what);
        return Ok(T::default());
    }
    let text = fs::read_to_string(path).map_err(ImporterError::io(path))?;
    serde_json::from_str(&text).map_err(ImporterError::json(path))
}

pub fn load_parser_config(path: &Path) -> Result<ParserConfig> {
    read_json_or_default(path, "Parser config")
}

pub fn load_arch_defaults(path: &Path) -> Result<ArchDefaults> {
    read_json_or_default(path, "Arch defaults")
}

/// Loads `room_types.json` from `labels_path`. A missing file is an error
/// only when `required` is set.
pub fn load_room_types(labels_path: &Path, required: bool) -> Result<Vec<String>> {
    let path = labels_path.join(ROOM_TYPES_FILE);
    if !path.exists() {
        if required {
            return Err(ImporterError::MissingRoomTypes(path));
        }
        tracing::warn!(path = %path.display(), "Room types not found, no room type labels");
        return Ok(Vec::new());
    }

    let text = fs::read_to_string(&path).map_err(ImporterError::io(&path))?;
    serde_json::from_str(&text).map_err(ImporterError::json(&path))
}

/// Paths of the configuration inputs
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigPaths {
    pub parser_config: PathBuf,
    pub arch_defaults: PathBuf,
    pub labels_path: PathBuf,
}

impl Default for ConfigPaths {
    fn default() -> Self {
        Self {
            parser_config: DEFAULT_PARSER_CONFIG.into(),
            arch_defaults: DEFAULT_ARCH_DEFAULTS.into(),
            labels_path: DEFAULT_LABELS_PATH.into(),
        }
    }
}
