// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the importer.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Importer error types.
#[derive(Debug, Error)]
pub enum ImporterError {
    #[error("Invalid arguments: {0}")]
    Usage(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Reconstruction failed: {0}")]
    Floorplan(#[from] r2v_floorplan::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Room type vocabulary not found: {0}")]
    MissingRoomTypes(PathBuf),

    #[error("Room {0} has no id")]
    MissingRoomId(usize),
}

impl ImporterError {
    /// Adapter for `map_err` on I/O results.
    pub fn io(path: &Path) -> impl FnOnce(std::io::Error) -> Self + '_ {
        move |source| ImporterError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn json(path: &Path) -> impl FnOnce(serde_json::Error) -> Self + '_ {
        move |source| ImporterError::Json {
            path: path.to_path_buf(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, ImporterError>;
