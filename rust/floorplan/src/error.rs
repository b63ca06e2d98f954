// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for floor plan reconstruction.
//!
//! Only fatal conditions and invariant violations are errors. Conditions the
//! pipeline recovers from (degenerate walls, exhausted iteration budgets,
//! unmatched openings) are reported through `tracing` instead.

use crate::keys::{CornerKey, WallKey};

/// Result type alias for reconstruction operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while reconstructing a floor plan.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Corner key not found in the graph.
    #[error("corner not found: {0:?}")]
    CornerNotFound(CornerKey),

    /// Wall key not found in the graph.
    #[error("wall not found: {0:?}")]
    WallNotFound(WallKey),

    /// Both endpoints of a new wall resolved to the same corner. The merge
    /// tolerance is larger than the surrounding geometry.
    #[error("wall endpoints ({x1}, {y1}) and ({x2}, {y2}) resolve to the same corner (tolerance {tolerance})")]
    CornerCollision {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        tolerance: f64,
    },

    /// A wall whose endpoints share a position.
    #[error("wall {0:?} has zero length")]
    DegenerateWall(WallKey),

    /// A wall bordering more rooms than a planar graph allows.
    #[error("wall {wall:?} borders {count} rooms")]
    TooManyAdjacentRooms { wall: WallKey, count: usize },

    /// Two consecutive walls of a room cycle share no corner.
    #[error("room cycle walls {0:?} and {1:?} are not connected")]
    DisconnectedCycle(WallKey, WallKey),

    /// Wall straightening left the graph in an unusable state.
    #[error("straighten walls failed at iteration {iteration}: {path}")]
    StraightenFailed {
        path: String,
        iteration: usize,
        #[source]
        source: Box<Error>,
    },

    /// Malformed R2V input.
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },
}

impl Error {
    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        Error::Parse {
            line,
            message: message.into(),
        }
    }
}
