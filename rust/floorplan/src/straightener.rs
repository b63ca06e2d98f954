// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Snaps nearly axis-aligned walls onto the axis.
//!
//! One endpoint of an inclined wall is moved to share the other endpoint's
//! x (near-vertical) or y (near-horizontal). The move changes the corner's
//! position key, so it always goes through
//! [`WallLinkageGraph::move_corner`].

use crate::error::{Error, Result};
use crate::keys::WallKey;
use crate::types::Point2D;
use crate::wall_graph::WallLinkageGraph;

/// Which axis an inclined wall is snapped to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inclination {
    NearVertical,
    NearHorizontal,
}

/// Outcome of a straightening pass
#[derive(Debug, Clone, Default)]
pub struct StraightenReport {
    pub corrections: usize,
    /// `false` when the iteration budget ran out with inclined walls left.
    pub converged: bool,
}

/// Classifies a wall by its normalized axis offsets. `None` for walls that
/// are exactly aligned or clearly diagonal.
pub fn inclination(p1: &Point2D, p2: &Point2D, cutoff_gradient: f64) -> Option<Inclination> {
    let length = ((p2.x - p1.x).powi(2) + (p2.y - p1.y).powi(2)).sqrt();
    let x_slope = (p1.x - p2.x).abs() / length;
    let y_slope = (p1.y - p2.y).abs() / length;

    if 0.0 < x_slope && x_slope < cutoff_gradient {
        Some(Inclination::NearVertical)
    } else if 0.0 < y_slope && y_slope < cutoff_gradient {
        Some(Inclination::NearHorizontal)
    } else {
        None
    }
}

/// First inclined wall in graph order.
fn find_inclined(graph: &WallLinkageGraph, cutoff_gradient: f64) -> Result<Option<(WallKey, Inclination)>> {
    for &key in graph.wall_keys() {
        let (a, b) = graph.wall_endpoints(key)?;
        if a == b {
            return Err(Error::DegenerateWall(key));
        }
        if let Some(kind) = inclination(&a, &b, cutoff_gradient) {
            return Ok(Some((key, kind)));
        }
    }
    Ok(None)
}

fn correct(graph: &mut WallLinkageGraph, key: WallKey, kind: Inclination) -> Result<()> {
    let wall = graph.wall(key)?;
    let (c1, c2) = (wall.p1, wall.p2);
    let (a, b) = graph.wall_endpoints(key)?;

    let (moved, target) = match kind {
        // The lower endpoint (greater image y) takes the partner's x
        Inclination::NearVertical => {
            if a.y > b.y {
                (c1, Point2D::new(b.x, a.y))
            } else {
                (c2, Point2D::new(a.x, b.y))
            }
        }
        // The right endpoint takes the partner's y
        Inclination::NearHorizontal => {
            if a.x > b.x {
                (c1, Point2D::new(a.x, b.y))
            } else {
                (c2, Point2D::new(b.x, a.y))
            }
        }
    };

    tracing::debug!(wall = ?key, x = target.x, y = target.y, ?kind, "Straighten wall");
    graph.move_corner(moved, target)
}

/// Straighten inclined walls until none remain or `max_iter` corrections
/// were made.
///
/// A failure during a correction step aborts with
/// [`Error::StraightenFailed`] naming `source`.
pub fn straighten_walls(
    graph: &mut WallLinkageGraph,
    cutoff_gradient: f64,
    max_iter: usize,
    source: &str,
) -> Result<StraightenReport> {
    let wrap = |iteration: usize, e: Error| Error::StraightenFailed {
        path: source.to_string(),
        iteration,
        source: Box::new(e),
    };

    let mut report = StraightenReport::default();

    while report.corrections < max_iter {
        let iteration = report.corrections;
        match find_inclined(graph, cutoff_gradient).map_err(|e| wrap(iteration, e))? {
            Some((key, kind)) => {
                correct(graph, key, kind).map_err(|e| wrap(iteration, e))?;
                report.corrections += 1;
            }
            None => {
                report.converged = true;
                return Ok(report);
            }
        }
    }

    report.converged = find_inclined(graph, cutoff_gradient)
        .map_err(|e| wrap(report.corrections, e))?
        .is_none();
    if !report.converged {
        tracing::warn!(file = source, max_iter, "Straighten wall max iterations exceeded");
    }

    Ok(report)
}
