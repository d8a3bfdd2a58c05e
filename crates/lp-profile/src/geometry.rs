//! Plot geometry output types.
//!
//! Purely derived data: safe to discard and recompute from the trace and
//! paths at any time.

use serde::{Deserialize, Serialize};

use lp_core::{Point, Real};
use lp_network::WarningKind;

/// Closed 4-corner outline of one pipe run, in plot coordinates:
/// invert at each end, then obvert at each end, in drawing order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PipePatch {
    pub corners: [Point; 4],
}

/// One warning marker on the profile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlagMarker {
    pub kind: WarningKind,
    pub x: Real,
    pub y: Real,
}

/// Plot-ready arrays for one path.
///
/// `x` holds doubled step boundaries (`[s0, e0, s1, e1, ...]`) and `inverts`
/// the matching upstream/downstream invert pairs, `NaN` where unknown, so the
/// profile renders as a stepped line without further processing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotGeometry {
    pub path: String,
    pub x: Vec<Real>,
    pub inverts: Vec<Real>,
    pub ground_x: Vec<Real>,
    pub ground_y: Vec<Real>,
    pub pipes: Vec<PipePatch>,
    pub flags: Vec<FlagMarker>,
}

impl PlotGeometry {
    /// Absolute chainage where this path starts.
    pub fn start(&self) -> Option<Real> {
        self.x.first().copied()
    }

    /// Absolute chainage where this path ends.
    pub fn end(&self) -> Option<Real> {
        self.x.last().copied()
    }
}
