//! Continuity warnings collected during the branch walk.
//!
//! Every domain anomaly the checks detect becomes one of these records; none
//! of them is ever an error. They are consumed by the reporter (one log line
//! each) and by the layout engine (flag markers on the profile plot).

use std::fmt;

use serde::{Deserialize, Serialize};

use lp_core::{ChannelId, Point, Real};

/// Discriminant for the five continuity checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WarningKind {
    Cover,
    Gradient,
    Invert,
    Area,
    Angle,
}

/// One located, typed continuity finding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Warning {
    /// The channel's invert rises in the downstream direction.
    AdverseGradient {
        channel: ChannelId,
        us_invert: Real,
        ds_invert: Real,
        location: Option<Point>,
    },

    /// The channel's inlet sits above the previous channel's outlet.
    AdverseInvert {
        upstream: ChannelId,
        upstream_ds_invert: Real,
        channel: ChannelId,
        us_invert: Real,
        location: Option<Point>,
    },

    /// Flow area shrinks relative to the previous channel.
    DecreasingArea {
        upstream: ChannelId,
        upstream_area: Real,
        channel: ChannelId,
        area: Real,
        location: Option<Point>,
    },

    /// Downstream connection angle tighter than the configured limit.
    SharpAngle {
        channel: ChannelId,
        angle: Real,
        location: Option<Point>,
    },

    /// Ground-to-obvert depth below the configured limit. Chainage is local
    /// to the channel; only the first violating sample is recorded.
    InsufficientCover {
        channel: ChannelId,
        cover: Real,
        chainage: Real,
        location: Option<Point>,
    },
}

impl Warning {
    pub fn kind(&self) -> WarningKind {
        match self {
            Warning::AdverseGradient { .. } => WarningKind::Gradient,
            Warning::AdverseInvert { .. } => WarningKind::Invert,
            Warning::DecreasingArea { .. } => WarningKind::Area,
            Warning::SharpAngle { .. } => WarningKind::Angle,
            Warning::InsufficientCover { .. } => WarningKind::Cover,
        }
    }

    /// The channel the warning is attached to (the downstream one for
    /// pairwise checks).
    pub fn channel(&self) -> &str {
        match self {
            Warning::AdverseGradient { channel, .. }
            | Warning::AdverseInvert { channel, .. }
            | Warning::DecreasingArea { channel, .. }
            | Warning::SharpAngle { channel, .. }
            | Warning::InsufficientCover { channel, .. } => channel,
        }
    }

    pub fn location(&self) -> Option<Point> {
        match self {
            Warning::AdverseGradient { location, .. }
            | Warning::AdverseInvert { location, .. }
            | Warning::DecreasingArea { location, .. }
            | Warning::SharpAngle { location, .. }
            | Warning::InsufficientCover { location, .. } => *location,
        }
    }

    /// Channel-local chainage, recorded for cover warnings only.
    pub fn chainage(&self) -> Option<Real> {
        match self {
            Warning::InsufficientCover { chainage, .. } => Some(*chainage),
            _ => None,
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::AdverseGradient {
                channel,
                us_invert,
                ds_invert,
                ..
            } => write!(
                f,
                "Adverse gradient: {channel} invert rises downstream ({us_invert:.3} to {ds_invert:.3})"
            ),
            Warning::AdverseInvert {
                upstream,
                upstream_ds_invert,
                channel,
                us_invert,
                ..
            } => write!(
                f,
                "Adverse invert: {channel} upstream invert {us_invert:.3} sits above {upstream} downstream invert {upstream_ds_invert:.3}"
            ),
            Warning::DecreasingArea {
                upstream,
                upstream_area,
                channel,
                area,
                ..
            } => write!(
                f,
                "Decreasing flow area: {channel} area {area:.3} is less than {upstream} area {upstream_area:.3}"
            ),
            Warning::SharpAngle { channel, angle, .. } => {
                write!(f, "Sharp angle: {channel} connects at {angle:.1} degrees")
            }
            Warning::InsufficientCover {
                channel,
                cover,
                chainage,
                ..
            } => write!(
                f,
                "Insufficient cover: {channel} has {cover:.3} cover at chainage {chainage:.2}"
            ),
        }
    }
}
