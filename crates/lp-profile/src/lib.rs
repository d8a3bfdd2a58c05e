//! lp-profile: plot-ready long-profile geometry.
//!
//! Converts resolved paths into coordinate arrays a plotting frontend can
//! render directly: stepped chainage/invert lines, re-based ground drapes,
//! pipe outline patches and warning flag markers, with overlapping paths
//! aligned at their shared channels.

pub mod error;
pub mod geometry;
pub mod layout;

pub use error::LayoutError;
pub use geometry::{FlagMarker, PipePatch, PlotGeometry};
pub use layout::LayoutEngine;
