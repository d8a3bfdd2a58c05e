//! lp-core: stable foundation for the long-profile engine.
//!
//! Contains:
//! - numeric (Real + elevation sentinel handling + float helpers)
//! - geometry (2-D points used for warning locations and plot patches)
//! - ids (channel identifiers and the connector pseudo-channel marker)
//! - error (shared error types)

pub mod error;
pub mod geometry;
pub mod ids;
pub mod numeric;

// Re-exports: nice ergonomics for downstream crates
pub use error::{LpError, LpResult};
pub use geometry::Point;
pub use ids::*;
pub use numeric::*;
