//! lp-network: network reconstruction and continuity checking for 1D
//! drainage model results.
//!
//! Provides:
//! - External-interface tables (channel records, downstream connectivity,
//!   ground drape samples)
//! - The downstream branch walker with inline continuity checks
//! - The branch-graph path resolver (source-to-outlet paths)
//! - A plain-text reporter for the collected warnings
//!
//! # Example
//!
//! ```
//! use lp_network::{ChannelKind, ChannelRecord, ChannelTable, CheckLimits,
//!                  ConnectivityTable, NetworkWalker, Seed, paths};
//!
//! let mut channels = ChannelTable::new();
//! channels
//!     .insert("C1", ChannelRecord::new(ChannelKind::Circular, 30.0))
//!     .unwrap();
//! channels
//!     .insert("C2", ChannelRecord::new(ChannelKind::Circular, 25.0))
//!     .unwrap();
//!
//! let mut connectivity = ConnectivityTable::new();
//! connectivity.connect("C1", ["C2"]);
//!
//! let walker = NetworkWalker::new(&channels, &connectivity, CheckLimits::default());
//! let trace = walker.trace([Seed::single("C1")]).unwrap();
//! assert_eq!(trace.branches.len(), 1);
//!
//! let all_paths = paths::resolve(&trace);
//! assert_eq!(all_paths[0].channels, vec!["C1".to_string(), "C2".to_string()]);
//! ```

pub mod branch;
pub mod error;
pub mod paths;
pub mod report;
pub mod tables;
pub mod walk;
pub mod warning;

mod checks;

// Re-exports for ergonomics
pub use branch::{Branch, BranchStep, BranchTermination, NetworkTrace};
pub use error::NetworkError;
pub use paths::{BranchGraph, Path, PathSegment};
pub use report::render_log;
pub use tables::{
    ChannelKind, ChannelRecord, ChannelTable, ConnectivityTable, GroundProfile, GroundSample,
    GroundTable,
};
pub use walk::{CheckLimits, NetworkWalker, Seed};
pub use warning::{Warning, WarningKind};
