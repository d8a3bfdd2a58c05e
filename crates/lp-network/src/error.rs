//! Network-specific error types.
//!
//! Domain anomalies (adverse gradients, missing inverts, dangling downstream
//! references) are never errors: they degrade to warnings or defaults so the
//! walk always produces a best-effort result. Errors are reserved for caller
//! misuse of the API itself.

use lp_core::ChannelId;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NetworkError {
    /// A seed channel id is not present in the channel table.
    #[error("Seed channel not found in channel table: {id}")]
    UnknownChannel { id: ChannelId },

    /// A seed resolved to no real channels (e.g. a connector leading nowhere).
    #[error("Seed resolves to no channels")]
    EmptySeed,
}
