//! Layout-specific error types.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    /// A path references a branch index the trace does not have.
    #[error("Path '{path}' references branch {branch} but the trace has {len} branches")]
    BranchOutOfRange {
        path: String,
        branch: usize,
        len: usize,
    },

    /// A path segment starts past the end of its branch.
    #[error("Path '{path}' enters branch {branch} at step {step}, past its last step")]
    StepOutOfRange {
        path: String,
        branch: usize,
        step: usize,
    },
}
