//! Error types for cross-thread dispatch.

use thiserror::Error;

/// Failures submitting work to the host thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// The host loop has stopped, or dropped the job before running it.
    #[error("host loop is no longer running")]
    HostGone,

    /// A blocking call was issued from the host thread, which would wait on
    /// itself forever.
    #[error("blocking dispatch from the host thread would deadlock")]
    Reentrant,
}
