//! Cross-thread dispatch between the network I/O thread and the host thread.
//!
//! Host state is owned by the host's single-threaded loop. Work triggered by
//! network requests is submitted through a [`HostDispatcher`] and runs inside
//! [`HostLoop::run`] on the host thread; results travel back on a one-shot
//! channel per call.

mod errors;
mod queue;

pub use self::errors::DispatchError;
pub use self::queue::{HostDispatcher, HostLoop, host_channel};

const DISPATCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::dispatch");
