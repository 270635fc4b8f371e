//! Socket listener for the gateway's transport endpoint.
//!
//! The transport module binds the configured endpoint and accepts
//! connections on a dedicated I/O thread.

mod errors;
mod listener;
mod stream;
#[cfg(test)]
mod test_utils;

pub use self::errors::ListenerError;
pub use self::listener::{ListenerHandle, SHUTDOWN_GRACE, SocketListener};
pub use self::stream::{ConnectionHandler, ConnectionScope, ConnectionStream};
#[cfg(test)]
pub(crate) use self::test_utils::CountingHandler;

const LISTENER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::transport");
