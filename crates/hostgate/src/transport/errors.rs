//! Error types for socket listener operations.

use std::io;
use std::net::SocketAddr;

use hostgate_config::SocketPreparationError;
use thiserror::Error;

/// Errors surfaced while binding or running the socket listener.
#[derive(Debug, Error)]
pub enum ListenerError {
    /// Binding the loopback TCP address failed.
    #[error("failed to bind TCP listener at {addr}: {source}")]
    BindTcp {
        /// Address that failed to bind.
        addr: SocketAddr,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// Switching the listener to non-blocking mode failed.
    #[error("failed to enable non-blocking listener: {source}")]
    NonBlocking {
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// Unix domain sockets are not available on this platform.
    #[cfg(not(unix))]
    #[error("unix sockets are unsupported for endpoint {endpoint}")]
    UnsupportedUnix {
        /// Offending endpoint.
        endpoint: String,
    },
    /// The socket's parent directory could not be prepared.
    #[error(transparent)]
    Prepare(#[from] SocketPreparationError),
    /// Binding the unix socket path failed.
    #[cfg(unix)]
    #[error("failed to bind unix listener at {path}: {source}")]
    BindUnix {
        /// Unix socket path.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// Another process is accepting on the unix socket path.
    #[cfg(unix)]
    #[error("existing unix socket {path} is already in use")]
    UnixInUse {
        /// Offending path.
        path: String,
    },
    /// The unix socket path exists and is not a socket.
    #[cfg(unix)]
    #[error("unix socket path {path} is not a socket")]
    UnixNotSocket {
        /// Offending path.
        path: String,
    },
    /// Inspecting an existing unix socket path failed.
    #[cfg(unix)]
    #[error("failed to read metadata for unix socket {path}: {source}")]
    UnixMetadata {
        /// Unix socket path.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// Probing an existing unix socket failed unexpectedly.
    #[cfg(unix)]
    #[error("failed to connect to existing unix socket {path}: {source}")]
    UnixConnect {
        /// Unix socket path.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// Removing a stale unix socket file failed.
    #[cfg(unix)]
    #[error("failed to remove stale unix socket {path}: {source}")]
    UnixCleanup {
        /// Unix socket path.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The I/O runtime could not be built.
    #[error("failed to build I/O runtime: {source}")]
    Runtime {
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The bound socket could not be registered with the I/O runtime.
    #[error("failed to register listener with the I/O runtime: {source}")]
    Register {
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The I/O thread could not be spawned.
    #[error("failed to spawn I/O thread: {source}")]
    Spawn {
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The I/O thread panicked.
    #[error("listener thread panicked")]
    ThreadPanic,
}
