//! Listener implementation for gateway transport sockets.
//!
//! Binding happens on the caller's thread so bind failures propagate. The
//! accept loop then runs on a dedicated I/O thread driving a single-threaded
//! tokio runtime; every accepted connection becomes its own task.

use std::io;
use std::net::{Ipv4Addr, SocketAddr, TcpListener};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use hostgate_config::BindEndpoint;
use tokio::runtime::{Builder, Runtime};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{info, warn};

use super::{ConnectionHandler, ConnectionScope, ConnectionStream, LISTENER_TARGET, ListenerError};

#[cfg(unix)]
use std::fs;
#[cfg(unix)]
use std::os::unix::fs::FileTypeExt;
#[cfg(unix)]
use std::os::unix::net::{UnixListener, UnixStream};
#[cfg(unix)]
use std::path::Path;

const ERROR_BACKOFF: Duration = Duration::from_millis(150);
/// How long in-flight connections may run on after shutdown is requested.
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);
const IO_THREAD_NAME: &str = concat!(env!("CARGO_PKG_NAME"), "-io");

/// Listener bound to an endpoint but not yet accepting.
#[derive(Debug)]
pub struct SocketListener {
    endpoint: BindEndpoint,
    listener: ListenerKind,
}

#[derive(Debug)]
enum ListenerKind {
    Tcp(TcpListener),
    #[cfg(unix)]
    Unix(UnixListener),
}

enum AsyncListener {
    Tcp(tokio::net::TcpListener),
    #[cfg(unix)]
    Unix(tokio::net::UnixListener),
}

impl AsyncListener {
    async fn accept(&self) -> io::Result<ConnectionStream> {
        match self {
            Self::Tcp(listener) => {
                let (stream, _) = listener.accept().await?;
                Ok(ConnectionStream::Tcp(stream))
            }
            #[cfg(unix)]
            Self::Unix(listener) => {
                let (stream, _) = listener.accept().await?;
                Ok(ConnectionStream::Unix(stream))
            }
        }
    }
}

impl SocketListener {
    /// Binds `endpoint`, removing a stale unix socket file first.
    ///
    /// # Errors
    ///
    /// Returns a [`ListenerError`] when the address or path cannot be bound.
    pub fn bind(endpoint: &BindEndpoint) -> Result<Self, ListenerError> {
        match endpoint {
            BindEndpoint::Tcp { port } => {
                let listener = bind_tcp(*port)?;
                Ok(Self {
                    endpoint: endpoint.clone(),
                    listener: ListenerKind::Tcp(listener),
                })
            }
            BindEndpoint::Unix { path } => {
                #[cfg(unix)]
                {
                    endpoint.prepare_filesystem()?;
                    let listener = bind_unix(path.as_std_path())?;
                    Ok(Self {
                        endpoint: endpoint.clone(),
                        listener: ListenerKind::Unix(listener),
                    })
                }

                #[cfg(not(unix))]
                {
                    let _ = path;
                    Err(ListenerError::UnsupportedUnix {
                        endpoint: endpoint.to_string(),
                    })
                }
            }
        }
    }

    /// Address of a TCP listener; useful when bound to port 0.
    #[must_use]
    pub fn local_addr(&self) -> Option<SocketAddr> {
        match &self.listener {
            ListenerKind::Tcp(listener) => listener.local_addr().ok(),
            #[cfg(unix)]
            ListenerKind::Unix(_) => None,
        }
    }

    /// Starts the accept loop on a new I/O thread.
    ///
    /// # Errors
    ///
    /// Returns a [`ListenerError`] when the runtime or thread cannot be
    /// created; the unix socket file is removed in that case.
    pub fn start(
        self,
        handler: Arc<dyn ConnectionHandler>,
    ) -> Result<ListenerHandle, ListenerError> {
        let local_addr = self.local_addr();
        let endpoint = self.endpoint.clone();
        let result = self.spawn_io_thread(handler);
        if result.is_err() {
            #[cfg(unix)]
            cleanup_unix_socket(&endpoint);
        }
        let (shutdown, handle) = result?;
        Ok(ListenerHandle {
            endpoint,
            local_addr,
            shutdown,
            handle: Some(handle),
        })
    }

    fn spawn_io_thread(
        self,
        handler: Arc<dyn ConnectionHandler>,
    ) -> Result<(CancellationToken, thread::JoinHandle<()>), ListenerError> {
        let runtime = Builder::new_current_thread()
            .enable_io()
            .enable_time()
            .build()
            .map_err(|source| ListenerError::Runtime { source })?;
        let Self { endpoint, listener } = self;
        let listener = register(listener, &runtime)?;
        let shutdown = CancellationToken::new();
        let shutdown_flag = shutdown.clone();
        let handle = thread::Builder::new()
            .name(IO_THREAD_NAME.to_owned())
            .spawn(move || {
                runtime.block_on(run_accept_loop(&listener, &endpoint, shutdown_flag, handler));
                drop(listener);
                // Dropping the runtime abandons connections still running
                // after the grace period.
                drop(runtime);
                #[cfg(unix)]
                cleanup_unix_socket(&endpoint);
            })
            .map_err(|source| ListenerError::Spawn { source })?;
        Ok((shutdown, handle))
    }
}

fn register(listener: ListenerKind, runtime: &Runtime) -> Result<AsyncListener, ListenerError> {
    let _context = runtime.enter();
    match listener {
        ListenerKind::Tcp(listener) => {
            listener
                .set_nonblocking(true)
                .map_err(|source| ListenerError::NonBlocking { source })?;
            tokio::net::TcpListener::from_std(listener)
                .map(AsyncListener::Tcp)
                .map_err(|source| ListenerError::Register { source })
        }
        #[cfg(unix)]
        ListenerKind::Unix(listener) => {
            listener
                .set_nonblocking(true)
                .map_err(|source| ListenerError::NonBlocking { source })?;
            tokio::net::UnixListener::from_std(listener)
                .map(AsyncListener::Unix)
                .map_err(|source| ListenerError::Register { source })
        }
    }
}

/// Handle to the background I/O thread.
#[derive(Debug)]
pub struct ListenerHandle {
    endpoint: BindEndpoint,
    local_addr: Option<SocketAddr>,
    shutdown: CancellationToken,
    handle: Option<thread::JoinHandle<()>>,
}

impl ListenerHandle {
    /// Endpoint the listener is bound to.
    #[must_use]
    pub const fn endpoint(&self) -> &BindEndpoint {
        &self.endpoint
    }

    /// Bound TCP address, if any.
    #[must_use]
    pub const fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    /// Stops accepting and cancels subscription sessions. In-flight HTTP
    /// requests get [`SHUTDOWN_GRACE`] to complete.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    /// Waits for the I/O thread to exit.
    ///
    /// # Errors
    ///
    /// Returns [`ListenerError::ThreadPanic`] when the thread panicked.
    pub fn join(mut self) -> Result<(), ListenerError> {
        if let Some(handle) = self.handle.take() {
            match handle.join() {
                Ok(()) => Ok(()),
                Err(_) => Err(ListenerError::ThreadPanic),
            }
        } else {
            Ok(())
        }
    }
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn run_accept_loop(
    listener: &AsyncListener,
    endpoint: &BindEndpoint,
    shutdown: CancellationToken,
    handler: Arc<dyn ConnectionHandler>,
) {
    info!(
        target: LISTENER_TARGET,
        endpoint = %endpoint,
        "socket listener active"
    );
    let scope = ConnectionScope {
        shutdown: shutdown.clone(),
        tasks: TaskTracker::new(),
    };
    let mut last_error = None::<io::ErrorKind>;
    loop {
        let accepted = tokio::select! {
            () = shutdown.cancelled() => break,
            accepted = listener.accept() => accepted,
        };
        match accepted {
            Ok(stream) => {
                last_error = None;
                scope.tasks.spawn(handler.handle(stream, scope.clone()));
            }
            Err(error) => {
                let kind = error.kind();
                if last_error != Some(kind) {
                    warn!(
                        target: LISTENER_TARGET,
                        error = %error,
                        "socket accept error"
                    );
                }
                last_error = Some(kind);
                tokio::select! {
                    () = shutdown.cancelled() => break,
                    () = tokio::time::sleep(ERROR_BACKOFF) => {}
                }
            }
        }
    }

    scope.tasks.close();
    if tokio::time::timeout(SHUTDOWN_GRACE, scope.tasks.wait())
        .await
        .is_err()
    {
        warn!(
            target: LISTENER_TARGET,
            endpoint = %endpoint,
            remaining = scope.tasks.len(),
            "abandoning connections after shutdown grace period"
        );
    }
    info!(
        target: LISTENER_TARGET,
        endpoint = %endpoint,
        "socket listener stopped"
    );
}

fn bind_tcp(port: u16) -> Result<TcpListener, ListenerError> {
    let addr = SocketAddr::from((Ipv4Addr::LOCALHOST, port));
    TcpListener::bind(addr).map_err(|source| ListenerError::BindTcp { addr, source })
}

#[cfg(unix)]
fn bind_unix(path: &Path) -> Result<UnixListener, ListenerError> {
    if path.exists() {
        let metadata =
            fs::symlink_metadata(path).map_err(|source| ListenerError::UnixMetadata {
                path: path.display().to_string(),
                source,
            })?;
        if !metadata.file_type().is_socket() {
            return Err(ListenerError::UnixNotSocket {
                path: path.display().to_string(),
            });
        }
        match UnixStream::connect(path) {
            Ok(_stream) => {
                return Err(ListenerError::UnixInUse {
                    path: path.display().to_string(),
                });
            }
            Err(error)
                if error.kind() == io::ErrorKind::ConnectionRefused
                    || error.kind() == io::ErrorKind::NotFound =>
            {
                fs::remove_file(path).map_err(|source| ListenerError::UnixCleanup {
                    path: path.display().to_string(),
                    source,
                })?;
            }
            Err(error) => {
                return Err(ListenerError::UnixConnect {
                    path: path.display().to_string(),
                    source: error,
                });
            }
        }
    }

    UnixListener::bind(path).map_err(|source| ListenerError::BindUnix {
        path: path.display().to_string(),
        source,
    })
}

#[cfg(unix)]
fn cleanup_unix_socket(endpoint: &BindEndpoint) {
    let Some(path) = endpoint.unix_path() else {
        return;
    };
    if let Err(error) = fs::remove_file(path.as_std_path())
        && error.kind() != io::ErrorKind::NotFound
    {
        warn!(
            target: LISTENER_TARGET,
            error = %error,
            path = %path,
            "failed to remove unix socket file"
        );
    }
}
