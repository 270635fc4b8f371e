//! Embedded HTTP/WebSocket gateway for a host application's configuration,
//! controllers and events.
//!
//! The host owns its state on a single-threaded loop. The gateway runs its
//! network I/O on a dedicated thread and never touches host state there:
//! every configuration read or write and every controller call is submitted
//! through a [`dispatch::HostDispatcher`] and runs on the host thread inside
//! [`dispatch::HostLoop::run`]. Events travel the other way: the host emits
//! them through an [`events::EventSource`], and each WebSocket subscriber
//! queues them for its own writer on the I/O thread.
//!
//! ## Surface
//!
//! - `GET`/`POST /config/<uri>`: configuration trees as JSON, and JSON
//!   patches back into them (see [`codec`]).
//! - `GET`/`POST /controller/<method>[/<params>]`: named calls (see
//!   [`controller`]).
//! - `GET /subscribe[/<event>+<event>...]` with a WebSocket upgrade: a stream
//!   of `{"event": ..., "params": {...}}` messages.
//!
//! The gateway listens on one loopback TCP port or one Unix socket, chosen by
//! settings persisted through [`hostgate_config::SettingsStore`]. Writing the
//! gateway's own addon configuration saves new settings and restarts the
//! listener on the host thread.
//!
//! ## Wiring
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use hostgate::dispatch::host_channel;
//! use hostgate::events::EventHub;
//! use hostgate::host::memory::MemoryHost;
//! use hostgate::{Gateway, GatewayOptions};
//! use hostgate_config::SettingsStore;
//!
//! let (dispatcher, mut host_loop) = host_channel();
//! let gateway = Gateway::new(
//!     GatewayOptions::default(),
//!     dispatcher,
//!     Arc::new(EventHub::new()),
//!     SettingsStore::new("/tmp/hostgate"),
//! );
//! let mut side = gateway.attach(MemoryHost::sample());
//! side.start()?;
//! host_loop.run(&mut side);
//! # Ok::<(), hostgate::SupervisorError>(())
//! ```

pub mod codec;
pub mod controller;
pub mod dispatch;
pub mod events;
mod gateway;
pub mod host;
mod http;
pub mod shutdown;
mod subscribe;
mod supervisor;
pub mod telemetry;
pub mod transport;

pub use gateway::{Gateway, GatewayOptions, HostSide};
pub use supervisor::{ConfigSupervisor, SupervisorError, SupervisorState};

#[cfg(test)]
mod tests;
