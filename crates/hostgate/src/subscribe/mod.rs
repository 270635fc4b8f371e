//! Event subscriptions over WebSocket.
//!
//! A client upgrading `/subscribe[/<name>+<name>...]` gets one watcher per
//! selected event kind. Watchers run on the host thread and only append to
//! the subscriber's outbox; the subscriber's task on the I/O thread writes
//! the queued messages to the socket in order.

mod outbox;
mod selection;
mod session;

pub(crate) use self::selection::select_events;
pub(crate) use self::session::Subscription;

const SUBSCRIBE_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::subscribe");
