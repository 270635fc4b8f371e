//! HTTP/1.1 front end: routing, configuration and controller requests, and
//! the WebSocket upgrade into event subscriptions.
//!
//! Every connection carries exactly one request. Configuration and
//! controller work runs on the host thread through the gateway's dispatcher;
//! the connection task waits for the result.

mod connection;
mod errors;
mod response;
mod router;
mod upgrade;

use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;

use crate::gateway::GatewayContext;
use crate::host::Host;
use crate::transport::{ConnectionHandler, ConnectionScope, ConnectionStream};

const HTTP_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::http");

/// [`ConnectionHandler`] serving the gateway's HTTP surface.
pub(crate) struct HttpHandler<H: Host> {
    context: Arc<GatewayContext<H>>,
}

impl<H: Host> HttpHandler<H> {
    pub(crate) const fn new(context: Arc<GatewayContext<H>>) -> Self {
        Self { context }
    }
}

impl<H: Host> ConnectionHandler for HttpHandler<H> {
    fn handle(&self, stream: ConnectionStream, scope: ConnectionScope) -> BoxFuture<'static, ()> {
        connection::serve(Arc::clone(&self.context), stream, scope).boxed()
    }
}
