//! Test helpers for the transport module.

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use futures::FutureExt;
use futures::future::BoxFuture;

use super::{ConnectionHandler, ConnectionScope, ConnectionStream};

/// Handler that counts connections and holds each one open until the
/// listener shuts down.
pub(crate) struct CountingHandler {
    count: Arc<AtomicUsize>,
}

impl CountingHandler {
    pub(crate) fn new() -> (Arc<AtomicUsize>, Arc<Self>) {
        let count = Arc::new(AtomicUsize::new(0));
        let handler = Arc::new(Self {
            count: Arc::clone(&count),
        });
        (count, handler)
    }
}

impl ConnectionHandler for CountingHandler {
    fn handle(&self, stream: ConnectionStream, scope: ConnectionScope) -> BoxFuture<'static, ()> {
        self.count.fetch_add(1, Ordering::SeqCst);
        async move {
            scope.shutdown.cancelled().await;
            drop(stream);
        }
        .boxed()
    }
}
