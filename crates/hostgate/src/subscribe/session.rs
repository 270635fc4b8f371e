//! One WebSocket subscriber: its watchers, its outbox and its socket loop.

use std::sync::Arc;

use futures::{SinkExt, StreamExt};
use hyper::upgrade::OnUpgrade;
use hyper_util::rt::TokioIo;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_tungstenite::WebSocketStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::protocol::Role;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::SUBSCRIBE_TARGET;
use super::outbox::Outbox;
use crate::events::{EventKind, EventSource, WatchGuard, envelope, extract_params};
use crate::host::HostEvent;

/// Watchers registered for one subscriber, feeding its outbox.
pub(crate) struct Subscription {
    kinds: Vec<EventKind>,
    outbox: Arc<Outbox>,
    guards: Vec<WatchGuard>,
}

impl Subscription {
    /// Registers one watcher per kind. Events raised from now on are queued
    /// even if the socket is not writable yet.
    pub(crate) fn open(events: &dyn EventSource, kinds: Vec<EventKind>) -> Self {
        let outbox = Arc::new(Outbox::default());
        let guards = kinds
            .iter()
            .map(|&kind| {
                let sink = Arc::clone(&outbox);
                events.watch(
                    kind,
                    Arc::new(move |event: &HostEvent| {
                        sink.push(envelope(kind, &extract_params(event)));
                    }),
                )
            })
            .collect();
        Self {
            kinds,
            outbox,
            guards,
        }
    }

    /// Waits for the HTTP upgrade to finish and runs the session on the
    /// upgraded connection.
    pub(crate) async fn serve(self, upgrade: OnUpgrade, shutdown: CancellationToken) {
        let upgraded = match upgrade.await {
            Ok(upgraded) => upgraded,
            Err(error) => {
                warn!(target: SUBSCRIBE_TARGET, error = %error, "websocket upgrade failed");
                return;
            }
        };
        let socket =
            WebSocketStream::from_raw_socket(TokioIo::new(upgraded), Role::Server, None).await;
        self.run(socket, shutdown).await;
    }

    /// Forwards queued events until the client goes away or `shutdown`
    /// fires. Incoming payloads are read and discarded.
    pub(crate) async fn run<S>(self, socket: WebSocketStream<S>, shutdown: CancellationToken)
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let events: Vec<&str> = self.kinds.iter().map(|kind| kind.name()).collect();
        info!(target: SUBSCRIBE_TARGET, events = ?events, "subscriber connected");
        let (mut sink, mut incoming) = socket.split();
        loop {
            tokio::select! {
                () = shutdown.cancelled() => {
                    if let Err(error) = sink.send(Message::Close(None)).await {
                        debug!(target: SUBSCRIBE_TARGET, error = %error, "close frame not sent");
                    }
                    break;
                }
                () = self.outbox.ready() => {
                    if let Err(error) = flush(&self.outbox, &mut sink).await {
                        debug!(target: SUBSCRIBE_TARGET, error = %error, "subscriber write failed");
                        break;
                    }
                }
                frame = incoming.next() => match frame {
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(error)) => {
                        debug!(target: SUBSCRIBE_TARGET, error = %error, "subscriber read failed");
                        break;
                    }
                },
            }
        }
        self.outbox.close();
        drop(self.guards);
        info!(target: SUBSCRIBE_TARGET, "subscriber disconnected");
    }
}

async fn flush<T>(outbox: &Outbox, sink: &mut T) -> Result<(), T::Error>
where
    T: futures::Sink<Message> + Unpin,
{
    for message in outbox.drain() {
        sink.send(Message::Text(message)).await?;
    }
    Ok(())
}
