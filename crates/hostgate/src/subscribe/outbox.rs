//! Per-subscriber queue of outgoing event messages.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::Notify;

#[derive(Default)]
struct Pending {
    queue: VecDeque<String>,
    closed: bool,
}

/// Messages produced on the host thread, waiting for the subscriber's writer.
///
/// The host thread only ever appends; the single writer task takes messages
/// in arrival order and sends them one after another.
#[derive(Default)]
pub(crate) struct Outbox {
    pending: Mutex<Pending>,
    ready: Notify,
}

impl Outbox {
    /// Appends a message and wakes the writer. Messages pushed after
    /// [`Outbox::close`] are dropped.
    pub(crate) fn push(&self, message: String) {
        let mut pending = self.lock();
        if pending.closed {
            return;
        }
        pending.queue.push_back(message);
        drop(pending);
        self.ready.notify_one();
    }

    /// Waits until at least one push happened since the last wake-up.
    pub(crate) async fn ready(&self) {
        self.ready.notified().await;
    }

    /// Takes every queued message, oldest first.
    pub(crate) fn drain(&self) -> Vec<String> {
        self.lock().queue.drain(..).collect()
    }

    /// Stops accepting messages and discards the queue.
    pub(crate) fn close(&self) {
        let mut pending = self.lock();
        pending.closed = true;
        pending.queue.clear();
    }

    fn lock(&self) -> MutexGuard<'_, Pending> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn messages_drain_in_push_order() {
        let outbox = Outbox::default();
        outbox.push("one".to_owned());
        outbox.push("two".to_owned());
        assert_eq!(outbox.drain(), vec!["one", "two"]);
        assert!(outbox.drain().is_empty());
    }

    #[test]
    fn closed_outbox_drops_messages() {
        let outbox = Outbox::default();
        outbox.push("queued".to_owned());
        outbox.close();
        outbox.push("late".to_owned());
        assert!(outbox.drain().is_empty());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn push_before_wait_is_not_lost() {
        let outbox = Outbox::default();
        outbox.push("early".to_owned());
        tokio::time::timeout(Duration::from_secs(1), outbox.ready())
            .await
            .expect("stored wake-up");
        assert_eq!(outbox.drain(), vec!["early"]);
    }
}
