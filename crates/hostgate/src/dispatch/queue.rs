//! Job queue between the I/O thread and the host thread.

use std::sync::Arc;
use std::thread::{self, ThreadId};

use once_cell::sync::OnceCell;
use tokio::sync::{mpsc, oneshot};
use tracing::debug;

use super::{DISPATCH_TARGET, DispatchError};

type Job<S> = Box<dyn FnOnce(&mut S) + Send>;

enum Message<S> {
    Run(Job<S>),
    Quit,
}

/// Creates a connected dispatcher and host loop for host state `S`.
#[must_use]
pub fn host_channel<S: 'static>() -> (HostDispatcher<S>, HostLoop<S>) {
    let (sender, receiver) = mpsc::unbounded_channel();
    let host_thread = Arc::new(OnceCell::new());
    (
        HostDispatcher {
            sender,
            host_thread: Arc::clone(&host_thread),
        },
        HostLoop {
            receiver,
            host_thread,
        },
    )
}

/// Submits closures to run against host state on the host thread.
///
/// Closures run one at a time, in submission order. A closure must never wait
/// on the I/O thread: the I/O thread may itself be waiting on the closure's
/// result.
pub struct HostDispatcher<S> {
    sender: mpsc::UnboundedSender<Message<S>>,
    host_thread: Arc<OnceCell<ThreadId>>,
}

impl<S> Clone for HostDispatcher<S> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
            host_thread: Arc::clone(&self.host_thread),
        }
    }
}

impl<S: 'static> HostDispatcher<S> {
    /// Queues `job` without waiting for it.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::HostGone`] when the host loop has been
    /// dropped.
    pub fn schedule(&self, job: impl FnOnce(&mut S) + Send + 'static) -> Result<(), DispatchError> {
        self.sender
            .send(Message::Run(Box::new(job)))
            .map_err(|_| DispatchError::HostGone)
    }

    /// Runs `job` on the host thread and waits for its result.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::HostGone`] when the host loop stops before
    /// running the job.
    pub async fn call<R>(
        &self,
        job: impl FnOnce(&mut S) -> R + Send + 'static,
    ) -> Result<R, DispatchError>
    where
        R: Send + 'static,
    {
        let reply = self.submit(job)?;
        reply.await.map_err(|_| DispatchError::HostGone)
    }

    /// Blocking variant of [`HostDispatcher::call`] for threads outside any
    /// async runtime.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Reentrant`] when invoked from the host thread
    /// and [`DispatchError::HostGone`] when the host loop stops before running
    /// the job.
    pub fn call_blocking<R>(
        &self,
        job: impl FnOnce(&mut S) -> R + Send + 'static,
    ) -> Result<R, DispatchError>
    where
        R: Send + 'static,
    {
        if self.on_host_thread() {
            return Err(DispatchError::Reentrant);
        }
        let reply = self.submit(job)?;
        reply.blocking_recv().map_err(|_| DispatchError::HostGone)
    }

    /// Asks the host loop to return from [`HostLoop::run`] once the jobs
    /// queued before this request have run.
    pub fn quit(&self) {
        if self.sender.send(Message::Quit).is_err() {
            debug!(target: DISPATCH_TARGET, "host loop already stopped");
        }
    }

    /// Whether the current thread is the one running the host loop.
    #[must_use]
    pub fn on_host_thread(&self) -> bool {
        self.host_thread.get() == Some(&thread::current().id())
    }

    fn submit<R>(
        &self,
        job: impl FnOnce(&mut S) -> R + Send + 'static,
    ) -> Result<oneshot::Receiver<R>, DispatchError>
    where
        R: Send + 'static,
    {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.schedule(move |state| {
            if reply_tx.send(job(state)).is_err() {
                debug!(target: DISPATCH_TARGET, "caller stopped waiting for the result");
            }
        })?;
        Ok(reply_rx)
    }
}

/// Host-thread end of the job queue.
pub struct HostLoop<S> {
    receiver: mpsc::UnboundedReceiver<Message<S>>,
    host_thread: Arc<OnceCell<ThreadId>>,
}

impl<S> HostLoop<S> {
    /// Runs jobs against `state` until [`HostDispatcher::quit`] is called or
    /// every dispatcher has been dropped.
    ///
    /// Must be called outside any async runtime.
    pub fn run(&mut self, state: &mut S) {
        self.claim_thread();
        while let Some(message) = self.receiver.blocking_recv() {
            match message {
                Message::Run(job) => job(state),
                Message::Quit => break,
            }
        }
    }

    /// Runs every job already queued without waiting for more.
    ///
    /// Returns `false` once the loop should stop: a quit request was seen or
    /// every dispatcher is gone.
    pub fn run_pending(&mut self, state: &mut S) -> bool {
        self.claim_thread();
        loop {
            match self.receiver.try_recv() {
                Ok(Message::Run(job)) => job(state),
                Ok(Message::Quit) | Err(mpsc::error::TryRecvError::Disconnected) => return false,
                Err(mpsc::error::TryRecvError::Empty) => return true,
            }
        }
    }

    fn claim_thread(&self) {
        let current = thread::current().id();
        let owner = self.host_thread.get_or_init(|| current);
        debug_assert_eq!(*owner, current, "host loop moved between threads");
    }
}
