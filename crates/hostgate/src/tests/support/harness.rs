//! A gateway embedded in a [`MemoryHost`] running on its own host thread.

use std::net::{SocketAddr, TcpListener};
use std::sync::Arc;
use std::sync::mpsc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use camino::Utf8PathBuf;
use hostgate_config::{BindEndpoint, GatewaySettings, SettingsStore};
use tempfile::TempDir;

use crate::dispatch::{HostDispatcher, host_channel};
use crate::events::{EventHub, EventKind};
use crate::host::memory::MemoryHost;
use crate::host::{HostEvent, InputContextInfo};
use crate::{Gateway, GatewayOptions, HostSide};

/// Where a client reaches the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Target {
    Tcp(SocketAddr),
    Unix(Utf8PathBuf),
}

impl Target {
    fn of(side: &HostSide<MemoryHost>) -> Option<Self> {
        match side.supervisor().endpoint()? {
            BindEndpoint::Tcp { .. } => side.local_addr().map(Self::Tcp),
            BindEndpoint::Unix { path } => Some(Self::Unix(path.clone())),
        }
    }
}

/// Running gateway plus the handles tests need to drive its host.
pub(crate) struct GatewayHarness {
    root: TempDir,
    store: SettingsStore,
    hub: EventHub,
    dispatcher: HostDispatcher<HostSide<MemoryHost>>,
    host_thread: Option<JoinHandle<()>>,
    target: Target,
}

impl GatewayHarness {
    /// Gateway on a free loopback port.
    pub(crate) fn tcp() -> Self {
        let root = TempDir::new().expect("temp dir");
        Self::start(root, GatewaySettings::tcp(free_port()))
    }

    /// Gateway on a unix socket inside a fresh temporary directory.
    pub(crate) fn unix() -> Self {
        let root = TempDir::new().expect("temp dir");
        let path = utf8(&root).join("run").join("gateway.sock");
        Self::start(root, GatewaySettings::unix(path))
    }

    fn start(root: TempDir, settings: GatewaySettings) -> Self {
        let store = SettingsStore::new(utf8(&root));
        store.save(&settings).expect("seed settings");

        let hub = EventHub::new();
        let (dispatcher, mut host_loop) = host_channel();
        let gateway = Gateway::new(
            GatewayOptions::default(),
            dispatcher.clone(),
            Arc::new(hub.clone()),
            store.clone(),
        );
        let (ready_tx, ready_rx) = mpsc::channel();
        let host_thread = thread::Builder::new()
            .name("test-host".to_owned())
            .spawn(move || {
                let mut side = gateway.attach(MemoryHost::sample());
                let started = side
                    .start()
                    .map_err(|error| error.to_string())
                    .and_then(|()| Target::of(&side).ok_or_else(|| "no endpoint".to_owned()));
                let running = started.is_ok();
                ready_tx.send(started).expect("report start");
                if running {
                    host_loop.run(&mut side);
                }
                side.shutdown();
            })
            .expect("spawn host thread");

        let target = ready_rx
            .recv()
            .expect("host thread reports")
            .expect("gateway starts");
        Self {
            root,
            store,
            hub,
            dispatcher,
            host_thread: Some(host_thread),
            target,
        }
    }

    pub(crate) const fn target(&self) -> &Target {
        &self.target
    }

    pub(crate) const fn store(&self) -> &SettingsStore {
        &self.store
    }

    /// Path inside the harness' temporary directory.
    pub(crate) fn path(&self, relative: &str) -> Utf8PathBuf {
        utf8(&self.root).join(relative)
    }

    /// Runs `job` on the host thread. Jobs queued earlier, such as a reload
    /// scheduled by a settings write, have finished when this returns.
    pub(crate) fn with_host<R>(
        &self,
        job: impl FnOnce(&mut HostSide<MemoryHost>) -> R + Send + 'static,
    ) -> R
    where
        R: Send + 'static,
    {
        self.dispatcher.call_blocking(job).expect("host loop running")
    }

    /// Re-reads the endpoint after reloads.
    pub(crate) fn refresh_target(&mut self) -> &Target {
        self.target = self
            .with_host(|side| Target::of(side))
            .expect("gateway running");
        &self.target
    }

    /// Emits `event` on the host thread, as the host itself would.
    pub(crate) fn emit(&self, event: HostEvent) {
        let hub = self.hub.clone();
        self.with_host(move |_| hub.emit(&event));
    }

    pub(crate) fn watcher_count(&self, kind: EventKind) -> usize {
        self.hub.watcher_count(kind)
    }

    /// Polls `condition` for up to two seconds.
    pub(crate) fn wait_until(&self, mut condition: impl FnMut(&Self) -> bool) -> bool {
        let deadline = Instant::now() + Duration::from_secs(2);
        while Instant::now() < deadline {
            if condition(self) {
                return true;
            }
            thread::sleep(Duration::from_millis(10));
        }
        condition(self)
    }
}

impl Drop for GatewayHarness {
    fn drop(&mut self) {
        // A host loop that is already gone has nothing left to stop.
        if self.dispatcher.schedule(HostSide::shutdown).is_ok() {
            self.dispatcher.quit();
        }
        if let Some(handle) = self.host_thread.take()
            && let Err(panic) = handle.join()
            && !thread::panicking()
        {
            std::panic::resume_unwind(panic);
        }
    }
}

pub(crate) fn focus_in(program: &str) -> HostEvent {
    HostEvent::FocusIn(context(program))
}

pub(crate) fn focus_out(program: &str) -> HostEvent {
    HostEvent::FocusOut(context(program))
}

pub(crate) fn switch_input_method(program: &str, input_method: &str) -> HostEvent {
    HostEvent::SwitchInputMethod {
        context: context(program),
        input_method: input_method.to_owned(),
    }
}

fn context(program: &str) -> InputContextInfo {
    InputContextInfo {
        uuid: [0xab; 16],
        program: program.to_owned(),
        frontend: "wayland".to_owned(),
    }
}

fn utf8(root: &TempDir) -> Utf8PathBuf {
    Utf8PathBuf::from_path_buf(root.path().to_path_buf()).expect("utf8 temp path")
}

/// A loopback port nothing listens on right now.
pub(crate) fn free_port() -> u16 {
    let probe = TcpListener::bind(("127.0.0.1", 0)).expect("bind probe");
    probe.local_addr().expect("probe address").port()
}
