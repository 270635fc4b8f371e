//! Listener life cycle driven by the gateway's persisted bind settings.
//!
//! The supervisor lives on the host thread. Every transition (start, reload,
//! shutdown) runs there, so a reload never races with request handling on
//! the host side: the old listener is stopped and its I/O thread joined
//! before the settings are reloaded and a new listener is bound.

mod settings_doc;

use std::mem;
use std::net::SocketAddr;
use std::sync::Arc;

use hostgate_config::{BindEndpoint, GatewaySettings, SettingsStore};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::gateway::{GatewayContext, HostSide};
use crate::host::{ConfigDocument, Configurable, Host, RawConfig};
use crate::http::HttpHandler;
use crate::transport::{ListenerError, ListenerHandle, SocketListener};

const SUPERVISOR_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::supervisor");

/// Errors raised while (re)starting the listener.
#[derive(Debug, Error)]
pub enum SupervisorError {
    /// Binding or starting the listener failed.
    #[error(transparent)]
    Listener(#[from] ListenerError),
    /// The supervisor was shut down and cannot start again.
    #[error("gateway has been shut down")]
    Terminated,
}

/// Observable supervisor state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorState {
    /// No listener is running.
    Idle,
    /// A listener is accepting connections.
    Running,
    /// Shut down for the rest of the process lifetime.
    Terminated,
}

enum Phase {
    Idle,
    Running(ListenerHandle),
    Terminated,
}

/// Owns the listener and the settings it was started with.
pub struct ConfigSupervisor<H: Host> {
    context: Arc<GatewayContext<H>>,
    store: SettingsStore,
    settings: GatewaySettings,
    phase: Phase,
}

impl<H: Host> ConfigSupervisor<H> {
    pub(crate) fn new(context: Arc<GatewayContext<H>>, store: SettingsStore) -> Self {
        Self {
            context,
            store,
            settings: GatewaySettings::default(),
            phase: Phase::Idle,
        }
    }

    pub(crate) const fn context(&self) -> &Arc<GatewayContext<H>> {
        &self.context
    }

    /// Loads the persisted settings and starts a listener for them, stopping
    /// any listener already running.
    ///
    /// # Errors
    ///
    /// Returns [`SupervisorError::Terminated`] after [`Self::shutdown`] and
    /// [`SupervisorError::Listener`] when the endpoint cannot be bound; the
    /// supervisor is left idle in that case.
    pub fn start(&mut self) -> Result<(), SupervisorError> {
        if matches!(self.phase, Phase::Terminated) {
            return Err(SupervisorError::Terminated);
        }
        self.stop();
        self.settings = self.load_settings();

        let endpoint = self.settings.endpoint();
        let listener = SocketListener::bind(&endpoint).inspect_err(|error| {
            error!(target: SUPERVISOR_TARGET, endpoint = %endpoint, error = %error, "bind failed");
        })?;
        let handler = Arc::new(HttpHandler::new(Arc::clone(&self.context)));
        let handle = listener.start(handler)?;
        info!(
            target: SUPERVISOR_TARGET,
            endpoint = %endpoint,
            local_addr = ?handle.local_addr(),
            "gateway listening"
        );
        self.phase = Phase::Running(handle);
        Ok(())
    }

    /// Stops the running listener, rereads the settings and starts again.
    ///
    /// # Errors
    ///
    /// See [`Self::start`].
    pub fn reload(&mut self) -> Result<(), SupervisorError> {
        info!(target: SUPERVISOR_TARGET, "reloading gateway settings");
        self.start()
    }

    /// Stops the listener for good.
    pub fn shutdown(&mut self) {
        self.stop();
        self.phase = Phase::Terminated;
        info!(target: SUPERVISOR_TARGET, "gateway shut down");
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> SupervisorState {
        match self.phase {
            Phase::Idle => SupervisorState::Idle,
            Phase::Running(_) => SupervisorState::Running,
            Phase::Terminated => SupervisorState::Terminated,
        }
    }

    /// Settings of the current (or most recent) listener.
    #[must_use]
    pub const fn settings(&self) -> &GatewaySettings {
        &self.settings
    }

    /// Endpoint of the running listener.
    #[must_use]
    pub fn endpoint(&self) -> Option<&BindEndpoint> {
        match &self.phase {
            Phase::Running(handle) => Some(handle.endpoint()),
            Phase::Idle | Phase::Terminated => None,
        }
    }

    /// Bound TCP address of the running listener.
    #[must_use]
    pub fn local_addr(&self) -> Option<SocketAddr> {
        match &self.phase {
            Phase::Running(handle) => handle.local_addr(),
            Phase::Idle | Phase::Terminated => None,
        }
    }

    fn stop(&mut self) {
        let Phase::Running(handle) = mem::replace(&mut self.phase, Phase::Idle) else {
            return;
        };
        let endpoint = handle.endpoint().clone();
        handle.shutdown();
        match handle.join() {
            Ok(()) => info!(target: SUPERVISOR_TARGET, endpoint = %endpoint, "listener stopped"),
            Err(error) => {
                warn!(target: SUPERVISOR_TARGET, endpoint = %endpoint, error = %error, "listener stopped uncleanly");
            }
        }
    }

    fn load_settings(&self) -> GatewaySettings {
        self.store.load().unwrap_or_else(|error| {
            error!(
                target: SUPERVISOR_TARGET,
                path = %self.store.path(),
                error = %error,
                "failed to load gateway settings; using defaults"
            );
            GatewaySettings::default()
        })
    }

    fn schedule_reload(&self) {
        let scheduled = self
            .context
            .dispatcher
            .schedule(|side: &mut HostSide<H>| {
                if let Err(error) = side.supervisor_mut().reload() {
                    error!(target: SUPERVISOR_TARGET, error = %error, "reload failed");
                }
            });
        if let Err(error) = scheduled {
            warn!(target: SUPERVISOR_TARGET, error = %error, "reload not scheduled");
        }
    }
}

/// The gateway's own settings, served as the configuration of its addon.
impl<H: Host> Configurable for ConfigSupervisor<H> {
    fn config(&self) -> Option<ConfigDocument> {
        Some(settings_doc::document(&self.settings))
    }

    fn set_config(&mut self, patch: &RawConfig) {
        let update = settings_doc::patch_from_raw(patch);
        let mut next = self.settings.clone();
        for key in next.apply(&update) {
            warn!(target: SUPERVISOR_TARGET, option = key, "ignoring invalid value");
        }
        if let Err(error) = self.store.save(&next) {
            error!(target: SUPERVISOR_TARGET, error = %error, "failed to save gateway settings");
            return;
        }
        self.settings = next;
        // Runs after the current request's response has been handed back.
        self.schedule_reload();
    }
}
