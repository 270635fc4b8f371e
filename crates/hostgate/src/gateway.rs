//! Gateway assembly: the shared request context and the host-thread state.

use std::net::SocketAddr;
use std::sync::Arc;

use hostgate_config::SettingsStore;
use serde_json::Value;

use crate::codec::{self, ConfigError, OwnAddon, SetConfigError};
use crate::controller::ControllerTable;
use crate::dispatch::HostDispatcher;
use crate::events::EventSource;
use crate::host::Host;
use crate::supervisor::{ConfigSupervisor, SupervisorError};

/// Names the gateway answers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayOptions {
    /// Addon name under which the gateway's own settings are served.
    pub addon_name: String,
    /// Value of the `Server` response header.
    pub server_name: String,
}

impl Default for GatewayOptions {
    fn default() -> Self {
        Self {
            addon_name: "beast".to_owned(),
            server_name: "Beast".to_owned(),
        }
    }
}

/// Collaborators shared by every connection on the I/O thread.
pub(crate) struct GatewayContext<H: Host> {
    pub(crate) dispatcher: HostDispatcher<HostSide<H>>,
    pub(crate) events: Arc<dyn EventSource>,
    pub(crate) controllers: ControllerTable<H>,
    pub(crate) options: GatewayOptions,
}

/// Builder wiring a host into the gateway.
pub struct Gateway<H: Host> {
    options: GatewayOptions,
    dispatcher: HostDispatcher<HostSide<H>>,
    events: Arc<dyn EventSource>,
    controllers: ControllerTable<H>,
    store: SettingsStore,
}

impl<H: Host> Gateway<H> {
    /// Gateway with the built-in controller methods.
    ///
    /// `dispatcher` must feed the host loop that will own the [`HostSide`]
    /// returned by [`Gateway::attach`].
    #[must_use]
    pub fn new(
        options: GatewayOptions,
        dispatcher: HostDispatcher<HostSide<H>>,
        events: Arc<dyn EventSource>,
        store: SettingsStore,
    ) -> Self {
        Self {
            options,
            dispatcher,
            events,
            controllers: ControllerTable::new(),
            store,
        }
    }

    /// Replaces the controller table.
    #[must_use]
    pub fn with_controllers(mut self, controllers: ControllerTable<H>) -> Self {
        self.controllers = controllers;
        self
    }

    /// Hands `host` to the gateway. The listener is not started yet; call
    /// [`HostSide::start`] on the host thread.
    #[must_use]
    pub fn attach(self, host: H) -> HostSide<H> {
        let context = Arc::new(GatewayContext {
            dispatcher: self.dispatcher,
            events: self.events,
            controllers: self.controllers,
            options: self.options,
        });
        HostSide {
            host,
            supervisor: ConfigSupervisor::new(context, self.store),
        }
    }
}

/// State owned by the host thread: the host and the listener supervisor.
///
/// Every closure submitted through the gateway's dispatcher receives this.
pub struct HostSide<H: Host> {
    host: H,
    supervisor: ConfigSupervisor<H>,
}

impl<H: Host> HostSide<H> {
    /// The listener supervisor.
    #[must_use]
    pub const fn supervisor(&self) -> &ConfigSupervisor<H> {
        &self.supervisor
    }

    /// The listener supervisor, mutably.
    pub const fn supervisor_mut(&mut self) -> &mut ConfigSupervisor<H> {
        &mut self.supervisor
    }

    /// Starts listening with the persisted settings.
    ///
    /// # Errors
    ///
    /// See [`ConfigSupervisor::start`].
    pub fn start(&mut self) -> Result<(), SupervisorError> {
        self.supervisor.start()
    }

    /// Stops the listener for the rest of the process lifetime.
    pub fn shutdown(&mut self) {
        self.supervisor.shutdown();
    }

    /// Bound TCP address of the running listener.
    #[must_use]
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.supervisor.local_addr()
    }

    /// Renders the configuration addressed by `uri`.
    ///
    /// # Errors
    ///
    /// Returns the [`ConfigError`] describing why nothing can be rendered.
    pub fn get_config(&mut self, uri: &str) -> Result<Value, ConfigError> {
        let context = Arc::clone(self.supervisor.context());
        let own = OwnAddon::new(&context.options.addon_name, &mut self.supervisor);
        codec::get_config(&mut self.host, own, uri)
    }

    /// Applies the JSON patch in `body` to the configuration addressed by
    /// `uri`. Returns whether the owner accepted it.
    ///
    /// # Errors
    ///
    /// Returns [`SetConfigError`] when `body` is not JSON.
    pub fn set_config(&mut self, uri: &str, body: &[u8]) -> Result<bool, SetConfigError> {
        let context = Arc::clone(self.supervisor.context());
        let own = OwnAddon::new(&context.options.addon_name, &mut self.supervisor);
        codec::set_config(&mut self.host, own, uri, body)
    }

    /// Runs the controller method addressed by `path`.
    #[must_use]
    pub fn call_controller(&self, path: &str) -> Value {
        self.supervisor
            .context()
            .controllers
            .dispatch(path, &self.host)
    }
}
