//! Bind settings shared by the gateway and its embedding host.
//!
//! The gateway listens on exactly one endpoint at a time, chosen by
//! [`GatewaySettings`]: a loopback TCP port or a Unix domain socket path. The
//! settings are persisted by [`SettingsStore`] as a small sectioned key/value
//! document at a fixed path relative to the host's configuration directory.

mod defaults;
mod endpoint;
mod logging;
mod settings;
mod store;

pub use defaults::{
    DEFAULT_LOG_FILTER, DEFAULT_TCP_PORT, DEFAULT_UNIX_SOCKET_PATH, LOOPBACK_HOST, PORT_RANGE,
    SETTINGS_RELATIVE_PATH, default_communication,
};
pub use endpoint::{BindEndpoint, SocketPreparationError};
pub use logging::{LogFormat, LogSettings};
pub use settings::{Communication, GatewaySettings, SettingsPatch, TcpSettings, UnixSocketSettings};
pub use store::{SettingsStore, StoreError};
