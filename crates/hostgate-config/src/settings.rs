//! Persisted bind settings and their partial-update rules.

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::defaults::{
    DEFAULT_TCP_PORT, DEFAULT_UNIX_SOCKET_PATH, PORT_RANGE, default_communication,
};
use crate::endpoint::BindEndpoint;

/// Transport the gateway listens on.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Deserialize,
    Serialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
#[strum(ascii_case_insensitive)]
pub enum Communication {
    /// Unix domain socket at [`UnixSocketSettings::path`].
    UnixSocket,
    /// Loopback TCP on [`TcpSettings::port`].
    #[serde(rename = "TCP")]
    #[strum(serialize = "TCP")]
    Tcp,
}

impl Default for Communication {
    fn default() -> Self {
        default_communication()
    }
}

/// TCP section of the settings document.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct TcpSettings {
    /// Loopback port.
    #[serde(rename = "Port")]
    pub port: u16,
}

impl Default for TcpSettings {
    fn default() -> Self {
        Self {
            port: DEFAULT_TCP_PORT,
        }
    }
}

/// Unix socket section of the settings document.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct UnixSocketSettings {
    /// Filesystem path of the socket.
    #[serde(rename = "Path")]
    pub path: Utf8PathBuf,
}

impl Default for UnixSocketSettings {
    fn default() -> Self {
        Self {
            path: Utf8PathBuf::from(DEFAULT_UNIX_SOCKET_PATH),
        }
    }
}

/// Complete bind configuration. Replaced wholesale on reload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct GatewaySettings {
    /// Selected transport.
    #[serde(rename = "Communication")]
    pub communication: Communication,
    /// TCP parameters, used when `communication` is [`Communication::Tcp`].
    #[serde(rename = "TCP")]
    pub tcp: TcpSettings,
    /// Unix socket parameters, used when `communication` is
    /// [`Communication::UnixSocket`].
    #[serde(rename = "Unix Socket")]
    pub unix_socket: UnixSocketSettings,
}

/// Partial update expressed as raw strings, as received from a client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsPatch {
    /// New communication mode name.
    pub communication: Option<String>,
    /// New TCP port, in decimal.
    pub tcp_port: Option<String>,
    /// New Unix socket path.
    pub unix_socket_path: Option<String>,
}

impl GatewaySettings {
    /// Settings for a loopback TCP listener on `port`.
    #[must_use]
    pub fn tcp(port: u16) -> Self {
        Self {
            communication: Communication::Tcp,
            tcp: TcpSettings { port },
            ..Self::default()
        }
    }

    /// Settings for a Unix socket listener at `path`.
    #[must_use]
    pub fn unix(path: impl Into<Utf8PathBuf>) -> Self {
        Self {
            communication: Communication::UnixSocket,
            unix_socket: UnixSocketSettings { path: path.into() },
            ..Self::default()
        }
    }

    /// Endpoint selected by the communication mode.
    #[must_use]
    pub fn endpoint(&self) -> BindEndpoint {
        match self.communication {
            Communication::Tcp => BindEndpoint::tcp(self.tcp.port),
            Communication::UnixSocket => BindEndpoint::unix(self.unix_socket.path.clone()),
        }
    }

    /// Checks invariants that deserialisation alone cannot express.
    #[must_use]
    pub fn port_is_valid(&self) -> bool {
        PORT_RANGE.contains(&self.tcp.port)
    }

    /// Applies a partial update.
    ///
    /// Values that fail to parse or fall outside their constraint leave the
    /// option untouched; their keys are returned so callers can report them.
    pub fn apply(&mut self, patch: &SettingsPatch) -> Vec<&'static str> {
        let mut rejected = Vec::new();

        if let Some(raw) = patch.communication.as_deref() {
            match raw.parse::<Communication>() {
                Ok(mode) => self.communication = mode,
                Err(_) => rejected.push("Communication"),
            }
        }

        if let Some(raw) = patch.tcp_port.as_deref() {
            match raw.trim().parse::<u16>() {
                Ok(port) if PORT_RANGE.contains(&port) => self.tcp.port = port,
                _ => rejected.push("TCP/Port"),
            }
        }

        if let Some(raw) = patch.unix_socket_path.as_deref() {
            if raw.is_empty() {
                rejected.push("Unix Socket/Path");
            } else {
                self.unix_socket.path = Utf8PathBuf::from(raw);
            }
        }

        rejected
    }
}
