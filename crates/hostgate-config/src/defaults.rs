use std::ops::RangeInclusive;

use crate::settings::Communication;

/// Default TCP port ("fcitx" typed on a numeric keypad).
pub const DEFAULT_TCP_PORT: u16 = 32489;

/// Default Unix domain socket path.
pub const DEFAULT_UNIX_SOCKET_PATH: &str = "/tmp/fcitx5.sock";

/// Address every TCP listener binds to.
pub const LOOPBACK_HOST: &str = "127.0.0.1";

/// Ports accepted from persisted or patched settings.
pub const PORT_RANGE: RangeInclusive<u16> = 1024..=65535;

/// Location of the persisted settings, relative to the store root.
pub const SETTINGS_RELATIVE_PATH: &str = "conf/beast.conf";

/// Default log filter expression used by the binaries.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Communication mode used when nothing has been persisted yet.
#[must_use]
pub const fn default_communication() -> Communication {
    #[cfg(unix)]
    {
        Communication::UnixSocket
    }

    #[cfg(not(unix))]
    {
        Communication::Tcp
    }
}
