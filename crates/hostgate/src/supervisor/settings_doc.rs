//! The gateway's bind settings viewed as a host configuration.

use hostgate_config::{
    DEFAULT_TCP_PORT, DEFAULT_UNIX_SOCKET_PATH, GatewaySettings, PORT_RANGE, SettingsPatch,
    default_communication,
};

use crate::host::{ConfigDocument, RawConfig};

const COMMUNICATION: &str = "Communication";
const TCP: &str = "TCP";
const UNIX_SOCKET: &str = "Unix Socket";
const PORT: &str = "Port";
const PATH: &str = "Path";

/// Schema and current values of `settings`, in the shape every other
/// configuration is served in.
pub(crate) fn document(settings: &GatewaySettings) -> ConfigDocument {
    ConfigDocument::new(description(), values(settings))
}

/// Extracts the recognised options from a patch; everything else is ignored.
pub(crate) fn patch_from_raw(patch: &RawConfig) -> SettingsPatch {
    let leaf = |path: &str| {
        patch
            .get_path(path)
            .filter(|node| !node.has_sub_items())
            .map(|node| node.value().to_owned())
    };
    SettingsPatch {
        communication: leaf(COMMUNICATION),
        tcp_port: leaf("TCP/Port"),
        unix_socket_path: leaf("Unix Socket/Path"),
    }
}

fn option(kind: &str, label: &str, default: &str) -> RawConfig {
    RawConfig::new()
        .with_value("Type", kind)
        .with_value("Description", label)
        .with_value("DefaultValue", default)
}

fn description() -> RawConfig {
    let communication = option("Enum", COMMUNICATION, &default_communication().to_string())
        .with(
            "Enum",
            RawConfig::new()
                .with_value("0", "UnixSocket")
                .with_value("1", TCP),
        )
        .with(
            "EnumI18n",
            RawConfig::new()
                .with_value("0", UNIX_SOCKET)
                .with_value("1", TCP),
        );
    let port = option("Integer", PORT, &DEFAULT_TCP_PORT.to_string())
        .with_value("IntMin", PORT_RANGE.start().to_string())
        .with_value("IntMax", PORT_RANGE.end().to_string());

    RawConfig::new()
        .with(
            "WebServerConfig",
            RawConfig::new()
                .with(COMMUNICATION, communication)
                .with(
                    UNIX_SOCKET,
                    RawConfig::new()
                        .with_value("Type", "UnixSocketConfig")
                        .with_value("Description", UNIX_SOCKET),
                )
                .with(
                    TCP,
                    RawConfig::new()
                        .with_value("Type", "TcpConfig")
                        .with_value("Description", TCP),
                ),
        )
        .with(
            "Unix Socket$UnixSocketConfig",
            RawConfig::new().with(PATH, option("String", PATH, DEFAULT_UNIX_SOCKET_PATH)),
        )
        .with("TCP$TcpConfig", RawConfig::new().with(PORT, port))
}

fn values(settings: &GatewaySettings) -> RawConfig {
    RawConfig::new()
        .with_value(COMMUNICATION, settings.communication.to_string())
        .with(
            UNIX_SOCKET,
            RawConfig::new().with_value(PATH, settings.unix_socket.path.as_str()),
        )
        .with(
            TCP,
            RawConfig::new().with_value(PORT, settings.tcp.port.to_string()),
        )
}
