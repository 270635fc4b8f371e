//! Configuration URIs naming one of the host's configuration roots.

use super::ConfigError;

/// URI of the host's global settings.
pub const GLOBAL_CONFIG_URI: &str = "fcitx://config/global";
/// Prefix of addon settings URIs: `<prefix><addon>[/<sub-path>]`.
pub const ADDON_CONFIG_PREFIX: &str = "fcitx://config/addon/";
/// Prefix of input method settings URIs: `<prefix><input-method>`.
pub const INPUT_METHOD_CONFIG_PREFIX: &str = "fcitx://config/im/";

const HTTP_URI_SCHEME: &str = "fcitx:/";

/// A parsed configuration URI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigUri<'a> {
    /// The host's global settings.
    Global,
    /// An addon's settings, or one of its named sub-configurations.
    Addon {
        /// Addon name.
        name: &'a str,
        /// Sub-configuration path; `None` for the addon's main configuration.
        sub_path: Option<&'a str>,
    },
    /// An input method's settings.
    InputMethod {
        /// Input method name.
        name: &'a str,
    },
}

impl<'a> ConfigUri<'a> {
    /// Matches `uri` against the configuration roots.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::BadUri`] when no root matches.
    pub fn parse(uri: &'a str) -> Result<Self, ConfigError> {
        if uri == GLOBAL_CONFIG_URI {
            return Ok(Self::Global);
        }
        if let Some(rest) = uri.strip_prefix(ADDON_CONFIG_PREFIX) {
            let (name, sub_path) = match rest.split_once('/') {
                Some((name, sub_path)) => (name, Some(sub_path).filter(|path| !path.is_empty())),
                None => (rest, None),
            };
            return Ok(Self::Addon { name, sub_path });
        }
        if let Some(name) = uri.strip_prefix(INPUT_METHOD_CONFIG_PREFIX) {
            return Ok(Self::InputMethod { name });
        }
        Err(ConfigError::BadUri {
            uri: uri.to_owned(),
        })
    }
}

/// Canonical configuration URI for an HTTP request path starting with
/// `/config/`.
#[must_use]
pub fn from_http_path(path: &str) -> String {
    format!("{HTTP_URI_SCHEME}{path}")
}
