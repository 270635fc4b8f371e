//! Error types for configuration reads and writes.

use serde_json::{Value, json};
use thiserror::Error;

/// Key under which configuration-domain errors are reported to clients.
pub(crate) const ERROR_KEY: &str = "ERROR";

/// Failures resolving a configuration URI to a live configuration.
///
/// These are reported in the response payload as `{"ERROR": "<message>"}`
/// while the HTTP status stays 200.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The URI matches none of the configuration roots.
    #[error("Bad config URI \"{uri}\"")]
    BadUri {
        /// Offending URI.
        uri: String,
    },

    /// The addon registry has no such addon.
    #[error("Addon \"{name}\" does not exist")]
    UnknownAddon {
        /// Offending name.
        name: String,
    },

    /// The addon exists but exposes no configuration.
    #[error("Addon \"{name}\" is not configurable")]
    AddonNotConfigurable {
        /// Offending name.
        name: String,
    },

    /// The addon could not be loaded, or has no configuration at the
    /// requested path.
    #[error("Failed to get config for addon \"{name}\"")]
    AddonConfigUnavailable {
        /// Offending name.
        name: String,
    },

    /// No input method entry with that name.
    #[error("Input method \"{name}\" doesn't exist")]
    UnknownInputMethod {
        /// Offending name.
        name: String,
    },

    /// The input method exposes no configuration.
    #[error("Input method \"{name}\" is not configurable")]
    InputMethodNotConfigurable {
        /// Offending name.
        name: String,
    },

    /// The engine serving the input method could not be loaded.
    #[error("Failed to get engine for input method \"{name}\"")]
    EngineUnavailable {
        /// Offending name.
        name: String,
    },

    /// The engine has no configuration for the input method.
    #[error("Failed to get config for input method \"{name}\"")]
    InputMethodConfigUnavailable {
        /// Offending name.
        name: String,
    },
}

impl ConfigError {
    /// Payload sent to the client in place of a configuration.
    #[must_use]
    pub fn to_json(&self) -> Value {
        json!({ ERROR_KEY: self.to_string() })
    }
}

/// Failures that abort a configuration write before it reaches the host.
#[derive(Debug, Error)]
pub enum SetConfigError {
    /// The request body is not a JSON document.
    #[error("{0}")]
    InvalidJson(#[from] serde_json::Error),
}

/// A JSON patch node of a kind the host tree cannot represent.
///
/// Only strings (leaf values) and objects (option groups) are meaningful.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported {kind} in configuration patch: {json}")]
pub struct PatchShapeError {
    /// JSON kind of the offending node.
    pub kind: &'static str,
    /// The offending node, re-serialised.
    pub json: String,
}
